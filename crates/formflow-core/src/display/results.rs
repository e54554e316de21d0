//! Request outcome types.

use std::fmt;

use crate::definition::RouteParameters;

/// Route the calling layer redirects to after a request.
pub struct Redirect<'a> {
    /// Named route; `None` for the flow's own route
    pub route: Option<&'a str>,
    pub params: &'a RouteParameters,
}

impl<'a> Redirect<'a> {
    pub fn to_flow(params: &'a RouteParameters) -> Self {
        Self {
            route: None,
            params,
        }
    }

    pub fn to_route(route: &'a str, params: &'a RouteParameters) -> Self {
        Self {
            route: Some(route),
            params,
        }
    }
}

impl fmt::Display for Redirect<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self
            .params
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(", ");

        match self.route {
            Some(route) => writeln!(f, "Redirect to `{route}` ({params})"),
            None => writeln!(f, "Redirect to flow ({params})"),
        }
    }
}

/// Confirmation of an instance deletion.
pub struct DeleteResult<'a> {
    pub instance_id: &'a str,
    pub deleted: bool,
}

impl fmt::Display for DeleteResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.deleted {
            writeln!(f, "Deleted flow instance {}", self.instance_id)
        } else {
            writeln!(f, "No flow instance {} to delete", self.instance_id)
        }
    }
}
