//! Collection wrappers.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::models::StoredInstance;

/// Newtype wrapper for displaying stored flow instances as a markdown list.
pub struct StoredInstances(pub Vec<StoredInstance>);

impl StoredInstances {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for StoredInstances {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No stored flow instances.");
        }

        for instance in &self.0 {
            writeln!(
                f,
                "- **{}** {} ({}), updated {}",
                instance.instance_id,
                instance.flow_name,
                instance.state,
                LocalDateTime(&instance.updated_at)
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::models::FlowState;

    #[test]
    fn test_empty_list() {
        let output = StoredInstances(Vec::new()).to_string();
        assert!(output.contains("No stored flow instances."));
    }

    #[test]
    fn test_lists_every_instance() {
        let now = Timestamp::now();
        let instances = StoredInstances(vec![
            StoredInstance {
                instance_id: "abc".to_string(),
                flow_name: "signup".to_string(),
                state: FlowState::Active,
                created_at: now,
                updated_at: now,
            },
            StoredInstance {
                instance_id: "def".to_string(),
                flow_name: "signup".to_string(),
                state: FlowState::Finished,
                created_at: now,
                updated_at: now,
            },
        ]);

        let output = instances.to_string();
        assert_eq!(instances.len(), 2);
        assert!(output.contains("**abc** signup (active)"));
        assert!(output.contains("**def** signup (finished)"));
    }
}
