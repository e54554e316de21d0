//! State enumerations for steps and flow instances.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FlowError;

/// Type-safe enumeration of step states.
///
/// Exactly one tag applies to a step at a time. The `*Valid` variants remember
/// that the step's form was successfully submitted while the step is
/// currently skipped or blocked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    /// Not evaluated yet
    #[default]
    Init,

    /// Can be entered, not submitted successfully
    Accessible,

    /// Cannot be entered
    Blocked,

    /// Can be entered and was submitted successfully
    Valid,

    /// Bypassed based on flow data
    Skip,

    /// Bypassed, but holds valid data from an earlier submission
    SkipValid,

    /// Cannot be entered, but holds valid data from an earlier submission
    BlockedValid,
}

impl StepState {
    /// All states, in declaration order.
    pub const ALL: [StepState; 7] = [
        StepState::Init,
        StepState::Accessible,
        StepState::Blocked,
        StepState::Valid,
        StepState::Skip,
        StepState::SkipValid,
        StepState::BlockedValid,
    ];

    /// Convert to storage string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            StepState::Init => "init",
            StepState::Accessible => "accessible",
            StepState::Blocked => "blocked",
            StepState::Valid => "valid",
            StepState::Skip => "skip",
            StepState::SkipValid => "skip_valid",
            StepState::BlockedValid => "blocked_valid",
        }
    }

    /// The step can be entered by the user.
    pub fn is_accessible(&self) -> bool {
        matches!(self, StepState::Accessible | StepState::Valid)
    }

    /// The step holds successfully submitted data.
    pub fn is_valid(&self) -> bool {
        matches!(
            self,
            StepState::Valid | StepState::SkipValid | StepState::BlockedValid
        )
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, StepState::Skip | StepState::SkipValid)
    }

    /// The user may proceed past this step.
    pub fn is_done(&self) -> bool {
        matches!(
            self,
            StepState::Valid | StepState::Skip | StepState::SkipValid
        )
    }

    /// State after a submission outcome, keeping the skipped / accessible /
    /// blocked dimension and replacing only the validity.
    pub fn validity_changed(&self, valid: bool) -> StepState {
        if self.is_skipped() {
            if valid {
                StepState::SkipValid
            } else {
                StepState::Skip
            }
        } else if self.is_accessible() {
            if valid {
                StepState::Valid
            } else {
                StepState::Accessible
            }
        } else if valid {
            StepState::BlockedValid
        } else {
            StepState::Blocked
        }
    }

    /// Whether the steps after this one can be reached.
    ///
    /// `BlockedValid` does not let the user pass even though it holds valid
    /// data, while `SkipValid` does.
    pub fn can_go_past(&self, can_reach: bool) -> bool {
        can_reach && (self.is_skipped() || *self == StepState::Valid)
    }

    /// Get state with consistent icon formatting for display.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use formflow_core::models::StepState;
    ///
    /// assert_eq!(StepState::Valid.with_icon(), "✓ valid");
    /// assert_eq!(StepState::Accessible.with_icon(), "➤ accessible");
    /// assert_eq!(StepState::Blocked.with_icon(), "✗ blocked");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            StepState::Init => "○ init",
            StepState::Accessible => "➤ accessible",
            StepState::Blocked => "✗ blocked",
            StepState::Valid => "✓ valid",
            StepState::Skip => "↷ skip",
            StepState::SkipValid => "↷ skip (valid)",
            StepState::BlockedValid => "✗ blocked (valid)",
        }
    }
}

impl FromStr for StepState {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "init" => Ok(StepState::Init),
            "accessible" => Ok(StepState::Accessible),
            "blocked" => Ok(StepState::Blocked),
            "valid" => Ok(StepState::Valid),
            "skip" => Ok(StepState::Skip),
            "skip_valid" | "skipvalid" => Ok(StepState::SkipValid),
            "blocked_valid" | "blockedvalid" => Ok(StepState::BlockedValid),
            _ => Err(FlowError::invalid_input("step_state").with_reason(format!("unknown step state '{s}'"))),
        }
    }
}

/// Lifecycle of a flow instance. `Finished` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FlowState {
    /// The flow is active
    #[default]
    Active,

    /// The flow is finished, modifying its data is not allowed
    Finished,
}

impl FlowState {
    /// Convert to storage string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowState::Active => "active",
            FlowState::Finished => "finished",
        }
    }
}

impl FromStr for FlowState {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(FlowState::Active),
            "finished" => Ok(FlowState::Finished),
            _ => Err(FlowError::invalid_input("flow_state").with_reason(format!("unknown flow state '{s}'"))),
        }
    }
}

/// Action requested by a submitted form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubmitAction {
    /// Validate the submitted step and move on
    #[default]
    Forward,

    /// Keep the submitted data unvalidated and move back
    Back,
}

impl SubmitAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmitAction::Forward => "forward",
            SubmitAction::Back => "back",
        }
    }

    /// Reads the action from a request parameter value. Anything other than
    /// `back` is a forward submission.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("back") => SubmitAction::Back,
            _ => SubmitAction::Forward,
        }
    }
}

impl FromStr for SubmitAction {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "forward" => Ok(SubmitAction::Forward),
            "back" => Ok(SubmitAction::Back),
            _ => Err(FlowError::invalid_input("submit").with_reason(format!("unknown submit action '{s}'"))),
        }
    }
}
