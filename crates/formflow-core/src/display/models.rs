//! Display implementations for the flow models and the flow view.

use std::fmt;

use crate::{
    flow::FlowView,
    models::{FlowState, StepState, StoredState, SubmitAction},
};

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for SubmitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for StoredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {} ({})", self.instance_id, self.flow_name)?;
        writeln!(f)?;
        writeln!(f, "- State: {}", self.state)?;
        writeln!(f, "- Data: `{}`", self.data)?;

        if self.step_states.is_empty() {
            writeln!(f, "\nNo step states stored.")?;
        } else {
            writeln!(f, "\n## Steps")?;
            writeln!(f)?;
            for (name, state) in &self.step_states {
                writeln!(f, "- {name}: {}", state.with_icon())?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for FlowView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}: {}", self.name, self.current_step.label)?;
        writeln!(f)?;
        writeln!(f, "- Instance: {}", self.instance_id)?;
        writeln!(f, "- View: {}", self.view)?;

        writeln!(f, "\n## Steps")?;
        writeln!(f)?;
        for (index, step) in self.steps.iter().enumerate() {
            let marker = if step.name == self.current_step.name {
                " **(current)**"
            } else {
                ""
            };
            writeln!(
                f,
                "{}. {} ({}){marker}",
                index + 1,
                step.label,
                step.state.with_icon()
            )?;
        }

        if !self.form_errors.is_empty() {
            writeln!(f, "\n## Errors")?;
            writeln!(f)?;
            for error in &self.form_errors {
                match &error.path {
                    Some(path) => writeln!(f, "- {path}: {}", error.message)?,
                    None => writeln!(f, "- {}", error.message)?,
                }
            }
        }

        let back = self.back_submit_button();
        let forward = self.forward_submit_button();
        writeln!(f, "\n## Actions")?;
        writeln!(f)?;
        writeln!(f, "- {}: `{}={}`", forward.label, forward.name, forward.value)?;
        if back.disabled {
            writeln!(f, "- {}: not available", back.label)?;
        } else {
            writeln!(f, "- {}: `{}={}`", back.label, back.name, back.value)?;
        }

        Ok(())
    }
}
