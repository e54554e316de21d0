//! Resolution of the step a request actually lands on.

use crate::{
    error::{FlowError, Result},
    models::{StepState, SubmitAction},
};

use super::step::Step;

/// State facets the navigator needs from a step.
pub trait NavigableStep {
    fn is_accessible(&self) -> bool;
    fn is_skipped(&self) -> bool;
    fn is_done(&self) -> bool;
}

impl NavigableStep for StepState {
    fn is_accessible(&self) -> bool {
        StepState::is_accessible(self)
    }

    fn is_skipped(&self) -> bool {
        StepState::is_skipped(self)
    }

    fn is_done(&self) -> bool {
        StepState::is_done(self)
    }
}

impl<D> NavigableStep for Step<D> {
    fn is_accessible(&self) -> bool {
        Step::is_accessible(self)
    }

    fn is_skipped(&self) -> bool {
        Step::is_skipped(self)
    }

    fn is_done(&self) -> bool {
        Step::is_done(self)
    }
}

/// Preferred direction when the desired step cannot be entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl From<SubmitAction> for Direction {
    fn from(action: SubmitAction) -> Self {
        match action {
            SubmitAction::Forward => Direction::Forward,
            SubmitAction::Back => Direction::Backward,
        }
    }
}

/// Outcome of a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavResult {
    /// Landed on the requested step
    Success,
    /// Went past the last step
    Finished,
    /// Landed on a different step than requested
    Fallback,
}

impl NavResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            NavResult::Success => "success",
            NavResult::Finished => "finished",
            NavResult::Fallback => "fallback",
        }
    }
}

/// Holds the current step index and moves it over a step sequence.
///
/// After a [`NavResult::Finished`] the index equals the number of steps and
/// does not point at a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Navigator {
    current_step_index: usize,
}

impl Navigator {
    pub fn new(current_step_index: usize) -> Self {
        Self { current_step_index }
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    /// Whether a step after the current one still needs input, i.e. is not
    /// skipped.
    pub fn has_steps_left<S: NavigableStep>(&self, steps: &[S]) -> bool {
        steps
            .iter()
            .skip(self.current_step_index + 1)
            .any(|step| !step.is_skipped())
    }

    /// Moves one step from the current index in `direction`.
    pub fn proceed_in_direction<S: NavigableStep>(
        &mut self,
        direction: Direction,
        steps: &[S],
    ) -> Result<NavResult> {
        let desired = match direction {
            Direction::Backward => self.current_step_index.saturating_sub(1),
            Direction::Forward => self.current_step_index + 1,
        };

        self.set_current_step_index(desired, steps, direction)
    }

    /// Moves to `desired`, or to the closest enterable step when it cannot be
    /// entered.
    ///
    /// A desired index at or past the end of `steps` tries to finish the flow.
    /// Backward navigation never goes beyond the last accessible step of the
    /// done prefix; forward navigation pushes on to the next accessible step,
    /// passing skipped ones.
    ///
    /// # Errors
    ///
    /// [`FlowError::Navigation`] when no step of the sequence can be entered.
    pub fn set_current_step_index<S: NavigableStep>(
        &mut self,
        desired: usize,
        steps: &[S],
        direction: Direction,
    ) -> Result<NavResult> {
        let desired = desired.min(steps.len());

        let mut last_accessible = None;
        for (index, step) in steps.iter().enumerate().take(desired + 1) {
            if step.is_accessible() {
                last_accessible = Some(index);
            }

            // nothing after an unfinished step can be trusted
            if !step.is_done() {
                break;
            }
        }

        if desired < steps.len() {
            if let Some(last) = last_accessible {
                if last == desired {
                    self.current_step_index = last;
                    return Ok(NavResult::Success);
                }

                if direction == Direction::Backward {
                    self.current_step_index = last;
                    return Ok(NavResult::Fallback);
                }
            }
        }

        self.forward_to_step(desired, last_accessible, steps)
    }

    fn forward_to_step<S: NavigableStep>(
        &mut self,
        desired: usize,
        last_accessible: Option<usize>,
        steps: &[S],
    ) -> Result<NavResult> {
        let mut candidate = last_accessible.map_or(0, |index| index + 1);

        loop {
            let Some(step) = steps.get(candidate) else {
                self.current_step_index = candidate;
                return Ok(NavResult::Finished);
            };

            if step.is_skipped() {
                candidate += 1;
                continue;
            }

            if !step.is_accessible() {
                return self.enter_last_accessible_step(last_accessible);
            }

            self.current_step_index = candidate;
            return Ok(if candidate == desired {
                NavResult::Success
            } else {
                NavResult::Fallback
            });
        }
    }

    fn enter_last_accessible_step(&mut self, last_accessible: Option<usize>) -> Result<NavResult> {
        let index = last_accessible.ok_or_else(|| FlowError::Navigation {
            message: "There is no accessible step".to_string(),
        })?;

        self.current_step_index = index;
        Ok(NavResult::Fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StepState::*;

    fn assert_navigation(
        steps: &[StepState],
        desired: usize,
        direction: Direction,
        expected: NavResult,
        expected_index: usize,
    ) {
        let mut navigator = Navigator::new(0);
        let result = navigator
            .set_current_step_index(desired, steps, direction)
            .unwrap();

        assert_eq!(
            result, expected,
            "wrong result for {steps:?}, desired {desired}, {direction:?}"
        );
        assert_eq!(
            navigator.current_step_index(),
            expected_index,
            "wrong index for {steps:?}, desired {desired}, {direction:?}"
        );
    }

    #[test]
    fn test_nothing_submitted_stays_on_first_step() {
        let steps = [Accessible, Blocked];

        assert_navigation(&steps, 0, Direction::Forward, NavResult::Success, 0);
        assert_navigation(&steps, 1, Direction::Forward, NavResult::Fallback, 0);
        assert_navigation(&steps, 2, Direction::Forward, NavResult::Fallback, 0);
        assert_navigation(&steps, 3, Direction::Forward, NavResult::Fallback, 0);
        assert_navigation(&steps, 0, Direction::Backward, NavResult::Success, 0);
        assert_navigation(&steps, 1, Direction::Backward, NavResult::Fallback, 0);
        assert_navigation(&steps, 2, Direction::Backward, NavResult::Fallback, 0);
    }

    #[test]
    fn test_second_step_cannot_be_entered() {
        let steps = [Valid, BlockedValid];

        assert_navigation(&steps, 0, Direction::Forward, NavResult::Success, 0);
        assert_navigation(&steps, 1, Direction::Forward, NavResult::Fallback, 0);
        assert_navigation(&steps, 0, Direction::Backward, NavResult::Success, 0);
        assert_navigation(&steps, 1, Direction::Backward, NavResult::Fallback, 0);
    }

    #[test]
    fn test_skipped_step_is_passed_forward() {
        let steps = [Valid, Skip, Accessible];

        assert_navigation(&steps, 0, Direction::Forward, NavResult::Success, 0);
        assert_navigation(&steps, 1, Direction::Forward, NavResult::Fallback, 2);
        assert_navigation(&steps, 2, Direction::Forward, NavResult::Success, 2);
        assert_navigation(&steps, 0, Direction::Backward, NavResult::Success, 0);
        assert_navigation(&steps, 1, Direction::Backward, NavResult::Fallback, 0);
        assert_navigation(&steps, 2, Direction::Backward, NavResult::Success, 2);
    }

    #[test]
    fn test_blocked_step_falls_back_to_last_accessible() {
        let steps = [Valid, SkipValid, Valid, Blocked, Skip];

        assert_navigation(&steps, 0, Direction::Forward, NavResult::Success, 0);
        assert_navigation(&steps, 1, Direction::Forward, NavResult::Fallback, 2);
        assert_navigation(&steps, 2, Direction::Forward, NavResult::Success, 2);
        assert_navigation(&steps, 3, Direction::Forward, NavResult::Fallback, 2);
        assert_navigation(&steps, 4, Direction::Forward, NavResult::Fallback, 2);
        assert_navigation(&steps, 5, Direction::Forward, NavResult::Fallback, 2);
        assert_navigation(&steps, 6, Direction::Forward, NavResult::Fallback, 2);

        assert_navigation(&steps, 0, Direction::Backward, NavResult::Success, 0);
        assert_navigation(&steps, 1, Direction::Backward, NavResult::Fallback, 0);
        assert_navigation(&steps, 2, Direction::Backward, NavResult::Success, 2);
        assert_navigation(&steps, 3, Direction::Backward, NavResult::Fallback, 2);
        assert_navigation(&steps, 4, Direction::Backward, NavResult::Fallback, 2);
        assert_navigation(&steps, 5, Direction::Backward, NavResult::Fallback, 2);
    }

    #[test]
    fn test_next_accessible_step() {
        assert_navigation(&[Valid, Accessible], 1, Direction::Forward, NavResult::Success, 1);
    }

    #[test]
    fn test_all_done_finishes() {
        let steps = [Valid, Skip, Valid];

        assert_navigation(&steps, 3, Direction::Forward, NavResult::Finished, 3);
        assert_navigation(&steps, 10, Direction::Forward, NavResult::Finished, 3);
    }

    #[test]
    fn test_no_accessible_step_is_an_error() {
        let mut navigator = Navigator::new(0);
        let error = navigator
            .set_current_step_index(1, &[Skip, Blocked], Direction::Forward)
            .unwrap_err();

        assert!(matches!(error, FlowError::Navigation { .. }));
    }

    #[test]
    fn test_proceed_in_direction() {
        let steps = [Valid, Skip, Accessible];

        let mut navigator = Navigator::new(0);
        assert_eq!(
            navigator.proceed_in_direction(Direction::Forward, &steps).unwrap(),
            NavResult::Fallback
        );
        assert_eq!(navigator.current_step_index(), 2);

        assert_eq!(
            navigator.proceed_in_direction(Direction::Backward, &steps).unwrap(),
            NavResult::Fallback
        );
        assert_eq!(navigator.current_step_index(), 0);

        // backward from the first step stays there
        assert_eq!(
            navigator.proceed_in_direction(Direction::Backward, &steps).unwrap(),
            NavResult::Success
        );
        assert_eq!(navigator.current_step_index(), 0);
    }

    #[test]
    fn test_has_steps_left() {
        assert!(Navigator::new(0).has_steps_left(&[Accessible, Accessible]));
        assert!(!Navigator::new(1).has_steps_left(&[Valid, Skip]));
        assert!(!Navigator::new(0).has_steps_left(&[Valid, Skip, SkipValid]));
        assert!(!Navigator::new(2).has_steps_left(&[Valid, Valid, Accessible]));
    }

    #[test]
    fn test_success_only_on_accessible_steps() {
        let sequences: [&[StepState]; 4] = [
            &[Accessible, Blocked, Blocked],
            &[Valid, Skip, Accessible, Blocked],
            &[Valid, BlockedValid, Skip],
            &[Skip, SkipValid, Valid, Accessible],
        ];

        for steps in sequences {
            for desired in 0..=steps.len() {
                for direction in [Direction::Forward, Direction::Backward] {
                    let mut navigator = Navigator::new(0);
                    let result = navigator
                        .set_current_step_index(desired, steps, direction)
                        .unwrap();
                    let index = navigator.current_step_index();

                    match result {
                        NavResult::Finished => assert_eq!(index, steps.len()),
                        _ => assert!(steps[index].is_accessible(), "{steps:?} landed on {index}"),
                    }
                    if direction == Direction::Forward {
                        assert!(steps[..index.min(steps.len())]
                            .iter()
                            .all(|step| step.is_done() || step.is_accessible()));
                    }
                }
            }
        }
    }
}
