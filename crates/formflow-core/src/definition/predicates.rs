//! Strategy traits for data-dependent step behavior.
//!
//! Every trait is implemented for plain closures taking the flow data, and has
//! a no-op implementation used when a step does not configure one.

use serde::{Deserialize, Serialize};

use super::Options;

/// Decides whether a step is bypassed for the given data.
pub trait SkipCondition<D>: Send + Sync {
    fn should_skip(&self, data: &D) -> bool;
}

impl<D, F> SkipCondition<D> for F
where
    F: Fn(&D) -> bool + Send + Sync,
{
    fn should_skip(&self, data: &D) -> bool {
        self(data)
    }
}

/// Never skips.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverSkip;

impl<D> SkipCondition<D> for NeverSkip {
    fn should_skip(&self, _data: &D) -> bool {
        false
    }
}

/// Lists user-facing reasons why a step cannot be entered. An empty list
/// means the step can be entered.
pub trait EnterErrors<D>: Send + Sync {
    fn enter_errors(&self, data: &D) -> Vec<String>;
}

impl<D, F> EnterErrors<D> for F
where
    F: Fn(&D) -> Vec<String> + Send + Sync,
{
    fn enter_errors(&self, data: &D) -> Vec<String> {
        self(data)
    }
}

/// Always lets the user enter.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEnterErrors;

impl<D> EnterErrors<D> for NoEnterErrors {
    fn enter_errors(&self, _data: &D) -> Vec<String> {
        Vec::new()
    }
}

/// Computes form options or view variables from the flow data.
pub trait OptionsProvider<D>: Send + Sync {
    fn options(&self, data: &D) -> Options;
}

impl<D, F> OptionsProvider<D> for F
where
    F: Fn(&D) -> Options + Send + Sync,
{
    fn options(&self, data: &D) -> Options {
        self(data)
    }
}

/// Computes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOptions;

impl<D> OptionsProvider<D> for NoOptions {
    fn options(&self, _data: &D) -> Options {
        Options::new()
    }
}

/// A single constraint violation found in the flow data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Violation {
    /// Property the violation belongs to; `None` for the data as a whole
    pub property_path: Option<String>,

    /// User-facing message
    pub message: String,
}

impl Violation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            property_path: None,
            message: message.into(),
        }
    }

    pub fn at(property_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property_path: Some(property_path.into()),
            message: message.into(),
        }
    }
}

/// Whole-flow data validation oracle, run before the last step is left.
pub trait DataValidator<D> {
    fn validate(&self, data: &D) -> Vec<Violation>;
}

impl<D, F> DataValidator<D> for F
where
    F: Fn(&D) -> Vec<Violation>,
{
    fn validate(&self, data: &D) -> Vec<Violation> {
        self(data)
    }
}

/// Accepts any data.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoViolations;

impl<D> DataValidator<D> for NoViolations {
    fn validate(&self, _data: &D) -> Vec<Violation> {
        Vec::new()
    }
}

/// Strips from the data what steps outside `valid_steps` contributed.
///
/// `valid_steps` names the steps that are valid and not skipped, in flow
/// order.
pub trait DataCleaner<D> {
    fn clean(&self, data: &mut D, valid_steps: &[&str]);
}

impl<D, F> DataCleaner<D> for F
where
    F: Fn(&mut D, &[&str]),
{
    fn clean(&self, data: &mut D, valid_steps: &[&str]) {
        self(data, valid_steps);
    }
}

/// Keeps the data as it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepAll;

impl<D> DataCleaner<D> for KeepAll {
    fn clean(&self, _data: &mut D, _valid_steps: &[&str]) {}
}
