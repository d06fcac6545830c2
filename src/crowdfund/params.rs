//! Parameter validation.

use crate::crowdfund::errors::CompileError;
use crate::types::address::Address;
use crate::types::amount::Amount;

/// Shortest accepted entry window (10 minutes).
pub const MIN_WINDOW_MINUTES: i64 = 10;
/// Longest accepted entry window (30 days).
pub const MAX_WINDOW_MINUTES: i64 = 30 * 24 * 60;
/// Smallest accepted goal (0.01 in smallest units).
pub const MIN_GOAL: i64 = 1_000_000;
/// Largest accepted goal (1,000,000 in smallest units).
pub const MAX_GOAL: i64 = 100_000_000_000_000;

/// Validated template parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    pub window_minutes: i64,
    pub goal: Amount,
    pub awardee: Address,
}

fn check_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<i64, CompileError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(CompileError::ParameterOutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

impl Params {
    /// Checks the numeric bounds of already-parsed parameters.
    pub fn new(window_minutes: i64, goal: Amount, awardee: Address) -> Result<Self, CompileError> {
        let window_minutes = check_range(
            "window_minutes",
            window_minutes,
            MIN_WINDOW_MINUTES,
            MAX_WINDOW_MINUTES,
        )?;
        check_range("goal_amount", goal.units(), MIN_GOAL, MAX_GOAL)?;
        Ok(Self {
            window_minutes,
            goal,
            awardee,
        })
    }

    /// Validates raw parameters, including the awardee's text form.
    ///
    /// Checks run in order: window, goal, then awardee.
    pub fn validate(window_minutes: i64, goal_amount: i64, awardee: &str) -> Result<Self, CompileError> {
        check_range(
            "window_minutes",
            window_minutes,
            MIN_WINDOW_MINUTES,
            MAX_WINDOW_MINUTES,
        )?;
        check_range("goal_amount", goal_amount, MIN_GOAL, MAX_GOAL)?;
        let address = awardee
            .parse::<Address>()
            .map_err(|reason| CompileError::InvalidRecipient {
                address: awardee.to_string(),
                reason,
            })?;
        Self::new(window_minutes, Amount::from_units(goal_amount), address)
    }
}
