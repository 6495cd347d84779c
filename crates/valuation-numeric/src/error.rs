//! Errors internal to the numeric engine (C3-C6).
//!
//! `NumericOverflow` is per-scenario inside the DCF Engine and never aborts
//! the whole valuation by itself (spec §7, §9); `InvalidInputs` is an engine
//! boundary failure and is terminal.

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum NumericError {
    #[error("non-finite intermediate in scenario: {0}")]
    NumericOverflow(String),

    #[error("invalid inputs: {0}")]
    InvalidInputs(String),
}
