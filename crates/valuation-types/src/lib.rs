//! Shared data model for the Hybrid Valuation Core.
//!
//! Holds the entities passed between the Truncator, Extractor, numeric
//! engine, Analyst, and Cache Manager, plus the error taxonomy they all
//! report through. No I/O lives here.

mod cache;
mod error;
mod memo;
mod source;
mod svi;
mod valuation;

pub use cache::*;
pub use error::*;
pub use memo::*;
pub use source::*;
pub use svi::*;
pub use valuation::*;
