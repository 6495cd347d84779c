//! Orchestrator (C9): the public façade over the normalization pipeline,
//! numeric engine, Analyst, and Cache Manager (spec §2, §4.9, §6).

mod config;
mod convert;
mod documents;
mod orchestrator;

pub use config::{Config, ConfigError};
pub use orchestrator::{Orchestrator, RefreshScope};

pub use valuation_llm::{ChatMessage, HttpLlmClient, LlmClient, LlmError, Role};
pub use valuation_types::{CoreError, InvestmentMemo, StandardizedValuationInput, ValuationResult};
