//! Vendor-neutral LLM capability: "given a prompt, return text conforming
//! to a schema, with bounded retries" (spec §9). Callers in
//! `valuation-extraction` and `valuation-analyst` own the schema validation
//! and the parser-feedback retry loop; this crate only knows how to talk to
//! an OpenAI-compatible chat completion endpoint.

mod client;
mod error;

pub use client::{ChatMessage, HttpLlmClient, LlmClient, Role};
pub use error::LlmError;
