//! `negopack-ai` — chat-completions client for negotiation pack generation.
//!
//! Builds the strategist prompt from a deal's intake fields, calls an
//! OpenAI-compatible `/chat/completions` endpoint with
//! `response_format: json_object`, and parses the completion into the six
//! pack sections. Parsing is strict: a completion missing any section is
//! rejected so a half-formed pack never reaches storage.

pub mod client;
pub mod error;
pub mod types;

pub use client::Client;
pub use error::AiError;
pub use types::{GeneratedPack, PackInput, Tradeable};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, AiError>;
