pub mod client;
pub mod parse;

pub use client::{AnthropicVisionClient, AttemptOutcome};
pub use parse::{parse_reply, ReplyParse};
