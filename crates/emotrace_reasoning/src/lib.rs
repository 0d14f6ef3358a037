//! # emotrace Reasoning
//!
//! Narrative analysis of the emotional journal by an external text model.
//!
//! The journal is condensed into a digest of the most recent records, sent
//! with a fixed clinical instruction and a JSON response schema, and the
//! answer is parsed into an [`emotrace_core::AnalysisResult`]. Failures are
//! typed ([`AnalysisError`]) and never affect stored data.

pub mod client;
pub mod digest;
mod error;
pub mod providers;
pub mod retry;
mod service;

pub use client::InsightClient;
pub use digest::{analysis_schema, DigestEntry, HistoryDigest, SYSTEM_INSTRUCTION};
pub use error::AnalysisError;
pub use providers::{GeminiClient, MockInsightClient};
pub use retry::{with_retry, RetryConfig};
pub use service::{parse_analysis, InsightService};
