//! Data exchanged with the external capability backends.
//!
//! These are the shapes the capability traits in `reasoncare-core` speak.
//! Wire encodings for particular backends live with their clients.

use serde::{Deserialize, Serialize};

/// Audio handed to speech transcription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioInput {
    /// Raw audio bytes supplied by the caller.
    Inline(Vec<u8>),
    /// Audio already stored at a media location, e.g. `s3://bucket/key.wav`.
    Uri(String),
}

/// Lifecycle of an asynchronous transcription job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TranscriptionStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
}

impl TranscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptionStatus::Queued => "QUEUED",
            TranscriptionStatus::InProgress => "IN_PROGRESS",
            TranscriptionStatus::Completed => "COMPLETED",
            TranscriptionStatus::Failed => "FAILED",
        }
    }
}

/// Returned by `submit`: the job handle, not a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionJob {
    pub job_id: String,
    pub status: TranscriptionStatus,
}

/// Returned by `poll`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionResult {
    pub status: TranscriptionStatus,
    /// Location of the finished transcript, once `status` is `Completed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_ref: Option<String>,
}

/// Token accounting reported by a model invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

/// A single generative model response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOutput {
    pub text: String,
    #[serde(default)]
    pub usage: TokenUsage,
}

/// Knowledge-base search hits and the sources they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeResults {
    #[serde(default)]
    pub results: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
}

/// Units accepted by the metrics sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricUnit {
    Count,
    Percent,
    Milliseconds,
}

impl MetricUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricUnit::Count => "Count",
            MetricUnit::Percent => "Percent",
            MetricUnit::Milliseconds => "Milliseconds",
        }
    }
}
