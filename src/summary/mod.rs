//! Natural-language student summaries produced by an external text-generation service.
//!
//! The handler looks the student up first (releasing the store lock), renders a fixed prompt
//! with [`build_prompt`], and relays it through a [`SummaryClient`]. The production client talks
//! to an Ollama runtime; tests substitute stubs or point the client at a mock server.

mod ollama;

pub use ollama::OllamaSummaryClient;

use crate::student::Student;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Failures raised while generating a summary downstream.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Generation service could not be reached.
    #[error("Summary provider unavailable: {0}")]
    Unavailable(String),
    /// Generation service did not answer before the configured deadline.
    #[error("Summary provider timed out: {0}")]
    TimedOut(String),
    /// Generation service answered with a non-success status.
    #[error("Summary provider returned {status}: {body}")]
    Upstream {
        /// HTTP status reported by the provider.
        status: u16,
        /// Raw response body, for diagnostics.
        body: String,
    },
    /// Response body did not have the expected shape.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

impl SummaryError {
    /// Transport-level failures that a retry could plausibly fix.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::TimedOut(_))
    }
}

/// Interface implemented by text-generation backends.
#[async_trait]
pub trait SummaryClient: Send + Sync {
    /// Send `prompt` as a single user turn and return the reply text verbatim.
    async fn generate(&self, prompt: String) -> Result<String, SummaryError>;
}

/// Response body for `GET /students/{id}/summary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentSummary {
    /// Generated text, unmodified.
    pub summary: String,
}

/// Render the fixed summary prompt for a student.
pub fn build_prompt(student: &Student) -> String {
    format!(
        "Generate a brief summary of this student:\nName: {}\nAge: {}\nEmail: {}\n\
         Focus on their basic information and potential academic journey based on their age.",
        student.name, student.age, student.email
    )
}

/// Generate a summary for an existing student.
pub async fn summarize(
    client: &dyn SummaryClient,
    student: &Student,
) -> Result<StudentSummary, SummaryError> {
    let summary = client.generate(build_prompt(student)).await?;
    Ok(StudentSummary { summary })
}
