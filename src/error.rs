use thiserror::Error;

/// Failure modes of the text-generation collaborator.
///
/// Transient failures (rate limits, server errors, network timeouts) are
/// retried with exponential backoff; fatal failures (auth, malformed
/// requests, unusable replies) surface immediately.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("transient model failure: {0}")]
    Transient(String),
    #[error("model request rejected: {0}")]
    Fatal(String),
}

impl LlmError {
    pub fn is_transient(&self) -> bool {
        matches!(self, LlmError::Transient(_))
    }
}

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("user not found: {0}")]
    MissingUser(String),
    #[error("profile not found for user: {0}")]
    MissingProfile(String),
    #[error("no narrative model configured: set PAIRMATCH_LLM_API_KEY")]
    ModelUnavailable,
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("profile regeneration on cooldown: retry in {remaining_secs}s")]
    Cooldown { remaining_secs: i64 },
    #[error("storage error: {0}")]
    Store(String),
}
