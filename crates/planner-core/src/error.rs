use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlannerError>;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("{0}")]
    MissingParameter(String),

    #[error("Query is required")]
    EmptyQuery,

    #[error("{0} API key is not configured")]
    MissingApiKey(&'static str),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

impl PlannerError {
    /// True for errors caused by the caller's input rather than the server or its upstreams.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingParameter(_) | Self::EmptyQuery)
    }
}

/// Failure of a single outbound weather API request.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("invalid JSON body: {0}")]
    Decode(String),
}

/// Failure of a generative-model call or of its structured output.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("model API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model returned no candidates")]
    NoCandidates,

    #[error("no function calls returned from the model, response was text only: {0}")]
    TextOnly(String),

    #[error("model called unexpected function '{0}'")]
    UnexpectedFunction(String),

    #[error("function call arguments do not match the layout schema: {0}")]
    Schema(String),
}
