use docproc_core::{InputError, SessionError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response. `message` is the backend's `detail` or a per-operation default.
    #[error("server returned {status}: {message}")]
    Request { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The backend reported `status: error` for the job.
    #[error("processing failed: {0}")]
    Poll(String),

    #[error("gave up after {attempts} consecutive failed status requests: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<ClientError>,
    },

    #[error("job still processing after {polls} status requests")]
    PollTimeout { polls: u32 },

    #[error("cancelled")]
    Cancelled,

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Failures a status poll may retry: transport, server, and decode errors.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ClientError::Http(_)
                | ClientError::Request { .. }
                | ClientError::Json(_)
        )
    }
}
