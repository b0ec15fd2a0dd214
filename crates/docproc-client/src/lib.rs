//! Client side of the docproc backend: HTTP endpoints, status polling, and user flows.

mod error;
pub mod flow;
pub mod http;
pub mod poll;

pub use error::ClientError;
pub use flow::{ChatOutcome, DocumentOutcome, ExportTarget, Reporter, Silent, Workflow};
pub use http::{ApiClient, ClientConfig};
pub use poll::{PollPolicy, Pollable, poll_until};
pub use tokio_util::sync::CancellationToken;
