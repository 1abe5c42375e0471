use common::{Endpoint, EnvelopeError};
use thiserror::Error;

use crate::dispatcher::RowAction;
use crate::table::TableVariant;

/// Every way a single console action can fail. All kinds are surfaced the same
/// way; the split exists so callers and tests can tell them apart.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("{endpoint}: transport error: {source}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint}: HTTP {status}")]
    HttpStatus { endpoint: Endpoint, status: u16 },

    #[error("{endpoint}: malformed response: {detail}")]
    Malformed { endpoint: Endpoint, detail: String },

    #[error("{endpoint}: {message} (status {status})")]
    Api {
        endpoint: Endpoint,
        status: i64,
        message: String,
    },

    #[error("{endpoint}: unexpected payload: {detail}")]
    Schema { endpoint: Endpoint, detail: String },

    #[error("{endpoint}: backend reported the command did not take effect")]
    Rejected { endpoint: Endpoint },

    #[error("row {0} is not in the table")]
    RowNotFound(String),

    #[error("{action} is not available in the {variant} view")]
    ActionUnavailable {
        action: RowAction,
        variant: TableVariant,
    },
}

impl ConsoleError {
    pub fn from_envelope(endpoint: Endpoint, err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::Failure { status, message } => ConsoleError::Api {
                endpoint,
                status,
                message,
            },
            EnvelopeError::Schema(detail) => ConsoleError::Schema { endpoint, detail },
        }
    }

    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            ConsoleError::Transport { endpoint, .. }
            | ConsoleError::HttpStatus { endpoint, .. }
            | ConsoleError::Malformed { endpoint, .. }
            | ConsoleError::Api { endpoint, .. }
            | ConsoleError::Schema { endpoint, .. }
            | ConsoleError::Rejected { endpoint } => Some(*endpoint),
            ConsoleError::RowNotFound(_) | ConsoleError::ActionUnavailable { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
