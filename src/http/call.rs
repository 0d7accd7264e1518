use reqwest::{Method, StatusCode, Url};
use snafu::{Location, Snafu};
use std::collections::HashMap;

use crate::compression::CompressionError;
use crate::http::classify::Classification;

/// A fully resolved physical request, ready to hand to the transport.
/// Header keys are unique; later inserts replace earlier ones.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub url: Url,
    pub method: Method,
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
}

/// What the transport produced for a single attempt, fully read.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

/// Terminal success surfaced to the caller, including how many network
/// attempts the call took.
#[derive(Clone, Debug)]
pub struct CallResponse {
    pub status: StatusCode,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub attempts: u32,
}

pub type CallResult = Result<CallResponse, CallError>;

/// Completion callback for one call. The dispatcher invokes it exactly once,
/// on every exit path.
pub type CompletionHandler = Box<dyn FnOnce(CallResult) + Send + 'static>;

/// Terminal failure of a call. Retryable outcomes are never surfaced
/// mid-retry; they only appear here once the backoff schedule is exhausted.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CallError {
    #[snafu(display("request rejected with status {status} ({classification:?})"))]
    Status {
        classification: Classification,
        status: StatusCode,
        body: Vec<u8>,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display(
        "retries exhausted after {attempts} attempts; last classification {last_classification:?}"
    ))]
    Exhausted {
        attempts: u32,
        last_classification: Classification,
        last_status: Option<StatusCode>,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("failed to compress request body"))]
    BodyCompression {
        source: CompressionError,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("call cancelled"))]
    Cancelled,
    #[snafu(display("client is disabled"))]
    Disabled,
}

impl CallError {
    /// Classification carried by this terminal outcome, if it has one.
    pub fn classification(&self) -> Option<Classification> {
        match self {
            CallError::Status { classification, .. } => Some(*classification),
            CallError::Exhausted {
                last_classification,
                ..
            } => Some(*last_classification),
            _ => None,
        }
    }
}
