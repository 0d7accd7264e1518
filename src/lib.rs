//! Client core for a partitioned, token-authenticated REST document store:
//! an asynchronous HTTP call dispatcher with configurable retry/backoff and
//! cooperative cancellation, plus the request builder that turns logical
//! CRUD operations into physical requests.

pub mod compression;
pub mod config;
pub mod http;
pub mod logging;
pub mod rest;

pub use config::ClientConfig;
pub use config::retry::BackoffSchedule;
pub use http::call::{CallError, CallResponse, CallResult, HttpRequest, HttpResponse};
pub use http::classify::Classification;
pub use http::client::{CallHandle, HttpClient};
pub use http::transport::{ReqwestTransport, Transport, TransportError, TransportFuture};
pub use rest::docdb::operation::{DocumentOperation, DocumentRequest, SerializableDocument};
pub use rest::docdb::token::TokenResult;
pub use rest::docdb::{DocumentError, DocumentResponse, DocumentStoreClient};
