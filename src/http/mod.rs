//! Asynchronous call dispatch: request/response types, outcome
//! classification, the retrying dispatcher, and the transport seam.

pub mod call;
pub mod classify;
pub mod client;
pub mod transport;
