//! Document-store request builder: turns logical CRUD operations plus an
//! auth context into physical requests and forwards them to the dispatcher.

pub mod operation;
pub mod token;

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use snafu::{Location, ResultExt, Snafu};
use std::collections::HashMap;
use std::sync::Arc;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::config::ClientConfig;
use crate::http::call::{CallError, HttpRequest};
use crate::http::classify::Classification;
use crate::http::client::HttpClient;
use crate::rest::docdb::operation::DocumentRequest;
use crate::rest::docdb::token::TokenResult;

const DOCUMENT_DB_HOST_SUFFIX: &str = "documents.azure.com";
const API_VERSION: &str = "2018-06-18";

const HEADER_AUTHORIZATION: &str = "Authorization";
const HEADER_CONTENT_TYPE: &str = "Content-Type";
const HEADER_MS_DATE: &str = "x-ms-date";
const HEADER_MS_VERSION: &str = "x-ms-version";
const HEADER_PARTITION_KEY: &str = "x-ms-documentdb-partitionkey";
const CONTENT_TYPE_JSON: &str = "application/json";

/// RFC 1123 date, the only format the store accepts in `x-ms-date`.
const RFC1123: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

/// Raw result of a document operation. The body is passed through untouched;
/// [`DocumentResponse::json`] is a convenience for typed callers.
#[derive(Clone, Debug)]
pub struct DocumentResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub attempts: u32,
}

impl DocumentResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

#[derive(Debug, Snafu)]
pub enum DocumentError {
    #[snafu(display("auth token expired at {expires_on}"))]
    TokenExpired {
        expires_on: OffsetDateTime,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("failed to serialize document payload"))]
    Serialization {
        source: serde_json::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("resolved document URL is invalid"))]
    InvalidUrl {
        source: url::ParseError,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("failed to format request timestamp"))]
    Timestamp {
        source: time::error::Format,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("document call failed"))]
    Call {
        source: CallError,
        #[snafu(implicit)]
        location: Location,
    },
}

impl DocumentError {
    /// Classification surfaced to callers. A token that was already expired
    /// at build time counts as `Unauthorized`, so credential refresh can key
    /// off a single value whether or not the network was reached.
    pub fn classification(&self) -> Option<Classification> {
        match self {
            DocumentError::TokenExpired { .. } => Some(Classification::Unauthorized),
            DocumentError::Call { source, .. } => source.classification(),
            _ => None,
        }
    }
}

/// Client for CRUD operations against the partitioned document store.
/// Dispatcher outcomes pass through unchanged; the only failure added at
/// this layer is the fast-fail on a pre-expired token.
pub struct DocumentStoreClient {
    http: Arc<HttpClient>,
    config: ClientConfig,
}

impl DocumentStoreClient {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self::with_config(http, ClientConfig::default())
    }

    pub fn with_config(http: Arc<HttpClient>, config: ClientConfig) -> Self {
        Self { http, config }
    }

    #[tracing::instrument(skip(self, token, request), fields(db_account = %token.db_account, document_id))]
    pub async fn perform(
        &self,
        token: &TokenResult,
        request: DocumentRequest<'_>,
    ) -> Result<DocumentResponse, DocumentError> {
        tracing::Span::current().record(
            "document_id",
            request.operation.document_id().unwrap_or("<none>"),
        );

        if token.is_expired(OffsetDateTime::now_utc()) {
            tracing::warn!(target: "docdb", "Token already expired; failing before the network");
            return TokenExpiredSnafu {
                expires_on: token.expires_on,
            }
            .fail();
        }

        let physical = build_request(token, &request, OffsetDateTime::now_utc())?;
        tracing::debug!(
            target: "docdb",
            method = %physical.method,
            url = %physical.url,
            "Document request resolved"
        );

        let outcome = self
            .http
            .send_and_wait(
                physical,
                self.config.retry.clone(),
                self.config.compression_enabled,
            )
            .await
            .context(CallSnafu)?;

        Ok(DocumentResponse {
            status: outcome.status,
            body: outcome.body,
            attempts: outcome.attempts,
        })
    }
}

/// Resolve a logical operation to a physical request: URL, verb, headers,
/// serialized body.
fn build_request(
    token: &TokenResult,
    request: &DocumentRequest<'_>,
    now: OffsetDateTime,
) -> Result<HttpRequest, DocumentError> {
    let url = document_url(
        token,
        request.operation.document_id(),
        request.additional_url_path.as_deref(),
    )?;

    let mut headers = default_headers(token, now)?;
    if let Some(additional) = &request.additional_headers {
        // Caller-supplied headers win on key collision.
        for (key, value) in additional {
            headers.insert(key.clone(), value.clone());
        }
    }

    let body = match request.operation.document() {
        Some(document) => Some(document.serialize().context(SerializationSnafu)?),
        None => None,
    };

    Ok(HttpRequest {
        url,
        method: request.operation.method(),
        headers,
        body,
    })
}

fn document_url(
    token: &TokenResult,
    document_id: Option<&str>,
    additional_url_path: Option<&str>,
) -> Result<Url, DocumentError> {
    let mut target = format!(
        "https://{}.{}/dbs/{}/colls/{}/docs",
        token.db_account, DOCUMENT_DB_HOST_SUFFIX, token.db_name, token.db_collection
    );
    if let Some(id) = document_id {
        target.push('/');
        target.push_str(id);
    }
    if let Some(extra) = additional_url_path {
        if !extra.starts_with('/') {
            target.push('/');
        }
        target.push_str(extra);
    }
    Url::parse(&target).context(InvalidUrlSnafu)
}

fn default_headers(
    token: &TokenResult,
    now: OffsetDateTime,
) -> Result<HashMap<String, String>, DocumentError> {
    let mut headers = HashMap::new();
    headers.insert(HEADER_AUTHORIZATION.to_string(), encode_token(&token.token));
    headers.insert(HEADER_CONTENT_TYPE.to_string(), CONTENT_TYPE_JSON.to_string());
    headers.insert(HEADER_MS_VERSION.to_string(), API_VERSION.to_string());
    headers.insert(
        HEADER_PARTITION_KEY.to_string(),
        format!("[\"{}\"]", token.partition),
    );
    headers.insert(
        HEADER_MS_DATE.to_string(),
        now.format(&RFC1123).context(TimestampSnafu)?,
    );
    Ok(headers)
}

/// Resource tokens contain `/`, `=`, and `+`; the store expects them
/// percent-encoded in the `Authorization` header.
fn encode_token(token: &str) -> String {
    url::form_urlencoded::byte_serialize(token.as_bytes()).collect()
}
