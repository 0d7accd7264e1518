use reqwest::StatusCode;

/// Classification of a completed attempt, used to decide retry-worthiness.
///
/// Only [`RateLimited`](Classification::RateLimited),
/// [`ServerUnavailable`](Classification::ServerUnavailable), and
/// [`TransportFailure`](Classification::TransportFailure) trigger the backoff
/// schedule; every other class terminates the call immediately with that
/// classification surfaced to the caller. `Unauthorized` is kept distinct
/// from the generic `ClientError` so callers can refresh credentials.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// 2xx.
    Success,
    /// 401 or 403.
    Unauthorized,
    /// 404.
    NotFound,
    /// 409.
    Conflict,
    /// 429.
    RateLimited,
    /// 5xx.
    ServerUnavailable,
    /// Any other status (remaining 4xx, redirects, informational).
    ClientError,
    /// Connection or timeout failure with no HTTP status.
    TransportFailure,
}

impl Classification {
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Classification::RateLimited
                | Classification::ServerUnavailable
                | Classification::TransportFailure
        )
    }
}

/// Map an HTTP status code onto the retry taxonomy.
pub fn classify_status(status: StatusCode) -> Classification {
    if status.is_success() {
        return Classification::Success;
    }
    match status.as_u16() {
        401 | 403 => Classification::Unauthorized,
        404 => Classification::NotFound,
        409 => Classification::Conflict,
        429 => Classification::RateLimited,
        500..=599 => Classification::ServerUnavailable,
        _ => Classification::ClientError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(200, Classification::Success)]
    #[test_case(201, Classification::Success)]
    #[test_case(204, Classification::Success)]
    #[test_case(301, Classification::ClientError)]
    #[test_case(400, Classification::ClientError)]
    #[test_case(401, Classification::Unauthorized)]
    #[test_case(403, Classification::Unauthorized)]
    #[test_case(404, Classification::NotFound)]
    #[test_case(409, Classification::Conflict)]
    #[test_case(418, Classification::ClientError)]
    #[test_case(429, Classification::RateLimited)]
    #[test_case(500, Classification::ServerUnavailable)]
    #[test_case(503, Classification::ServerUnavailable)]
    #[test_case(599, Classification::ServerUnavailable)]
    fn status_table(code: u16, expected: Classification) {
        let status = StatusCode::from_u16(code).unwrap();
        assert_eq!(classify_status(status), expected);
    }

    #[test]
    fn only_throttling_server_errors_and_transport_failures_retry() {
        assert!(Classification::RateLimited.is_retryable());
        assert!(Classification::ServerUnavailable.is_retryable());
        assert!(Classification::TransportFailure.is_retryable());

        assert!(!Classification::Success.is_retryable());
        assert!(!Classification::Unauthorized.is_retryable());
        assert!(!Classification::NotFound.is_retryable());
        assert!(!Classification::Conflict.is_retryable());
        assert!(!Classification::ClientError.is_retryable());
    }
}
