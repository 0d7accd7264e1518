use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::compression::{self, BodyEncoding};
use crate::config::retry::BackoffSchedule;
use crate::http::call::{
    BodyCompressionSnafu, CallError, CallResponse, CallResult, CancelledSnafu, CompletionHandler,
    DisabledSnafu, ExhaustedSnafu, HttpRequest, StatusSnafu,
};
use crate::http::classify::{Classification, classify_status};
use crate::http::transport::{ReqwestTransport, Transport};
use snafu::ResultExt;

const CONTENT_ENCODING_HEADER: &str = "Content-Encoding";
const GZIP_ENCODING: &str = "gzip";

/// Tracked calls and the enabled flag form one shared resource. Every read
/// and mutation of either field happens under the same lock, so a disable
/// can never race with a fresh submission.
///
/// Invariant: `enabled == false` implies `calls` is empty.
struct DispatcherState {
    enabled: bool,
    calls: HashMap<Uuid, CancellationToken>,
}

fn lock(state: &Mutex<DispatcherState>) -> MutexGuard<'_, DispatcherState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Asynchronous HTTP call dispatcher.
///
/// Owns the set of in-flight calls and the enable/disable switch, and runs
/// the retry loop for each submitted call on its own task. Each call's
/// completion handler fires exactly once across every exit path: success,
/// terminal failure, retry exhaustion, explicit cancellation, or a
/// disable-triggered drain. Instances are independent; there is no ambient
/// shared state.
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    state: Arc<Mutex<DispatcherState>>,
}

/// Handle to a submitted call. Never needs to be awaited; dropping it
/// detaches from the call without cancelling it.
pub struct CallHandle {
    id: Uuid,
    token: CancellationToken,
    state: Arc<Mutex<DispatcherState>>,
}

impl CallHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Cancel this call. If it was still tracked, its completion handler
    /// fires with `Cancelled`; otherwise the handler already fired and this
    /// is a no-op.
    pub fn cancel(&self) {
        let removed = lock(&self.state).calls.remove(&self.id).is_some();
        if removed {
            debug!(target: "http_client", call_id = %self.id, "Call cancelled via handle");
            self.token.cancel();
        }
    }
}

impl HttpClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            state: Arc::new(Mutex::new(DispatcherState {
                enabled: true,
                calls: HashMap::new(),
            })),
        }
    }

    /// Dispatcher over the production `reqwest` transport.
    pub fn with_default_transport() -> Self {
        Self::new(Arc::new(ReqwestTransport::new()))
    }

    pub fn is_enabled(&self) -> bool {
        lock(&self.state).enabled
    }

    /// Number of calls currently tracked (in-flight or parked on a backoff
    /// timer).
    pub fn active_calls(&self) -> usize {
        lock(&self.state).calls.len()
    }

    /// Submit a call. Must be invoked from within a Tokio runtime.
    ///
    /// Rejects synchronously with `CallError::Disabled` while the dispatcher
    /// is off; the completion handler is not invoked in that case. Otherwise
    /// the compression decision is applied to the body, the call is
    /// registered, and the attempt loop starts on its own task. `on_complete`
    /// fires exactly once with the terminal outcome.
    pub fn send<F>(
        &self,
        request: HttpRequest,
        schedule: BackoffSchedule,
        compression_enabled: bool,
        on_complete: F,
    ) -> Result<CallHandle, CallError>
    where
        F: FnOnce(CallResult) + Send + 'static,
    {
        let mut request = request;
        if let Some(body) = request.body.take() {
            request.body = Some(match compression::decide(body.len(), compression_enabled) {
                BodyEncoding::Raw => body,
                BodyEncoding::Gzip => {
                    let compressed =
                        compression::compress_data(&body).context(BodyCompressionSnafu)?;
                    request
                        .headers
                        .insert(CONTENT_ENCODING_HEADER.to_string(), GZIP_ENCODING.to_string());
                    compressed
                }
            });
        }

        let id = Uuid::new_v4();
        let token = CancellationToken::new();
        {
            let mut state = lock(&self.state);
            if !state.enabled {
                debug!(target: "http_client", call_id = %id, "Submission rejected: dispatcher disabled");
                return DisabledSnafu.fail();
            }
            state.calls.insert(id, token.clone());
        }
        info!(
            target: "http_client",
            call_id = %id,
            method = %request.method,
            url = %request.url,
            "Call submitted"
        );

        let transport = Arc::clone(&self.transport);
        let state = Arc::clone(&self.state);
        tokio::spawn(run_call(
            transport,
            state,
            id,
            token.clone(),
            request,
            schedule,
            Box::new(on_complete),
        ));

        Ok(CallHandle {
            id,
            token,
            state: Arc::clone(&self.state),
        })
    }

    /// Submit a call and await its terminal outcome.
    pub async fn send_and_wait(
        &self,
        request: HttpRequest,
        schedule: BackoffSchedule,
        compression_enabled: bool,
    ) -> CallResult {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.send(request, schedule, compression_enabled, move |outcome| {
            let _ = tx.send(outcome);
        })?;
        match rx.await {
            Ok(outcome) => outcome,
            // Unreachable under the exactly-once contract.
            Err(_) => CancelledSnafu.fail(),
        }
    }

    /// Flip the enable/disable switch.
    ///
    /// Disabling drains every tracked call under the same lock that guards
    /// submissions: each pending backoff timer and in-flight exchange is
    /// cancelled synchronously with the flag flip, and each drained call's
    /// handler then fires with `Cancelled`. Re-enabling admits new
    /// submissions; nothing previously cancelled is resumed.
    pub fn set_enabled(&self, enabled: bool) {
        let mut state = lock(&self.state);
        if state.enabled == enabled {
            return;
        }
        state.enabled = enabled;
        if enabled {
            info!(target: "http_client", "Dispatcher enabled");
        } else {
            for (id, token) in state.calls.drain() {
                debug!(target: "http_client", call_id = %id, "Cancelling tracked call");
                token.cancel();
            }
            info!(target: "http_client", "Dispatcher disabled; tracked calls cancelled");
        }
    }
}

async fn run_call(
    transport: Arc<dyn Transport>,
    state: Arc<Mutex<DispatcherState>>,
    id: Uuid,
    token: CancellationToken,
    request: HttpRequest,
    schedule: BackoffSchedule,
    on_complete: CompletionHandler,
) {
    let mut attempts: u32 = 0;
    let outcome: CallResult = loop {
        // Cancellation checkpoint: a backoff timer that elapsed before the
        // cancellation was observed must not produce another attempt.
        if token.is_cancelled() {
            break CancelledSnafu.fail();
        }

        let attempt_result = tokio::select! {
            _ = token.cancelled() => break CancelledSnafu.fail(),
            result = transport.send(request.clone()) => result,
        };
        attempts += 1;

        let (classification, last_status) = match attempt_result {
            Ok(response) => {
                let classification = classify_status(response.status);
                if classification == Classification::Success {
                    info!(
                        target: "http_client",
                        call_id = %id,
                        status = %response.status,
                        attempts,
                        "Call succeeded"
                    );
                    break Ok(CallResponse {
                        status: response.status,
                        headers: response.headers,
                        body: response.body,
                        attempts,
                    });
                }
                if !classification.is_retryable() {
                    warn!(
                        target: "http_client",
                        call_id = %id,
                        status = %response.status,
                        ?classification,
                        "Call failed with non-retryable status"
                    );
                    break StatusSnafu {
                        classification,
                        status: response.status,
                        body: response.body,
                    }
                    .fail();
                }
                (classification, Some(response.status))
            }
            Err(error) => {
                warn!(target: "http_client", call_id = %id, error = %error, "Transport failure");
                (Classification::TransportFailure, None)
            }
        };

        match schedule.delay_for(attempts - 1) {
            None => {
                break ExhaustedSnafu {
                    attempts,
                    last_classification: classification,
                    last_status,
                }
                .fail();
            }
            Some(delay) => {
                debug!(
                    target: "http_client",
                    call_id = %id,
                    ?delay,
                    attempts,
                    "Retryable failure; resend scheduled"
                );
                tokio::select! {
                    _ = token.cancelled() => break CancelledSnafu.fail(),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    };

    // Exactly-once finalization. Whoever removed the tracking entry first
    // decided the call's fate: if a disable or an explicit cancel drained it,
    // the terminal outcome is Cancelled regardless of what the last attempt
    // produced.
    let still_tracked = lock(&state).calls.remove(&id).is_some();
    let outcome = if still_tracked {
        outcome
    } else {
        CancelledSnafu.fail()
    };
    on_complete(outcome);
}
