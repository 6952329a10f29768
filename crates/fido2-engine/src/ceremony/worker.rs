use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use ctap2_proto::authenticator::device::{Info, Options};
use tokio_util::sync::CancellationToken;

use crate::device::{DeviceAdapter, DeviceLocator, DeviceOpener, ProbeOutcome};
use crate::error::{self, EngineError};

/// A device retained after DISCOVERING: either a probed FIDO2
/// authenticator (carrying its capability record) or a legacy U2F-only
/// device kept around for the `appid` fallback.
pub(crate) struct Candidate {
    pub adapter: Arc<DeviceAdapter>,
    pub info: Option<Info>,
}

impl Candidate {
    pub(crate) fn is_fido2(&self) -> bool {
        self.info.is_some()
    }

    /// The capability record a worker validates UV/RK requests against.
    /// Legacy U2F devices have no CTAP2 `authenticatorGetInfo` of their
    /// own; they are treated as a plain device (UP only, no UV, no
    /// resident keys) for the purpose of that validation.
    pub(crate) fn effective_info(&self) -> Info {
        self.info.clone().unwrap_or_else(|| Info {
            versions: vec!["U2F_V2".to_string()],
            aaguid: [0; 16],
            options: Options::empty(),
        })
    }
}

/// Single-writer-single-reader rendezvous for a race's winning payload,
/// per §5's description: a guarded set-once slot combined with a
/// `CancellationToken` fanned out to siblings the instant the winner is
/// set.
pub(crate) struct WinnerSlot<T> {
    slot: tokio::sync::Mutex<Option<T>>,
    cancel: CancellationToken,
}

impl<T> WinnerSlot<T> {
    pub(crate) fn new(cancel: CancellationToken) -> Self {
        Self {
            slot: tokio::sync::Mutex::new(None),
            cancel,
        }
    }

    /// Attempts to set `value` as the winner. Returns `true` exactly once
    /// across all callers; cancels every sibling the instant it succeeds.
    pub(crate) async fn try_set(&self, value: T) -> bool {
        let mut slot = self.slot.lock().await;
        if slot.is_some() {
            return false;
        }
        *slot = Some(value);
        self.cancel.cancel();
        true
    }

    async fn into_inner(self) -> Option<T> {
        self.slot.into_inner()
    }
}

/// What a single device worker contributed to a race.
pub(crate) enum Outcome {
    /// This worker won the [`WinnerSlot`]; the payload already lives in
    /// the slot.
    Won,
    /// Another worker won first; this worker's own result (success or
    /// failure) is moot and discarded.
    Lost,
    /// This worker's device call failed and no winner has been decided
    /// yet; the error is collected for §7's precedence ranking.
    Failed(EngineError),
}

/// Runs `make_task` against every candidate concurrently (one spawned
/// task per device, per §5) and returns the winner's payload, or the
/// highest-precedence error if every worker failed.
pub(crate) async fn run_race<T, F, Fut>(
    candidates: Vec<Arc<Candidate>>,
    cancel: CancellationToken,
    make_task: F,
) -> Result<T, EngineError>
where
    T: Send + 'static,
    F: Fn(Arc<Candidate>, Arc<WinnerSlot<T>>, CancellationToken) -> Fut,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    if candidates.is_empty() {
        return Err(EngineError::NoCredentials);
    }

    let winner = Arc::new(WinnerSlot::new(cancel.clone()));
    let mut set = tokio::task::JoinSet::new();
    for candidate in candidates {
        let task = make_task(candidate, Arc::clone(&winner), cancel.clone());
        set.spawn(task);
    }

    let mut errors = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(Outcome::Won) | Ok(Outcome::Lost) => {}
            Ok(Outcome::Failed(err)) => errors.push(err),
            Err(_join_error) => {
                errors.push(EngineError::Internal("device worker task panicked".into()))
            }
        }
    }

    match Arc::try_unwrap(winner) {
        Ok(winner) => match winner.into_inner().await {
            Some(value) => Ok(value),
            None => Err(error::precedence(errors)),
        },
        Err(_) => Err(EngineError::Internal(
            "winner slot had outstanding references after race completed".into(),
        )),
    }
}

/// Awaits `call`, but the instant `race_cancel` fires, calls
/// `adapter.cancel()` to unblock it out of band (blocking device I/O
/// cannot otherwise be interrupted — §5, Cancellation) and then waits
/// for the now-cancelled call to actually resolve.
pub(crate) async fn race_aware<T>(
    adapter: &DeviceAdapter,
    race_cancel: &CancellationToken,
    call: impl Future<Output = T>,
) -> T {
    tokio::pin!(call);
    tokio::select! {
        result = &mut call => result,
        _ = race_cancel.cancelled() => {
            adapter.cancel();
            call.await
        }
    }
}

/// DISCOVERING: polls the Locator until at least one device survives
/// probing, tolerating a metered locator's empty warm-up ticks. Has no
/// internal deadline — the caller wraps the whole ceremony in
/// `tokio::time::timeout`, which drops this future (and any in-flight
/// probe) on expiry.
pub(crate) async fn discover(
    locator: &Arc<dyn DeviceLocator>,
    opener: &Arc<dyn DeviceOpener>,
    poll_interval: Duration,
    uv_retry_limit: u8,
    cancel: &CancellationToken,
) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    loop {
        if cancel.is_cancelled() {
            return candidates;
        }

        let locations = locator.current_locations().await;
        for path in locations {
            if !seen.insert(path.clone()) {
                continue;
            }
            let Some(raw) = opener.open(&path).await else {
                tracing::debug!(path = %path, "device vanished before open");
                continue;
            };
            let adapter = Arc::new(DeviceAdapter::new(raw, uv_retry_limit));
            match adapter.probe().await {
                ProbeOutcome::Fido2(info) => {
                    tracing::debug!(path = %path, "admitted fido2 device");
                    candidates.push(Candidate {
                        adapter,
                        info: Some(info),
                    });
                }
                ProbeOutcome::NotFido2 => {
                    tracing::debug!(path = %path, "admitted legacy u2f device");
                    candidates.push(Candidate {
                        adapter,
                        info: None,
                    });
                }
                ProbeOutcome::Failed => {
                    tracing::debug!(path = %path, "dropped device after failed probe");
                }
            }
        }

        if !candidates.is_empty() {
            return candidates;
        }

        tokio::select! {
            _ = cancel.cancelled() => return candidates,
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }
}
