/// Externally observable error taxonomy for `Register`/`Login`/device
/// probing. A single `thiserror`-derived enum rather than boxed `dyn
/// Error` or ad hoc strings, so host code can match on a kind the way the
/// error table implies.
///
/// `UserVerificationBlocked` (CTAP2 error 0x3F) never escapes a worker: it
/// is retried internally up to `EngineConfig::uv_retry_limit` times and,
/// if the budget is exhausted, re-surfaced as `Internal` carrying the
/// underlying device error's message.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("cancelled")]
    Cancelled,

    #[error("no credentials available for this request")]
    NoCredentials,

    #[error("user verification function failed")]
    UserVerification,

    #[error("pin required")]
    PinRequired,

    #[error("pin invalid")]
    PinInvalid,

    #[error("unsupported option: {0}")]
    Unsupported(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Relative specificity used to pick a single error out of a set of
    /// per-worker failures when every worker in a ceremony fails. Lower is
    /// more specific and wins. Deadline/cancellation are handled before
    /// this ranking is consulted — see [`precedence`].
    fn rank(&self) -> u8 {
        match self {
            EngineError::DeadlineExceeded => 0,
            EngineError::Cancelled => 1,
            EngineError::UserVerification => 2,
            EngineError::PinRequired | EngineError::PinInvalid => 3,
            EngineError::NoCredentials => 4,
            EngineError::Unsupported(_) => 5,
            EngineError::Internal(_) => 6,
            EngineError::InvalidArgument(_) => 7,
        }
    }
}

/// Collapses every worker's terminal error into the single error a
/// ceremony reports when none of them produced a winning response.
///
/// Ranking: `DeadlineExceeded` and `Cancelled` always override everything
/// else (the ceremony itself was torn down, a worker's own result is
/// moot); otherwise `UserVerification`, then pin errors, then
/// `NoCredentials` over `Unsupported` over `Internal` — the most
/// actionable explanation wins. This resolves the ceremony's "which
/// error wins when every worker fails" question in favour of collecting
/// every worker's error and picking the most specific one, rather than
/// surfacing whichever worker happened to finish last.
pub(crate) fn precedence(errors: Vec<EngineError>) -> EngineError {
    errors
        .into_iter()
        .min_by_key(EngineError::rank)
        .unwrap_or_else(|| EngineError::Internal("no candidate device produced a result".into()))
}
