use thiserror::Error;

/// Failures the device client can report. Absent targets on delete/update
/// paths are not errors; those come back as `Ok(false)` or `None` because a
/// missing target is an expected steady-state outcome for callers
/// reconciling external state.
#[derive(Debug, Error)]
pub enum Error {
    #[error("authentication with {host} failed: no session token returned")]
    Auth { host: String },

    #[error("device transport failure")]
    Transport(#[from] reqwest::Error),

    #[error("malformed device response")]
    Json(#[from] serde_json::Error),

    #[error("invalid device endpoint")]
    Endpoint(#[from] url::ParseError),

    /// More than one blank template where exactly one was expected: another
    /// writer is mid-flight against the same device.
    #[error("{found} blank templates present where exactly one was expected")]
    StagingConflict { found: usize },

    /// A placeholder never appeared, or a fill was accepted with 200 but the
    /// re-read does not show the expected entity.
    #[error("staging failed: {0}")]
    Staging(String),

    /// The apply call failed; everything staged so far remains pending on
    /// the device until a later successful apply.
    #[error("apply failed; staged changes remain pending on the device")]
    Commit(#[source] Box<Error>),
}

pub type Result<T> = std::result::Result<T, Error>;
