/// Convenience result type used across Flightline.
pub type FlightResult<T> = Result<T, FlightError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum FlightError {
    /// Checkpoints that cannot produce a curve (too few, or coincident neighbours).
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// A control request referenced an entity that is not registered.
    #[error("invalid entity: {0}")]
    InvalidEntity(String),

    /// A value could not be brought into its configured bounds.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// `go()` was called on an entity whose updater is already live.
    #[error("already running: {0}")]
    AlreadyRunning(String),

    /// A row lookup missed the path table.
    #[error("lookup miss: {0}")]
    LookupMiss(String),

    /// Invalid configuration or user-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed control-channel framing.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Errors when serializing or deserializing payloads.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlightError {
    /// Build a [`FlightError::DegenerateInput`] value.
    pub fn degenerate_input(msg: impl Into<String>) -> Self {
        Self::DegenerateInput(msg.into())
    }

    /// Build a [`FlightError::InvalidEntity`] value.
    pub fn invalid_entity(msg: impl Into<String>) -> Self {
        Self::InvalidEntity(msg.into())
    }

    /// Build a [`FlightError::OutOfRange`] value.
    pub fn out_of_range(msg: impl Into<String>) -> Self {
        Self::OutOfRange(msg.into())
    }

    /// Build a [`FlightError::AlreadyRunning`] value.
    pub fn already_running(msg: impl Into<String>) -> Self {
        Self::AlreadyRunning(msg.into())
    }

    /// Build a [`FlightError::LookupMiss`] value.
    pub fn lookup_miss(msg: impl Into<String>) -> Self {
        Self::LookupMiss(msg.into())
    }

    /// Build a [`FlightError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FlightError::Protocol`] value.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Build a [`FlightError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` for errors a caller may log and carry on from.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::AlreadyRunning(_) | Self::OutOfRange(_) | Self::LookupMiss(_)
        )
    }
}

impl From<std::io::Error> for FlightError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(anyhow::Error::new(err))
    }
}

impl From<serde_json::Error> for FlightError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
