//! Wire format.
//!
//! Every message is a 4-byte big-endian payload length followed by a UTF-8 JSON payload.
//! Requests are tagged by a `command` field; responses carry a status and a message.

use std::io::{self, Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{FlightError, FlightResult};
use crate::motion::state::EntityInfo;

/// Largest payload accepted in either direction.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// A control command. `name` accepts `"*"` where the operation allows all entities.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Request {
    /// Summaries of every registered entity.
    ListEntities,
    /// Register and start an entity with a random color and speed.
    AddEntity,
    /// Stop and drop one entity.
    RemoveEntity {
        /// Entity to remove.
        name: String,
    },
    /// Start or stop entities.
    SetRunning {
        /// Entity name or `"*"`.
        name: String,
        /// `true` starts, `false` stops.
        running: bool,
    },
    /// Show or hide the effect-range outline.
    SetEffectRangeVisible {
        /// Entity name or `"*"`.
        name: String,
        /// Whether the outline is drawn.
        visible: bool,
    },
    /// Set one entity's speed; the stored value is clamped.
    SetSpeed {
        /// Entity to retune.
        name: String,
        /// Requested speed.
        speed: f64,
    },
    /// Set the effect emission rate; the stored value is clamped.
    SetEmissionRate {
        /// Entity name or `"*"`.
        name: String,
        /// Requested effects per second.
        rate: f64,
    },
    /// Move one entity back to the path start.
    ResetDistance {
        /// Entity to reset.
        name: String,
    },
    /// Rebuild the path. Without checkpoints a random path is generated.
    RegeneratePath {
        /// Normalized `[x, y]` checkpoints.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        checkpoints: Option<Vec<[f64; 2]>>,
    },
    /// Set speed and color together.
    UpdateEntity {
        /// Entity to update.
        name: String,
        /// Requested speed.
        speed: f64,
        /// New body color.
        color: Rgba8,
    },
}

impl Request {
    /// Wire name of the command, for logs.
    pub fn command(&self) -> &'static str {
        match self {
            Self::ListEntities => "list_entities",
            Self::AddEntity => "add_entity",
            Self::RemoveEntity { .. } => "remove_entity",
            Self::SetRunning { .. } => "set_running",
            Self::SetEffectRangeVisible { .. } => "set_effect_range_visible",
            Self::SetSpeed { .. } => "set_speed",
            Self::SetEmissionRate { .. } => "set_emission_rate",
            Self::ResetDistance { .. } => "reset_distance",
            Self::RegeneratePath { .. } => "regenerate_path",
            Self::UpdateEntity { .. } => "update_entity",
        }
    }
}

/// Outcome of a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The request was applied.
    Ok,
    /// The request was refused; the message says why.
    Failed,
}

/// Error category carried by failed responses so clients can rebuild a typed error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DegenerateInput,
    InvalidEntity,
    OutOfRange,
    AlreadyRunning,
    LookupMiss,
    Validation,
    Protocol,
    Serde,
    /// Anything not covered by a more specific kind.
    Internal,
}

impl ErrorKind {
    /// Category of `err`.
    pub fn of(err: &FlightError) -> Self {
        match err {
            FlightError::DegenerateInput(_) => Self::DegenerateInput,
            FlightError::InvalidEntity(_) => Self::InvalidEntity,
            FlightError::OutOfRange(_) => Self::OutOfRange,
            FlightError::AlreadyRunning(_) => Self::AlreadyRunning,
            FlightError::LookupMiss(_) => Self::LookupMiss,
            FlightError::Validation(_) => Self::Validation,
            FlightError::Protocol(_) => Self::Protocol,
            FlightError::Serde(_) => Self::Serde,
            FlightError::Other(_) => Self::Internal,
        }
    }

    /// Rebuild an error of this category.
    pub fn into_error(self, message: String) -> FlightError {
        match self {
            Self::DegenerateInput => FlightError::DegenerateInput(message),
            Self::InvalidEntity => FlightError::InvalidEntity(message),
            Self::OutOfRange => FlightError::OutOfRange(message),
            Self::AlreadyRunning => FlightError::AlreadyRunning(message),
            Self::LookupMiss => FlightError::LookupMiss(message),
            Self::Validation => FlightError::Validation(message),
            Self::Protocol => FlightError::Protocol(message),
            Self::Serde => FlightError::Serde(message),
            Self::Internal => FlightError::Other(anyhow::anyhow!(message)),
        }
    }
}

/// Reply to a [`Request`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Response {
    pub status: Status,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<EntityInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Value actually stored after clamping (speed, emission rate).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl Response {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            message: message.into(),
            kind: None,
            entities: None,
            name: None,
            value: None,
        }
    }

    pub fn failed(err: &FlightError) -> Self {
        Self {
            status: Status::Failed,
            message: err.to_string(),
            kind: Some(ErrorKind::of(err)),
            entities: None,
            name: None,
            value: None,
        }
    }

    pub fn with_entities(mut self, entities: Vec<EntityInfo>) -> Self {
        self.entities = Some(entities);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// `Ok(self)` for success, the rebuilt error for failure.
    pub fn into_result(self) -> FlightResult<Self> {
        match self.status {
            Status::Ok => Ok(self),
            Status::Failed => Err(self
                .kind
                .unwrap_or(ErrorKind::Internal)
                .into_error(self.message)),
        }
    }
}

/// Read one length-prefixed payload.
pub fn read_frame<R: Read>(r: &mut R) -> FlightResult<Vec<u8>> {
    let mut header = [0u8; 4];
    r.read_exact(&mut header).map_err(|e| frame_io("header", e))?;
    let len = u32::from_be_bytes(header) as usize;
    if len > MAX_FRAME_LEN {
        return Err(FlightError::protocol(format!(
            "frame of {len} bytes exceeds the {MAX_FRAME_LEN} byte limit"
        )));
    }
    let mut payload = vec![0u8; len];
    r.read_exact(&mut payload)
        .map_err(|e| frame_io("payload", e))?;
    Ok(payload)
}

/// Write one length-prefixed payload.
pub fn write_frame<W: Write>(w: &mut W, payload: &[u8]) -> FlightResult<()> {
    if payload.len() > MAX_FRAME_LEN {
        return Err(FlightError::protocol(format!(
            "frame of {} bytes exceeds the {MAX_FRAME_LEN} byte limit",
            payload.len()
        )));
    }
    let len = u32::try_from(payload.len())
        .map_err(|_| FlightError::protocol("frame length does not fit in u32"))?;
    w.write_all(&len.to_be_bytes())?;
    w.write_all(payload)?;
    w.flush()?;
    Ok(())
}

/// Serialize `msg` as JSON and write it as one frame.
pub fn send_message<W: Write, T: Serialize>(w: &mut W, msg: &T) -> FlightResult<()> {
    let payload = serde_json::to_vec(msg)?;
    write_frame(w, &payload)
}

/// Read one frame and deserialize its JSON payload.
pub fn recv_message<R: Read, T: DeserializeOwned>(r: &mut R) -> FlightResult<T> {
    let payload = read_frame(r)?;
    Ok(serde_json::from_slice(&payload)?)
}

fn frame_io(part: &str, err: io::Error) -> FlightError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        FlightError::protocol(format!("connection closed while reading frame {part}"))
    } else {
        FlightError::Other(anyhow::Error::new(err).context(format!("read frame {part}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/control/protocol.rs"]
mod tests;
