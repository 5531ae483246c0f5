use thiserror::Error;

use crate::control::Control;
use crate::status::Status;

/// A configuration option the codec did not accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The codec rejected the value.
    #[error("opus: set {control} failed: {status}")]
    Rejected { control: Control, status: Status },

    /// The linked codec build does not provide the option.
    #[error("opus: {control} unavailable in linked codec: {status}")]
    FeatureUnavailable { control: Control, status: Status },
}

impl ConfigError {
    /// Classifies a failed control call.
    pub fn new(control: Control, status: Status) -> Self {
        if control.is_optional_feature() {
            Self::FeatureUnavailable { control, status }
        } else {
            Self::Rejected { control, status }
        }
    }

    pub fn control(&self) -> Control {
        match *self {
            Self::Rejected { control, .. } | Self::FeatureUnavailable { control, .. } => control,
        }
    }

    pub fn status(&self) -> Status {
        match *self {
            Self::Rejected { status, .. } | Self::FeatureUnavailable { status, .. } => status,
        }
    }

    pub fn is_feature_unavailable(&self) -> bool {
        matches!(self, Self::FeatureUnavailable { .. })
    }
}

/// Errors returned by encoder session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The codec refused to create an instance.
    #[error("opus: encoder create failed: {0}")]
    CreateFailed(Status),

    /// The session was destroyed or the handle is unknown.
    #[error("opus: invalid session")]
    InvalidSession,

    /// PCM length does not match the frame size and channel count.
    #[error("opus: frame length mismatch: expected {expected} samples, got {got}")]
    FrameLength { expected: usize, got: usize },

    /// Byte-oriented PCM input that cannot hold whole i16 samples.
    #[error("opus: PCM byte length {0} is not a whole number of samples")]
    OddByteLength(usize),

    /// The codec failed to encode this frame.
    #[error("opus: encode failed: {0}")]
    EncodeFailed(Status),

    /// A configuration option was not applied.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SessionError {
    /// Returns the codec status behind this error, if there is one.
    pub fn status(&self) -> Option<Status> {
        match self {
            Self::CreateFailed(s) | Self::EncodeFailed(s) => Some(*s),
            Self::Config(e) => Some(e.status()),
            Self::FrameLength { .. } | Self::OddByteLength(_) => Some(Status::BAD_ARG),
            Self::InvalidSession => None,
        }
    }
}
