//! Handle table for sessions driven through a foreign-language bridge.
//!
//! Bridges hold a [`SessionHandle`], never a pointer to the codec. A handle
//! that was destroyed, or never issued, is rejected with
//! [`SessionError::InvalidSession`].

use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroU64;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{debug, error};

use crate::codec::Codec;
use crate::config::{Channels, ConfigurationRequest, EncoderConfig, SampleRate};
use crate::control::Control;
use crate::error::{ConfigError, SessionError};
use crate::packet::EncodeOutcome;
use crate::session::{EncoderSession, SessionStats};
use crate::status::Status;

/// Opaque identifier of a registered session. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle(NonZeroU64);

impl SessionHandle {
    /// Returns the raw value to hand across a language boundary.
    pub fn as_raw(self) -> u64 {
        self.0.get()
    }

    /// Rebuilds a handle from its raw value. Zero maps to `None`.
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

type Shared<C> = Arc<Mutex<EncoderSession<C>>>;

/// Table of live sessions keyed by handle.
///
/// Each session sits behind its own lock, so sessions on different threads
/// only share the brief table lookup.
pub struct SessionRegistry<C: Codec> {
    next_id: AtomicU64,
    sessions: Mutex<HashMap<u64, Shared<C>>>,
}

impl<C: Codec> Default for SessionRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Codec> SessionRegistry<C> {
    /// Creates an empty registry. Handles start at 1.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a VoIP session from raw bridge arguments.
    ///
    /// Sample rates outside {8000, 12000, 16000, 24000, 48000} and channel
    /// counts other than 1 or 2 fail with `CreateFailed(BAD_ARG)`.
    pub fn create(
        &self,
        sample_rate: i32,
        channels: i32,
        bitrate: i32,
        dred_duration_ms: i32,
    ) -> Result<SessionHandle, SessionError> {
        let Some(rate) = SampleRate::from_hz(sample_rate) else {
            error!("opus: unsupported sample rate {} Hz", sample_rate);
            return Err(SessionError::CreateFailed(Status::BAD_ARG));
        };
        let Some(ch) = Channels::from_count(channels) else {
            error!("opus: unsupported channel count {}", channels);
            return Err(SessionError::CreateFailed(Status::BAD_ARG));
        };
        self.create_with(&EncoderConfig::new(rate, ch, bitrate, dred_duration_ms))
    }

    /// Creates a session from a full config.
    pub fn create_with(&self, config: &EncoderConfig) -> Result<SessionHandle, SessionError> {
        let session = EncoderSession::with_config(config)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = SessionHandle::from_raw(id)
            .ok_or(SessionError::CreateFailed(Status::INTERNAL_ERROR))?;
        self.sessions.lock().insert(id, Arc::new(Mutex::new(session)));
        debug!("opus: session {} registered", handle);
        Ok(handle)
    }

    /// Encodes one frame on the session behind `handle`.
    pub fn encode(
        &self,
        handle: SessionHandle,
        pcm: &[i16],
        frame_size: usize,
    ) -> Result<EncodeOutcome, SessionError> {
        self.get(handle)?.lock().encode(pcm, frame_size)
    }

    /// Encodes little-endian i16 bytes on the session behind `handle`.
    pub fn encode_bytes(
        &self,
        handle: SessionHandle,
        pcm: &[u8],
        frame_size: usize,
    ) -> Result<EncodeOutcome, SessionError> {
        self.get(handle)?.lock().encode_bytes(pcm, frame_size)
    }

    /// Applies one option.
    pub fn configure(&self, handle: SessionHandle, control: Control) -> Result<(), SessionError> {
        self.get(handle)?.lock().configure(control)
    }

    /// Applies every option in `request`; returns the ones that failed.
    pub fn apply(
        &self,
        handle: SessionHandle,
        request: &ConfigurationRequest,
    ) -> Result<Vec<ConfigError>, SessionError> {
        self.get(handle)?.lock().apply(request)
    }

    /// Returns the configuration failures recorded at creation.
    pub fn diagnostics(&self, handle: SessionHandle) -> Result<Vec<ConfigError>, SessionError> {
        Ok(self.get(handle)?.lock().diagnostics().to_vec())
    }

    pub fn stats(&self, handle: SessionHandle) -> Result<SessionStats, SessionError> {
        Ok(self.get(handle)?.lock().stats())
    }

    /// Destroys the session behind `handle`. Unknown handles are ignored.
    ///
    /// The handle is unregistered first, so no new call can reach the
    /// session; a call already in flight finishes before the codec is
    /// released.
    pub fn destroy(&self, handle: SessionHandle) {
        let removed = self.sessions.lock().remove(&handle.as_raw());
        match removed {
            Some(session) => {
                session.lock().destroy();
                debug!("opus: session {} unregistered", handle);
            }
            None => debug!("opus: destroy of unknown session {} ignored", handle),
        }
    }

    /// Returns true while `handle` names a registered session.
    pub fn contains(&self, handle: SessionHandle) -> bool {
        self.sessions.lock().contains_key(&handle.as_raw())
    }

    /// Number of registered sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Returns true if no session is registered.
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    fn get(&self, handle: SessionHandle) -> Result<Shared<C>, SessionError> {
        self.sessions
            .lock()
            .get(&handle.as_raw())
            .cloned()
            .ok_or(SessionError::InvalidSession)
    }
}
