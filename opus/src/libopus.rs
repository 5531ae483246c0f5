//! libopus-backed codec and the process-wide session table.

use std::ptr;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::codec::Codec;
use crate::config::{Application, Channels, ConfigurationRequest, EncoderConfig, SampleRate};
use crate::control::Control;
use crate::error::{ConfigError, SessionError};
use crate::ffi::{self, OpusEncoder as OpusEncoderHandle};
use crate::packet::EncodeOutcome;
use crate::registry::{SessionHandle, SessionRegistry};
use crate::session::SessionStats;
use crate::status::Status;

impl Application {
    fn to_ffi(self) -> i32 {
        match self {
            Self::Voip => ffi::OPUS_APPLICATION_VOIP,
            Self::Audio => ffi::OPUS_APPLICATION_AUDIO,
            Self::RestrictedLowdelay => ffi::OPUS_APPLICATION_RESTRICTED_LOWDELAY,
        }
    }
}

/// A libopus `OpusEncoder` instance.
pub struct LibOpus {
    channels: usize,
    handle: *mut OpusEncoderHandle,
}

// Safety: the encoder state is only touched through &mut self.
unsafe impl Send for LibOpus {}

impl Codec for LibOpus {
    fn create(
        sample_rate: SampleRate,
        channels: Channels,
        application: Application,
    ) -> Result<Self, Status> {
        let mut error: i32 = 0;
        let handle = unsafe {
            ffi::opus_encoder_create(
                sample_rate.hz(),
                channels.count() as i32,
                application.to_ffi(),
                &mut error,
            )
        };

        if handle.is_null() || error != ffi::OPUS_OK {
            if !handle.is_null() {
                unsafe { ffi::opus_encoder_destroy(handle) };
            }
            let status = if error == ffi::OPUS_OK { Status::ALLOC_FAIL } else { Status(error) };
            debug!("opus: opus_encoder_create: {}", status);
            return Err(status);
        }

        Ok(Self {
            channels: channels.count(),
            handle,
        })
    }

    fn ctl(&mut self, request: i32, value: i32) -> i32 {
        unsafe { ffi::opus_encoder_ctl(self.handle, request, value) }
    }

    fn encode(&mut self, pcm: &[i16], frame_size: usize, out: &mut [u8]) -> i32 {
        let Ok(n) = i32::try_from(frame_size) else {
            return Status::BAD_ARG.code();
        };
        if pcm.len() < frame_size.saturating_mul(self.channels) {
            return Status::BAD_ARG.code();
        }
        let max = i32::try_from(out.len()).unwrap_or(i32::MAX);
        unsafe { ffi::opus_encode(self.handle, pcm.as_ptr(), n, out.as_mut_ptr(), max) }
    }
}

impl Drop for LibOpus {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { ffi::opus_encoder_destroy(self.handle) };
            self.handle = ptr::null_mut();
        }
    }
}

/// Returns the linked libopus version, e.g. "libopus 1.5.2".
pub fn version() -> String {
    ffi::version_string()
}

static SESSIONS: Lazy<SessionRegistry<LibOpus>> = Lazy::new(SessionRegistry::new);

/// Returns the process-wide registry of libopus sessions.
pub fn registry() -> &'static SessionRegistry<LibOpus> {
    &SESSIONS
}

/// Creates a VoIP encoder session. See [`SessionRegistry::create`].
pub fn create(
    sample_rate: i32,
    channels: i32,
    bitrate: i32,
    dred_duration_ms: i32,
) -> Result<SessionHandle, SessionError> {
    SESSIONS.create(sample_rate, channels, bitrate, dred_duration_ms)
}

/// Creates an encoder session from a full config.
pub fn create_with(config: &EncoderConfig) -> Result<SessionHandle, SessionError> {
    SESSIONS.create_with(config)
}

/// Encodes one frame of interleaved PCM.
pub fn encode(
    handle: SessionHandle,
    pcm: &[i16],
    frame_size: usize,
) -> Result<EncodeOutcome, SessionError> {
    SESSIONS.encode(handle, pcm, frame_size)
}

/// Encodes one frame given as little-endian i16 bytes.
pub fn encode_bytes(
    handle: SessionHandle,
    pcm: &[u8],
    frame_size: usize,
) -> Result<EncodeOutcome, SessionError> {
    SESSIONS.encode_bytes(handle, pcm, frame_size)
}

/// Applies one option to a session.
pub fn configure(handle: SessionHandle, control: Control) -> Result<(), SessionError> {
    SESSIONS.configure(handle, control)
}

/// Applies every option in `request`; returns the ones that failed.
pub fn apply(
    handle: SessionHandle,
    request: &ConfigurationRequest,
) -> Result<Vec<ConfigError>, SessionError> {
    SESSIONS.apply(handle, request)
}

/// Returns the configuration failures recorded when the session was created.
pub fn diagnostics(handle: SessionHandle) -> Result<Vec<ConfigError>, SessionError> {
    SESSIONS.diagnostics(handle)
}

/// Returns the session's running counters.
pub fn stats(handle: SessionHandle) -> Result<SessionStats, SessionError> {
    SESSIONS.stats(handle)
}

/// Destroys a session. Always succeeds; repeated calls are no-ops.
pub fn destroy(handle: SessionHandle) {
    SESSIONS.destroy(handle)
}
