//! Encoder session: one codec instance, its configuration and its scratch
//! buffer.

use tracing::{debug, error, info, warn};

use crate::codec::{Codec, MAX_PACKET_SIZE};
use crate::config::{Channels, ConfigurationRequest, EncoderConfig, SampleRate};
use crate::control::{self, Control};
use crate::error::{ConfigError, SessionError};
use crate::packet::{EncodeOutcome, FrameDuration, Packet};
use crate::status::Status;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Live,
    Destroyed,
}

/// Counters kept per session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Frames handed to the codec.
    pub frames: u64,
    /// Frames that produced a packet.
    pub packets: u64,
    /// Frames that produced no packet.
    pub empty: u64,
    /// Frames the codec failed to encode.
    pub failures: u64,
    /// Total packet bytes produced.
    pub bytes: u64,
}

/// A live Opus encoder.
///
/// The session owns exactly one codec instance until [`destroy`] is called
/// (or the session is dropped). After that every operation fails with
/// [`SessionError::InvalidSession`] and never reaches the codec.
///
/// Configuration failures during creation do not fail the session; they are
/// logged and kept in [`diagnostics`], and the codec keeps its defaults.
///
/// A session is not internally synchronized. Use one session per stream, or
/// wrap it in a mutex (as [`SessionRegistry`] does).
///
/// [`destroy`]: EncoderSession::destroy
/// [`diagnostics`]: EncoderSession::diagnostics
/// [`SessionRegistry`]: crate::SessionRegistry
pub struct EncoderSession<C: Codec> {
    codec: Option<C>,
    sample_rate: SampleRate,
    channels: Channels,
    scratch: Box<[u8]>,
    diagnostics: Vec<ConfigError>,
    stats: SessionStats,
}

impl<C: Codec> EncoderSession<C> {
    /// Creates a VoIP encoder and applies bitrate and, when
    /// `dred_duration_ms > 0`, the DRED duration.
    ///
    /// `dred_duration_ms` must be within 0..=100; the value is not clamped.
    pub fn create(
        sample_rate: SampleRate,
        channels: Channels,
        bitrate: i32,
        dred_duration_ms: i32,
    ) -> Result<Self, SessionError> {
        Self::with_config(&EncoderConfig::new(sample_rate, channels, bitrate, dred_duration_ms))
    }

    /// Creates an encoder from a full config. Tuning options are applied
    /// after bitrate and DRED, each best-effort.
    ///
    /// `config.bitrate` and `config.dred_duration_ms` take precedence; the
    /// same two fields in `config.tuning` are ignored here.
    pub fn with_config(config: &EncoderConfig) -> Result<Self, SessionError> {
        let created = C::create(config.sample_rate, config.channels, config.application);
        let codec = created.map_err(|status| {
            error!(
                "opus: failed to create encoder {}/{}ch: {}",
                config.sample_rate,
                config.channels.count(),
                status
            );
            SessionError::CreateFailed(status)
        })?;

        info!(
            "opus: encoder created: {}, {}ch, {}kbps",
            config.sample_rate,
            config.channels.count(),
            config.bitrate / 1000
        );

        let mut session = Self {
            codec: Some(codec),
            sample_rate: config.sample_rate,
            channels: config.channels,
            scratch: vec![0u8; MAX_PACKET_SIZE].into_boxed_slice(),
            diagnostics: Vec::new(),
            stats: SessionStats::default(),
        };

        session.apply_recorded(Control::Bitrate(config.bitrate));
        if config.dred_duration_ms > 0 {
            session.apply_recorded(Control::DredDuration(config.dred_duration_ms));
        }
        for c in config.tuning.controls() {
            if matches!(c, Control::Bitrate(_) | Control::DredDuration(_)) {
                debug!("opus: {} in tuning ignored at create", c);
                continue;
            }
            session.apply_recorded(c);
        }

        Ok(session)
    }

    /// Returns the sample rate.
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Returns the channel layout.
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Returns whether the session still owns its codec.
    pub fn state(&self) -> SessionState {
        if self.codec.is_some() { SessionState::Live } else { SessionState::Destroyed }
    }

    /// Returns true until [`destroy`](Self::destroy) is called.
    pub fn is_live(&self) -> bool {
        self.codec.is_some()
    }

    /// Configuration failures recorded while the session was created.
    pub fn diagnostics(&self) -> &[ConfigError] {
        &self.diagnostics
    }

    /// Returns the frame and packet counters.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Returns the codec instance while the session is live.
    pub fn codec(&self) -> Option<&C> {
        self.codec.as_ref()
    }

    /// Returns the per-channel frame size for a duration at this session's
    /// sample rate.
    pub fn frame_size(&self, duration: FrameDuration) -> usize {
        duration.samples_per_channel(self.sample_rate)
    }

    /// Applies one option to the live codec.
    pub fn configure(&mut self, control: Control) -> Result<(), SessionError> {
        let codec = self.codec.as_mut().ok_or(SessionError::InvalidSession)?;
        apply_logged(codec, control)?;
        Ok(())
    }

    /// Applies every option present in `request`, continuing past failures.
    /// Returns the options that were not applied.
    pub fn apply(
        &mut self,
        request: &ConfigurationRequest,
    ) -> Result<Vec<ConfigError>, SessionError> {
        let codec = self.codec.as_mut().ok_or(SessionError::InvalidSession)?;
        Ok(request
            .controls()
            .into_iter()
            .filter_map(|c| apply_logged(codec, c).err())
            .collect())
    }

    /// Encodes one frame of interleaved PCM.
    ///
    /// `pcm` must hold exactly `frame_size * channels` samples. Whether
    /// `frame_size` is a legal duration for the sample rate is left to the
    /// codec. The returned packet is a copy; the scratch buffer is reused by
    /// the next call.
    pub fn encode(
        &mut self,
        pcm: &[i16],
        frame_size: usize,
    ) -> Result<EncodeOutcome, SessionError> {
        let n = self.encode_scratch(pcm, frame_size)?;
        if n == 0 {
            return Ok(EncodeOutcome::NoPacket);
        }
        let packet = Packet::from_slice(&self.scratch[..n]);
        self.record_packet(n);
        Ok(EncodeOutcome::Packet(packet))
    }

    /// Encodes into a caller buffer and returns the packet length (0 when
    /// no packet was produced).
    ///
    /// A packet that does not fit in `buf` is dropped and counted as a
    /// failure.
    pub fn encode_to(
        &mut self,
        pcm: &[i16],
        frame_size: usize,
        buf: &mut [u8],
    ) -> Result<usize, SessionError> {
        let n = self.encode_scratch(pcm, frame_size)?;
        if n > buf.len() {
            self.stats.failures += 1;
            warn!("opus: {} byte packet does not fit in {} byte buffer", n, buf.len());
            return Err(SessionError::EncodeFailed(Status::BUFFER_TOO_SMALL));
        }
        buf[..n].copy_from_slice(&self.scratch[..n]);
        if n > 0 {
            self.record_packet(n);
        }
        Ok(n)
    }

    /// Encodes PCM given as little-endian i16 bytes.
    pub fn encode_bytes(
        &mut self,
        pcm: &[u8],
        frame_size: usize,
    ) -> Result<EncodeOutcome, SessionError> {
        if !self.is_live() {
            return Err(SessionError::InvalidSession);
        }
        if pcm.len() % 2 != 0 {
            return Err(SessionError::OddByteLength(pcm.len()));
        }
        let expected = frame_size.saturating_mul(self.channels.count());
        if pcm.len() / 2 != expected {
            return Err(SessionError::FrameLength {
                expected,
                got: pcm.len() / 2,
            });
        }
        let samples: Vec<i16> = pcm
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        self.encode(&samples, frame_size)
    }

    /// Releases the codec. Calling it again is a no-op.
    pub fn destroy(&mut self) {
        if let Some(codec) = self.codec.take() {
            drop(codec);
            info!("opus: encoder destroyed");
        }
    }

    /// Runs the codec into the scratch buffer. Packets are counted by the
    /// caller once they have been handed out.
    fn encode_scratch(&mut self, pcm: &[i16], frame_size: usize) -> Result<usize, SessionError> {
        let codec = self.codec.as_mut().ok_or(SessionError::InvalidSession)?;

        let expected = frame_size.saturating_mul(self.channels.count());
        if pcm.len() != expected {
            return Err(SessionError::FrameLength {
                expected,
                got: pcm.len(),
            });
        }

        self.stats.frames += 1;
        let ret = codec.encode(pcm, frame_size, &mut self.scratch);

        if ret < 0 {
            self.stats.failures += 1;
            let status = Status(ret);
            warn!("opus: encoding failed: {}", status);
            return Err(SessionError::EncodeFailed(status));
        }
        if ret == 0 {
            self.stats.empty += 1;
            debug!("opus: encoded 0 bytes (DTX or silence)");
            return Ok(0);
        }

        let n = ret as usize;
        if n > self.scratch.len() {
            self.stats.failures += 1;
            error!("opus: codec reported {} bytes for a {} byte buffer", n, self.scratch.len());
            return Err(SessionError::EncodeFailed(Status::INTERNAL_ERROR));
        }
        Ok(n)
    }

    fn record_packet(&mut self, n: usize) {
        self.stats.packets += 1;
        self.stats.bytes += n as u64;
    }

    fn apply_recorded(&mut self, control: Control) {
        let Some(codec) = self.codec.as_mut() else {
            return;
        };
        if let Err(e) = apply_logged(codec, control) {
            self.diagnostics.push(e);
        }
    }
}

impl<C: Codec> Drop for EncoderSession<C> {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn apply_logged<C: Codec>(codec: &mut C, control: Control) -> Result<(), ConfigError> {
    match control::apply(codec, control) {
        Ok(()) => {
            debug!("opus: {} applied", control);
            Ok(())
        }
        Err(status) => {
            let err = ConfigError::new(control, status);
            if err.is_feature_unavailable() {
                warn!(
                    "opus: {} not available: {} (codec may be built without this feature)",
                    control, status
                );
            } else {
                warn!("opus: failed to set {}: {}", control, status);
            }
            Err(err)
        }
    }
}
