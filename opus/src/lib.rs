//! Managed Opus encoder sessions.
//!
//! This crate wraps an Opus encoder instance in an [`EncoderSession`] with an
//! explicit lifecycle (create, encode, configure, destroy) and replaces the
//! variadic `opus_encoder_ctl` with typed [`Control`] values.
//!
//! - `control`: one non-variadic setter per option, returning the codec status
//! - `session`: owns one codec instance and a reused 4000-byte packet buffer
//! - `registry`: opaque [`SessionHandle`]s for JNI/Swift bridges
//!
//! Configuration failures while a session is created are not fatal. A bad
//! bitrate or a codec built without DRED leaves a working encoder at default
//! settings, with the failure kept in [`EncoderSession::diagnostics`].
//!
//! # Example
//!
//! ```ignore
//! use giztoy_opus::{Channels, Control, EncodeOutcome, EncoderSession, LibOpus, SampleRate};
//!
//! let mut session =
//!     EncoderSession::<LibOpus>::create(SampleRate::Hz48000, Channels::Mono, 24000, 100)?;
//! session.configure(Control::Dtx(true))?;
//!
//! let pcm = vec![0i16; 960]; // 20ms at 48kHz
//! match session.encode(&pcm, 960)? {
//!     EncodeOutcome::Packet(p) => send(p.as_bytes()),
//!     EncodeOutcome::NoPacket => {}
//! }
//! session.destroy();
//! ```
//!
//! # Linking
//!
//! The libopus backend is enabled with the `libopus` feature. `build.rs` links
//! `libopus` from `OPUS_LIB_DIR` (default `/opt/homebrew/lib`). DRED requires
//! libopus 1.5 built with `--enable-dred`; other builds report
//! [`ConfigError::FeatureUnavailable`].

mod codec;
mod config;
pub mod control;
mod error;
mod packet;
mod registry;
mod session;
mod status;

#[cfg(feature = "libopus")]
mod ffi;
#[cfg(feature = "libopus")]
pub mod libopus;

#[cfg(test)]
mod fake;

pub use codec::{Codec, MAX_PACKET_SIZE};
pub use config::{Application, Channels, ConfigurationRequest, EncoderConfig, SampleRate};
pub use control::Control;
pub use error::{ConfigError, SessionError};
pub use packet::{EncodeOutcome, FrameDuration, Packet};
pub use registry::{SessionHandle, SessionRegistry};
pub use session::{EncoderSession, SessionState, SessionStats};
pub use status::Status;

#[cfg(feature = "libopus")]
pub use libopus::LibOpus;
