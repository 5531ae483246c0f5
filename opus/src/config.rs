//! Encoder parameters and configuration requests.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::control::Control;

/// Sample rates accepted by the Opus encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum SampleRate {
    Hz8000,
    Hz12000,
    Hz16000,
    Hz24000,
    Hz48000,
}

impl SampleRate {
    pub const ALL: [SampleRate; 5] = [
        Self::Hz8000,
        Self::Hz12000,
        Self::Hz16000,
        Self::Hz24000,
        Self::Hz48000,
    ];

    /// Returns the rate in Hz.
    pub fn hz(self) -> i32 {
        match self {
            Self::Hz8000 => 8000,
            Self::Hz12000 => 12000,
            Self::Hz16000 => 16000,
            Self::Hz24000 => 24000,
            Self::Hz48000 => 48000,
        }
    }

    /// Looks up a supported rate, or `None` for anything outside the set.
    pub fn from_hz(hz: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.hz() == hz)
    }
}

impl TryFrom<i32> for SampleRate {
    type Error = String;

    fn try_from(hz: i32) -> Result<Self, Self::Error> {
        Self::from_hz(hz).ok_or_else(|| format!("unsupported sample rate {hz} Hz"))
    }
}

impl From<SampleRate> for i32 {
    fn from(r: SampleRate) -> i32 {
        r.hz()
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Hz", self.hz())
    }
}

/// Interleaved channel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Channels {
    Mono,
    Stereo,
}

impl Channels {
    /// Returns the channel count.
    pub fn count(self) -> usize {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
        }
    }

    /// Maps 1 or 2 to a layout.
    pub fn from_count(n: i32) -> Option<Self> {
        match n {
            1 => Some(Self::Mono),
            2 => Some(Self::Stereo),
            _ => None,
        }
    }
}

impl TryFrom<i32> for Channels {
    type Error = String;

    fn try_from(n: i32) -> Result<Self, Self::Error> {
        Self::from_count(n).ok_or_else(|| format!("unsupported channel count {n}"))
    }
}

impl From<Channels> for i32 {
    fn from(c: Channels) -> i32 {
        c.count() as i32
    }
}

/// Opus application profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Application {
    /// Best quality for voice signals.
    #[default]
    Voip,
    /// Best quality for non-voice signals.
    Audio,
    /// Minimum possible coding delay.
    RestrictedLowdelay,
}

/// Optional tuning applied to a live encoder.
///
/// Every field is independent; `None` leaves the codec default in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigurationRequest {
    pub bitrate: Option<i32>,
    pub dred_duration_ms: Option<i32>,
    pub vbr: Option<bool>,
    pub complexity: Option<i32>,
    pub inband_fec: Option<bool>,
    pub dtx: Option<bool>,
}

impl ConfigurationRequest {
    /// Returns the controls this request sets, in application order.
    pub fn controls(&self) -> Vec<Control> {
        let mut out = Vec::new();
        if let Some(v) = self.bitrate {
            out.push(Control::Bitrate(v));
        }
        if let Some(v) = self.dred_duration_ms {
            out.push(Control::DredDuration(v));
        }
        if let Some(v) = self.vbr {
            out.push(Control::Vbr(v));
        }
        if let Some(v) = self.complexity {
            out.push(Control::Complexity(v));
        }
        if let Some(v) = self.inband_fec {
            out.push(Control::InbandFec(v));
        }
        if let Some(v) = self.dtx {
            out.push(Control::Dtx(v));
        }
        out
    }

    /// Returns true if no option is set.
    pub fn is_empty(&self) -> bool {
        self.controls().is_empty()
    }
}

/// Full parameter set for creating an encoder session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Input sample rate (default: 48000).
    pub sample_rate: SampleRate,
    /// Channel layout (default: mono).
    pub channels: Channels,
    /// Application profile (default: VoIP).
    pub application: Application,
    /// Target bitrate in bits per second (default: 24000).
    pub bitrate: i32,
    /// DRED recovery window; 0 disables (default: 0).
    pub dred_duration_ms: i32,
    /// Tuning applied after bitrate and DRED. Its `bitrate` and
    /// `dred_duration_ms` are ignored at creation; the fields above win.
    pub tuning: ConfigurationRequest,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            sample_rate: SampleRate::Hz48000,
            channels: Channels::Mono,
            application: Application::Voip,
            bitrate: 24000,
            dred_duration_ms: 0,
            tuning: ConfigurationRequest::default(),
        }
    }
}

impl EncoderConfig {
    /// Creates a VoIP config with the given core parameters and no tuning.
    pub fn new(
        sample_rate: SampleRate,
        channels: Channels,
        bitrate: i32,
        dred_duration_ms: i32,
    ) -> Self {
        Self {
            sample_rate,
            channels,
            bitrate,
            dred_duration_ms,
            ..Self::default()
        }
    }
}
