//! Typed encoder controls.
//!
//! libopus configures an encoder through the variadic `opus_encoder_ctl`,
//! which cannot check that a request and its argument agree. This module
//! replaces it with a closed set of [`Control`] variants and one
//! non-variadic setter per option. Each setter performs exactly one control
//! call and returns the codec status unchanged.

use std::fmt;

use crate::codec::Codec;
use crate::status::Status;

// CTL request codes (opus_defines.h).
pub const OPUS_SET_BITRATE_REQUEST: i32 = 4002;
pub const OPUS_SET_VBR_REQUEST: i32 = 4006;
pub const OPUS_SET_COMPLEXITY_REQUEST: i32 = 4010;
pub const OPUS_SET_INBAND_FEC_REQUEST: i32 = 4012;
pub const OPUS_SET_DTX_REQUEST: i32 = 4016;
pub const OPUS_SET_DRED_DURATION_REQUEST: i32 = 4050;

/// One encoder option with its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    /// Target bitrate in bits per second.
    Bitrate(i32),
    /// Variable (true) or constant (false) bitrate.
    Vbr(bool),
    /// Computational complexity, 0 to 10.
    Complexity(i32),
    /// In-band forward error correction.
    InbandFec(bool),
    /// Discontinuous transmission.
    Dtx(bool),
    /// Deep redundancy window in milliseconds, 0 to 100.
    DredDuration(i32),
}

impl Control {
    /// Returns the CTL request code for this option.
    pub fn request(&self) -> i32 {
        match self {
            Self::Bitrate(_) => OPUS_SET_BITRATE_REQUEST,
            Self::Vbr(_) => OPUS_SET_VBR_REQUEST,
            Self::Complexity(_) => OPUS_SET_COMPLEXITY_REQUEST,
            Self::InbandFec(_) => OPUS_SET_INBAND_FEC_REQUEST,
            Self::Dtx(_) => OPUS_SET_DTX_REQUEST,
            Self::DredDuration(_) => OPUS_SET_DRED_DURATION_REQUEST,
        }
    }

    /// Returns the integer argument passed to the codec.
    pub fn value(&self) -> i32 {
        match *self {
            Self::Bitrate(v) | Self::Complexity(v) | Self::DredDuration(v) => v,
            Self::Vbr(b) | Self::InbandFec(b) | Self::Dtx(b) => b as i32,
        }
    }

    /// Returns the option name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bitrate(_) => "bitrate",
            Self::Vbr(_) => "vbr",
            Self::Complexity(_) => "complexity",
            Self::InbandFec(_) => "inband_fec",
            Self::Dtx(_) => "dtx",
            Self::DredDuration(_) => "dred_duration",
        }
    }

    /// Returns true for options whose failure means the linked codec lacks
    /// the feature rather than a bad value.
    pub fn is_optional_feature(&self) -> bool {
        matches!(self, Self::DredDuration(_))
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Vbr(b) | Self::InbandFec(b) | Self::Dtx(b) => write!(f, "{}={}", self.name(), b),
            _ => write!(f, "{}={}", self.name(), self.value()),
        }
    }
}

/// Applies one control to the codec.
///
/// A non-positive bitrate is rejected with [`Status::BAD_ARG`] without
/// calling the codec. Every other value is passed through verbatim.
pub fn apply<C: Codec>(codec: &mut C, control: Control) -> Result<(), Status> {
    if let Control::Bitrate(bps) = control {
        if bps <= 0 {
            return Err(Status::BAD_ARG);
        }
    }
    Status::check(codec.ctl(control.request(), control.value()))
}

/// Sets the target bitrate in bits per second.
pub fn set_bitrate<C: Codec>(codec: &mut C, bits_per_second: i32) -> Result<(), Status> {
    apply(codec, Control::Bitrate(bits_per_second))
}

/// Sets the DRED duration. The caller keeps `milliseconds` within 0..=100.
pub fn set_dred_duration<C: Codec>(codec: &mut C, milliseconds: i32) -> Result<(), Status> {
    apply(codec, Control::DredDuration(milliseconds))
}

/// Enables or disables variable bitrate.
pub fn set_vbr<C: Codec>(codec: &mut C, enabled: bool) -> Result<(), Status> {
    apply(codec, Control::Vbr(enabled))
}

/// Sets the encoder complexity (0-10).
pub fn set_complexity<C: Codec>(codec: &mut C, level: i32) -> Result<(), Status> {
    apply(codec, Control::Complexity(level))
}

/// Enables or disables in-band FEC.
pub fn set_inband_fec<C: Codec>(codec: &mut C, enabled: bool) -> Result<(), Status> {
    apply(codec, Control::InbandFec(enabled))
}

/// Enables or disables DTX.
pub fn set_dtx<C: Codec>(codec: &mut C, enabled: bool) -> Result<(), Status> {
    apply(codec, Control::Dtx(enabled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Application, Channels, SampleRate};
    use crate::fake::FakeCodec;

    fn codec() -> FakeCodec {
        FakeCodec::create(SampleRate::Hz16000, Channels::Mono, Application::Voip).unwrap()
    }

    #[test]
    fn test_request_codes() {
        assert_eq!(Control::Bitrate(1).request(), 4002);
        assert_eq!(Control::Vbr(true).request(), 4006);
        assert_eq!(Control::Complexity(1).request(), 4010);
        assert_eq!(Control::InbandFec(true).request(), 4012);
        assert_eq!(Control::Dtx(true).request(), 4016);
        assert_eq!(Control::DredDuration(1).request(), 4050);
    }

    #[test]
    fn test_values() {
        assert_eq!(Control::Vbr(true).value(), 1);
        assert_eq!(Control::Dtx(false).value(), 0);
        assert_eq!(Control::Complexity(7).value(), 7);
        assert_eq!(Control::Bitrate(24000).to_string(), "bitrate=24000");
        assert_eq!(Control::InbandFec(true).to_string(), "inband_fec=true");
    }

    #[test]
    fn test_setters_reach_codec() {
        let mut c = codec();
        assert_eq!(set_bitrate(&mut c, 24000), Ok(()));
        assert_eq!(set_vbr(&mut c, false), Ok(()));
        assert_eq!(set_complexity(&mut c, 10), Ok(()));
        assert_eq!(set_inband_fec(&mut c, true), Ok(()));
        assert_eq!(set_dtx(&mut c, true), Ok(()));
        assert_eq!(c.bitrate, 24000);
        assert!(!c.vbr);
        assert_eq!(c.complexity, 10);
        assert!(c.inband_fec);
        assert!(c.dtx);
        assert_eq!(c.ctl_calls, 5);
    }

    #[test]
    fn test_non_positive_bitrate_never_reaches_codec() {
        let mut c = codec();
        assert_eq!(set_bitrate(&mut c, 0), Err(Status::BAD_ARG));
        assert_eq!(set_bitrate(&mut c, -1000), Err(Status::BAD_ARG));
        assert_eq!(c.ctl_calls, 0);
    }

    #[test]
    fn test_bitrate_out_of_range_is_clamped_by_codec() {
        let mut c = codec();
        assert_eq!(set_bitrate(&mut c, 100), Ok(()));
        assert_eq!(c.bitrate, 500);
        assert_eq!(set_bitrate(&mut c, 1_000_000), Ok(()));
        assert_eq!(c.bitrate, 300_000);
    }

    #[test]
    fn test_codec_rejections_pass_through() {
        let mut c = codec();
        assert_eq!(Status::check(c.ctl(OPUS_SET_BITRATE_REQUEST, -5)), Err(Status::BAD_ARG));
        assert_eq!(set_vbr(&mut c, true), Ok(()));
        assert_eq!(Status::check(c.ctl(OPUS_SET_VBR_REQUEST, 7)), Err(Status::BAD_ARG));
        assert_eq!(set_complexity(&mut c, 11), Err(Status::BAD_ARG));
        assert_eq!(set_complexity(&mut c, -1), Err(Status::BAD_ARG));
        assert_eq!(c.complexity, 9);
    }

    #[test]
    fn test_dred_unimplemented() {
        let mut c = codec();
        c.dred_supported = false;
        assert_eq!(set_dred_duration(&mut c, 100), Err(Status::UNIMPLEMENTED));
        c.dred_supported = true;
        assert_eq!(set_dred_duration(&mut c, 100), Ok(()));
        assert_eq!(set_dred_duration(&mut c, 250), Err(Status::BAD_ARG));
        assert_eq!(c.dred_duration_ms, 100);
    }

    #[test]
    fn test_complexity_idempotent() {
        let mut c = codec();
        let first = set_complexity(&mut c, 5);
        let second = set_complexity(&mut c, 5);
        assert_eq!(first, second);
        assert_eq!(c.complexity, 5);
    }
}
