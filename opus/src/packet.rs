//! Encoded packets and frame durations.

use std::fmt;
use std::time::Duration;

use crate::config::SampleRate;

/// One complete encoded Opus packet, owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet(Vec<u8>);

impl Packet {
    /// Copies a packet out of a codec buffer.
    pub fn from_slice(data: &[u8]) -> Self {
        Self(data.to_vec())
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the packet holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the TOC byte, which every non-empty packet starts with.
    pub fn toc(&self) -> Option<u8> {
        self.0.first().copied()
    }

    /// Returns true if the TOC byte marks the packet as stereo.
    pub fn is_stereo(&self) -> bool {
        self.toc().is_some_and(|t| t & 0x04 != 0)
    }

    /// Consumes the packet, returning its bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for Packet {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Packet> for Vec<u8> {
    fn from(p: Packet) -> Vec<u8> {
        p.0
    }
}

/// Result of encoding one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeOutcome {
    /// The codec produced a packet.
    Packet(Packet),
    /// The codec produced nothing for this frame (DTX during silence).
    NoPacket,
}

impl EncodeOutcome {
    /// Returns the packet, if any.
    pub fn packet(&self) -> Option<&Packet> {
        match self {
            Self::Packet(p) => Some(p),
            Self::NoPacket => None,
        }
    }

    /// Consumes the outcome, returning the packet, if any.
    pub fn into_packet(self) -> Option<Packet> {
        match self {
            Self::Packet(p) => Some(p),
            Self::NoPacket => None,
        }
    }

    /// Returns the number of encoded bytes (0 for no packet).
    pub fn len(&self) -> usize {
        self.packet().map_or(0, Packet::len)
    }

    /// Returns true for [`EncodeOutcome::NoPacket`] and for empty packets.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Frame durations the Opus encoder accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameDuration {
    Duration2500us,
    Duration5ms,
    Duration10ms,
    Duration20ms,
    Duration40ms,
    Duration60ms,
}

impl FrameDuration {
    pub const ALL: [FrameDuration; 6] = [
        Self::Duration2500us,
        Self::Duration5ms,
        Self::Duration10ms,
        Self::Duration20ms,
        Self::Duration40ms,
        Self::Duration60ms,
    ];

    /// Returns the duration in microseconds.
    pub fn micros(&self) -> u64 {
        match self {
            Self::Duration2500us => 2500,
            Self::Duration5ms => 5_000,
            Self::Duration10ms => 10_000,
            Self::Duration20ms => 20_000,
            Self::Duration40ms => 40_000,
            Self::Duration60ms => 60_000,
        }
    }

    /// Returns the duration as a Duration.
    pub fn duration(&self) -> Duration {
        Duration::from_micros(self.micros())
    }

    /// Returns the number of samples per channel in one frame at `rate`.
    pub fn samples_per_channel(&self, rate: SampleRate) -> usize {
        (rate.hz() as u64 * self.micros() / 1_000_000) as usize
    }

    /// Finds the duration matching a per-channel frame size at `rate`.
    pub fn from_frame_size(rate: SampleRate, frame_size: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.samples_per_channel(rate) == frame_size)
    }
}

impl fmt::Display for FrameDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duration2500us => write!(f, "2.5ms"),
            Self::Duration5ms => write!(f, "5ms"),
            Self::Duration10ms => write!(f, "10ms"),
            Self::Duration20ms => write!(f, "20ms"),
            Self::Duration40ms => write!(f, "40ms"),
            Self::Duration60ms => write!(f, "60ms"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_per_channel() {
        assert_eq!(FrameDuration::Duration20ms.samples_per_channel(SampleRate::Hz48000), 960);
        assert_eq!(FrameDuration::Duration20ms.samples_per_channel(SampleRate::Hz16000), 320);
        assert_eq!(FrameDuration::Duration2500us.samples_per_channel(SampleRate::Hz8000), 20);
        assert_eq!(FrameDuration::Duration60ms.samples_per_channel(SampleRate::Hz12000), 720);
    }

    #[test]
    fn test_from_frame_size() {
        assert_eq!(
            FrameDuration::from_frame_size(SampleRate::Hz48000, 960),
            Some(FrameDuration::Duration20ms)
        );
        assert_eq!(FrameDuration::from_frame_size(SampleRate::Hz48000, 1000), None);
        assert_eq!(FrameDuration::Duration2500us.to_string(), "2.5ms");
    }

    #[test]
    fn test_packet() {
        let p = Packet::from_slice(&[0x7c, 1, 2]);
        assert_eq!(p.len(), 3);
        assert_eq!(p.toc(), Some(0x7c));
        assert!(p.is_stereo());

        let out = EncodeOutcome::Packet(p.clone());
        assert_eq!(out.packet(), Some(&p));
        assert_eq!(out.len(), 3);
        assert_eq!(out.into_packet().map(Packet::into_vec), Some(vec![0x7c, 1, 2]));

        assert!(EncodeOutcome::NoPacket.is_empty());
        assert_eq!(EncodeOutcome::NoPacket.packet(), None);
    }
}
