use crate::config::{Application, Channels, SampleRate};
use crate::status::Status;

/// Maximum size of one encoded Opus packet.
pub const MAX_PACKET_SIZE: usize = 4000;

/// A raw Opus encoder instance.
///
/// This is the seam between the session logic and the codec library. The
/// control call takes exactly one integer argument, which covers every
/// `OPUS_SET_*` request the session issues. Dropping the value releases the
/// underlying instance.
pub trait Codec: Send + Sized {
    /// Allocates and initializes an encoder instance.
    fn create(
        sample_rate: SampleRate,
        channels: Channels,
        application: Application,
    ) -> Result<Self, Status>;

    /// Issues one control request and returns the raw status code.
    fn ctl(&mut self, request: i32, value: i32) -> i32;

    /// Encodes one frame of interleaved PCM into `out`.
    ///
    /// Returns the packet length, 0 when no packet was produced, or a
    /// negative status code.
    fn encode(&mut self, pcm: &[i16], frame_size: usize, out: &mut [u8]) -> i32;
}
