//! In-memory codec that follows libopus' argument checks and return codes.

use std::cell::Cell;

use crate::codec::Codec;
use crate::config::{Application, Channels, SampleRate};
use crate::control::*;
use crate::status::Status;

const OPUS_AUTO: i32 = -1000;
const OPUS_BITRATE_MAX: i32 = -1;

thread_local! {
    static LIVE: Cell<usize> = const { Cell::new(0) };
    static CREATE_FAILURE: Cell<Option<Status>> = const { Cell::new(None) };
    static DRED_SUPPORTED: Cell<bool> = const { Cell::new(true) };
}

/// Number of fake instances currently alive on this thread.
pub fn live() -> usize {
    LIVE.with(|c| c.get())
}

/// Makes every subsequent create on this thread fail with `status`.
pub fn fail_create(status: Option<Status>) {
    CREATE_FAILURE.with(|c| c.set(status));
}

/// Controls whether instances created on this thread accept DRED requests.
pub fn set_dred_supported(supported: bool) {
    DRED_SUPPORTED.with(|c| c.set(supported));
}

pub struct FakeCodec {
    pub sample_rate: i32,
    pub channels: usize,
    pub bitrate: i32,
    pub vbr: bool,
    pub complexity: i32,
    pub inband_fec: bool,
    pub dtx: bool,
    pub dred_supported: bool,
    pub dred_duration_ms: i32,
    pub ctl_calls: usize,
    pub encode_calls: usize,
}

impl FakeCodec {
    fn valid_frame_size(&self, frame_size: usize) -> bool {
        let rate = self.sample_rate as usize;
        [rate / 400, rate / 200, rate / 100, rate / 50, rate / 25, rate * 3 / 50]
            .contains(&frame_size)
    }

    fn effective_bitrate(&self) -> i32 {
        match self.bitrate {
            OPUS_AUTO => 24000,
            OPUS_BITRATE_MAX => 300_000 * self.channels as i32,
            b => b,
        }
    }
}

impl Codec for FakeCodec {
    fn create(
        sample_rate: SampleRate,
        channels: Channels,
        _application: Application,
    ) -> Result<Self, Status> {
        if let Some(status) = CREATE_FAILURE.with(|c| c.get()) {
            return Err(status);
        }
        LIVE.with(|c| c.set(c.get() + 1));
        Ok(Self {
            sample_rate: sample_rate.hz(),
            channels: channels.count(),
            bitrate: OPUS_AUTO,
            vbr: true,
            complexity: 9,
            inband_fec: false,
            dtx: false,
            dred_supported: DRED_SUPPORTED.with(|c| c.get()),
            dred_duration_ms: 0,
            ctl_calls: 0,
            encode_calls: 0,
        })
    }

    fn ctl(&mut self, request: i32, value: i32) -> i32 {
        self.ctl_calls += 1;
        let status = match request {
            OPUS_SET_BITRATE_REQUEST => match value {
                OPUS_AUTO | OPUS_BITRATE_MAX => {
                    self.bitrate = value;
                    Status::OK
                }
                v if v <= 0 => Status::BAD_ARG,
                v => {
                    // libopus clamps rather than rejects positive rates.
                    self.bitrate = v.clamp(500, 300_000 * self.channels as i32);
                    Status::OK
                }
            },
            OPUS_SET_VBR_REQUEST => match value {
                0 | 1 => {
                    self.vbr = value == 1;
                    Status::OK
                }
                _ => Status::BAD_ARG,
            },
            OPUS_SET_COMPLEXITY_REQUEST => match value {
                0..=10 => {
                    self.complexity = value;
                    Status::OK
                }
                _ => Status::BAD_ARG,
            },
            OPUS_SET_INBAND_FEC_REQUEST => match value {
                0..=2 => {
                    self.inband_fec = value != 0;
                    Status::OK
                }
                _ => Status::BAD_ARG,
            },
            OPUS_SET_DTX_REQUEST => match value {
                0 | 1 => {
                    self.dtx = value == 1;
                    Status::OK
                }
                _ => Status::BAD_ARG,
            },
            OPUS_SET_DRED_DURATION_REQUEST if !self.dred_supported => Status::UNIMPLEMENTED,
            OPUS_SET_DRED_DURATION_REQUEST => match value {
                0..=104 => {
                    self.dred_duration_ms = value;
                    Status::OK
                }
                _ => Status::BAD_ARG,
            },
            _ => Status::UNIMPLEMENTED,
        };
        status.code()
    }

    fn encode(&mut self, pcm: &[i16], frame_size: usize, out: &mut [u8]) -> i32 {
        self.encode_calls += 1;
        if !self.valid_frame_size(frame_size) || pcm.len() < frame_size * self.channels {
            return Status::BAD_ARG.code();
        }
        if out.len() < 2 {
            return Status::BUFFER_TOO_SMALL.code();
        }

        let silent = pcm.iter().all(|&s| s == 0);
        if silent && self.dtx {
            return 0;
        }

        let n = if silent {
            3usize.min(out.len())
        } else {
            let bits =
                self.effective_bitrate() as i64 * frame_size as i64 / self.sample_rate as i64;
            ((bits / 8) as usize).clamp(2, out.len())
        };

        out[0] = 0x78 | if self.channels == 2 { 0x04 } else { 0 };
        let mut acc: u32 = 0x9e37_79b9;
        for (i, b) in out[1..n].iter_mut().enumerate() {
            let s = pcm[i % pcm.len()] as u16 as u32;
            acc = acc.rotate_left(5) ^ s.wrapping_mul(31).wrapping_add(i as u32);
            *b = acc as u8;
        }
        n as i32
    }
}

impl Drop for FakeCodec {
    fn drop(&mut self) {
        LIVE.with(|c| c.set(c.get().saturating_sub(1)));
    }
}
