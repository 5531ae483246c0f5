//! FFI bindings to libopus (encoder side).

use std::os::raw::{c_char, c_int, c_uchar};

/// Opaque encoder state.
pub enum OpusEncoder {}

/// opus_int32 type (from opus_types.h)
pub type OpusInt32 = i32;

/// opus_int16 type (from opus_types.h)
pub type OpusInt16 = i16;

// Return codes
pub const OPUS_OK: c_int = 0;

// Application types
pub const OPUS_APPLICATION_VOIP: c_int = 2048;
pub const OPUS_APPLICATION_AUDIO: c_int = 2049;
pub const OPUS_APPLICATION_RESTRICTED_LOWDELAY: c_int = 2051;

unsafe extern "C" {
    pub fn opus_get_version_string() -> *const c_char;

    pub fn opus_encoder_create(
        fs: OpusInt32,
        channels: c_int,
        application: c_int,
        error: *mut c_int,
    ) -> *mut OpusEncoder;

    pub fn opus_encoder_destroy(enc: *mut OpusEncoder);

    pub fn opus_encode(
        enc: *mut OpusEncoder,
        pcm: *const OpusInt16,
        frame_size: c_int,
        data: *mut c_uchar,
        max_data_bytes: OpusInt32,
    ) -> OpusInt32;

    pub fn opus_encoder_ctl(enc: *mut OpusEncoder, request: c_int, ...) -> c_int;
}

/// Returns the linked libopus version string.
pub fn version_string() -> String {
    unsafe {
        let c_str = opus_get_version_string();
        if c_str.is_null() {
            return String::new();
        }
        std::ffi::CStr::from_ptr(c_str)
            .to_string_lossy()
            .into_owned()
    }
}
