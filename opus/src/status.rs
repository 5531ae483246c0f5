//! Codec status codes.

use std::fmt;

/// Signed status code returned by the codec's control and encode calls.
///
/// Zero is success; negative values come from the fixed set libopus defines
/// in `opus_defines.h`. Unknown codes are carried through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(pub i32);

impl Status {
    pub const OK: Status = Status(0);
    pub const BAD_ARG: Status = Status(-1);
    pub const BUFFER_TOO_SMALL: Status = Status(-2);
    pub const INTERNAL_ERROR: Status = Status(-3);
    pub const INVALID_PACKET: Status = Status(-4);
    pub const UNIMPLEMENTED: Status = Status(-5);
    pub const INVALID_STATE: Status = Status(-6);
    pub const ALLOC_FAIL: Status = Status(-7);

    /// Returns the raw code.
    pub fn code(self) -> i32 {
        self.0
    }

    /// Returns true for the success code.
    pub fn is_ok(self) -> bool {
        self.0 == 0
    }

    /// Converts a raw return code into `Ok(())` or the failing status.
    pub fn check(code: i32) -> Result<(), Status> {
        if code == 0 { Ok(()) } else { Err(Status(code)) }
    }

    /// Returns the message libopus' `opus_strerror` gives for this code.
    pub fn message(self) -> &'static str {
        match self.0 {
            0 => "success",
            -1 => "invalid argument",
            -2 => "buffer too small",
            -3 => "internal error",
            -4 => "corrupted stream",
            -5 => "request not implemented",
            -6 => "invalid state",
            -7 => "memory allocation failed",
            _ => "unknown error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.0)
    }
}

impl From<Status> for i32 {
    fn from(s: Status) -> i32 {
        s.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check() {
        assert_eq!(Status::check(0), Ok(()));
        assert_eq!(Status::check(-5), Err(Status::UNIMPLEMENTED));
        assert_eq!(Status::check(-42), Err(Status(-42)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Status::BAD_ARG.to_string(), "invalid argument (-1)");
        assert_eq!(Status(-99).to_string(), "unknown error (-99)");
        assert!(Status::OK.is_ok());
        assert!(!Status::ALLOC_FAIL.is_ok());
        assert_eq!(i32::from(Status::INVALID_STATE), -6);
    }
}
