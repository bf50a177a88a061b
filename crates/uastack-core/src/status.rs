//! OPC-UA status codes raised by this stack.

use core::fmt;

/// A 32-bit OPC-UA status code. The top bit distinguishes bad codes from
/// good ones; the low 16 bits are reserved flag space and always zero here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub u32);

impl StatusCode {
    pub const GOOD: StatusCode = StatusCode(0x0000_0000);
    pub const BAD_INTERNAL_ERROR: StatusCode = StatusCode(0x8002_0000);
    pub const BAD_CONFIGURATION_ERROR: StatusCode = StatusCode(0x8004_0000);
    pub const BAD_COMMUNICATION_ERROR: StatusCode = StatusCode(0x8005_0000);
    pub const BAD_SECURITY_CHECKS_FAILED: StatusCode = StatusCode(0x8013_0000);
    pub const BAD_REQUEST_TOO_LARGE: StatusCode = StatusCode(0x80B8_0000);
    pub const BAD_TCP_ENDPOINT_URL_INVALID: StatusCode = StatusCode(0x8083_0000);

    #[must_use]
    pub const fn is_good(self) -> bool {
        self.0 & 0x8000_0000 == 0
    }

    #[must_use]
    pub const fn is_bad(self) -> bool {
        !self.is_good()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_good_bad_split() {
        assert!(StatusCode::GOOD.is_good());
        assert!(!StatusCode::GOOD.is_bad());
        for bad in [
            StatusCode::BAD_INTERNAL_ERROR,
            StatusCode::BAD_CONFIGURATION_ERROR,
            StatusCode::BAD_COMMUNICATION_ERROR,
            StatusCode::BAD_SECURITY_CHECKS_FAILED,
            StatusCode::BAD_REQUEST_TOO_LARGE,
            StatusCode::BAD_TCP_ENDPOINT_URL_INVALID,
        ] {
            assert!(bad.is_bad(), "{bad} should be bad");
        }
    }

    #[test]
    fn test_display_hex() {
        assert_eq!(
            StatusCode::BAD_TCP_ENDPOINT_URL_INVALID.to_string(),
            "0x80830000"
        );
        assert_eq!(StatusCode::GOOD.to_string(), "0x00000000");
    }
}
