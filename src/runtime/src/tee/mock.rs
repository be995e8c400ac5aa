//! Mock mode for local development.
//!
//! When `MOCK_MODE=1` (or `true`) is set, the transport layer may bypass
//! hardware-backed evidence entirely. The binding core itself never checks
//! this flag; callers decide what to skip.

/// Environment variable enabling mock mode.
pub const MOCK_MODE_ENV: &str = "MOCK_MODE";

/// Check if mock mode is enabled via environment variable.
pub fn is_mock_mode() -> bool {
    std::env::var(MOCK_MODE_ENV)
        .map(|v| parse_mock_flag(&v))
        .unwrap_or(false)
}

/// `"1"` and `"true"` (any case) enable mock mode; everything else disables it.
pub fn parse_mock_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_mock_flag() {
        assert!(parse_mock_flag("1"));
        assert!(parse_mock_flag("true"));
        assert!(parse_mock_flag("TRUE"));
        assert!(parse_mock_flag("True"));
        assert!(!parse_mock_flag("0"));
        assert!(!parse_mock_flag("false"));
        assert!(!parse_mock_flag("yes"));
        assert!(!parse_mock_flag(""));
    }

    #[test]
    #[serial]
    fn test_is_mock_mode_env() {
        std::env::set_var(MOCK_MODE_ENV, "true");
        assert!(is_mock_mode());
        std::env::set_var(MOCK_MODE_ENV, "0");
        assert!(!is_mock_mode());
        std::env::remove_var(MOCK_MODE_ENV);
        assert!(!is_mock_mode());
    }
}
