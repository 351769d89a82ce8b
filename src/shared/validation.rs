use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for public access codes (hash ids)
    /// Lowercase hex, as produced by the access code generator
    /// - Valid: "9f86d081884c7d65", "a1b2c3d4e5f60718293a4b5c"
    /// - Invalid: "9F86D0", "abc-123", "zz11"
    pub static ref ACCESS_CODE_REGEX: Regex = Regex::new(r"^[0-9a-f]{8,64}$").unwrap();

    /// Regex for client device ids (android ids and similar installation ids)
    /// Alphanumeric plus `-`, `_`, `.`, `:`
    /// - Valid: "3f2a9c1b7e5d4a60", "device_01", "a1:b2:c3"
    /// - Invalid: "", "dev ice", "id/with/slash"
    pub static ref DEVICE_ID_REGEX: Regex = Regex::new(r"^[A-Za-z0-9._:\-]{1,100}$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_code_regex_valid() {
        assert!(ACCESS_CODE_REGEX.is_match("9f86d081884c7d65"));
        assert!(ACCESS_CODE_REGEX.is_match("a1b2c3d4e5f60718293a4b5c"));
    }

    #[test]
    fn test_access_code_regex_invalid() {
        assert!(!ACCESS_CODE_REGEX.is_match("9F86D081")); // uppercase
        assert!(!ACCESS_CODE_REGEX.is_match("abc-1234")); // hyphen
        assert!(!ACCESS_CODE_REGEX.is_match("abc123")); // too short
        assert!(!ACCESS_CODE_REGEX.is_match(""));
    }

    #[test]
    fn test_device_id_regex() {
        assert!(DEVICE_ID_REGEX.is_match("3f2a9c1b7e5d4a60"));
        assert!(DEVICE_ID_REGEX.is_match("device_01"));
        assert!(DEVICE_ID_REGEX.is_match("a1:b2:c3"));
        assert!(!DEVICE_ID_REGEX.is_match(""));
        assert!(!DEVICE_ID_REGEX.is_match("dev ice"));
        assert!(!DEVICE_ID_REGEX.is_match("id/with/slash"));
    }
}
