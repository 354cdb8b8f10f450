//! Small validation helpers.

/// True if `value` is a non-empty, even-length string of hex digits.
///
/// An optional `0x` prefix is not accepted; keys and signatures travel as
/// bare hex on the wire.
pub fn is_hex(value: &str) -> bool {
    !value.is_empty() && hex::decode(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_hex() {
        assert!(is_hex("deadBEEF"));
        assert!(is_hex("00"));
        assert!(!is_hex(""));
        assert!(!is_hex("abc"));
        assert!(!is_hex("0xab"));
        assert!(!is_hex("zz"));
    }
}
