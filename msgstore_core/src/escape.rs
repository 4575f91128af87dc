//! Query-component escaping for identifiers.
//!
//! Identifiers are arbitrary strings, so they are escaped before being used
//! as file names. ASCII alphanumerics and `-_.~` pass through, a space
//! becomes `+`, and every other byte becomes `%XX` (uppercase hex). The
//! result never contains `/`, so an escaped identifier is always a single
//! directory entry.

use crate::error::{Error, Result};

/// Whether a byte passes through unescaped.
fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~')
}

/// Escape a string for use as a file name component.
pub fn query_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        if is_unreserved(b) {
            out.push(b as char);
        } else if b == b' ' {
            out.push('+');
        } else {
            out.push('%');
            out.push_str(&hex::encode_upper([b]));
        }
    }
    out
}

/// Reverse [`query_escape`].
///
/// Accepts either hex case and decodes `+` as a space. Fails on a `%` not
/// followed by two hex digits, or if the decoded bytes are not UTF-8.
///
/// Several inputs can decode to the same string (`%2f` and `%2F`, `+` and
/// `%20`); only the output of [`query_escape`] is canonical.
pub fn query_unescape(s: &str) -> Result<String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let digits = bytes
                    .get(i + 1..i + 3)
                    .ok_or_else(|| Error::invalid_escape(s, "truncated escape sequence"))?;
                let mut byte = [0u8; 1];
                hex::decode_to_slice(digits, &mut byte).map_err(|_| {
                    Error::invalid_escape(
                        s,
                        format!("bad escape %{}", String::from_utf8_lossy(digits)),
                    )
                })?;
                out.push(byte[0]);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8(out).map_err(|_| Error::invalid_escape(s, "decoded bytes are not UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_passthrough() {
        assert_eq!(query_escape("abcXYZ019-_.~"), "abcXYZ019-_.~");
        assert_eq!(query_escape(""), "");
    }

    #[test]
    fn test_escape_reserved() {
        assert_eq!(query_escape("a/b"), "a%2Fb");
        assert_eq!(query_escape("a b"), "a+b");
        assert_eq!(query_escape(" "), "+");
        assert_eq!(query_escape("100%"), "100%25");
        assert_eq!(query_escape("a+b"), "a%2Bb");
        assert_eq!(query_escape("user@example.com"), "user%40example.com");
        assert_eq!(query_escape(".."), "..");
    }

    #[test]
    fn test_escape_non_ascii() {
        assert_eq!(query_escape("ñ"), "%C3%B1");
        assert_eq!(query_escape("日"), "%E6%97%A5");
    }

    #[test]
    fn test_unescape_basic() {
        assert_eq!(query_unescape("a%2Fb").unwrap(), "a/b");
        assert_eq!(query_unescape("a%2fb").unwrap(), "a/b");
        assert_eq!(query_unescape("a+b").unwrap(), "a b");
        assert_eq!(query_unescape("a%20b").unwrap(), "a b");
        assert_eq!(query_unescape("%C3%B1").unwrap(), "ñ");
        assert_eq!(query_unescape("plain").unwrap(), "plain");
    }

    #[test]
    fn test_unescape_truncated() {
        assert!(query_unescape("%").is_err());
        assert!(query_unescape("abc%4").is_err());
    }

    #[test]
    fn test_unescape_bad_hex() {
        let err = query_unescape("%zz").unwrap_err();
        assert!(matches!(err, Error::InvalidEscape { .. }));
        assert!(query_unescape("%4g").is_err());
    }

    #[test]
    fn test_unescape_invalid_utf8() {
        assert!(query_unescape("%FF%FE").is_err());
    }

    #[test]
    fn test_escaped_never_contains_separator() {
        for s in ["/", "\\", "a/../b", "s:x", "\0"] {
            let escaped = query_escape(s);
            assert!(!escaped.contains('/'));
            assert!(!escaped.contains('\\'));
            assert!(!escaped.contains('\0'));
        }
    }

    // Property-based tests
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Any string survives an escape/unescape round trip
        #[test]
        fn prop_escape_roundtrip(s in any::<String>()) {
            let escaped = query_escape(&s);
            prop_assert_eq!(query_unescape(&escaped)?, s);
        }

        /// Escaped output only uses the unreserved set plus '%' and '+'
        #[test]
        fn prop_escape_alphabet(s in any::<String>()) {
            let escaped = query_escape(&s);
            prop_assert!(
                escaped.bytes().all(|b| is_unreserved(b) || b == b'%' || b == b'+'),
                "unexpected byte in {:?}",
                escaped
            );
        }
    }
}
