use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::{PgpError, Result};

/// One ASCII-armored block: its `Name: value` headers and decoded body.
#[derive(Debug, Clone)]
pub struct ArmoredBlock {
    headers: Vec<(String, String)>,
    pub data: Vec<u8>,
}

impl ArmoredBlock {
    /// Case-insensitive header lookup; first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Parse a concatenation of armored blocks.
///
/// Text outside `-----BEGIN`/`-----END` fences is ignored. Header lines run
/// until the first blank line (or the first line without a colon, for dumps
/// that omit the separator). Lines starting with `=` inside the body are the
/// CRC-24 trailer and are skipped.
pub fn parse_armored_stream(text: &str) -> Result<Vec<ArmoredBlock>> {
    enum State {
        Outside,
        Headers,
        Body,
    }

    let mut blocks = Vec::new();
    let mut state = State::Outside;
    let mut headers: Vec<(String, String)> = Vec::new();
    let mut body = String::new();

    for line in text.lines() {
        let line = line.trim_end();
        match state {
            State::Outside => {
                if line.starts_with("-----BEGIN ") && line.ends_with("-----") {
                    headers = Vec::new();
                    body = String::new();
                    state = State::Headers;
                }
            }
            State::Headers => {
                if line.is_empty() {
                    state = State::Body;
                } else if let Some((name, value)) = line.split_once(':') {
                    headers.push((name.trim().to_string(), value.trim().to_string()));
                } else {
                    // No separator line; this is already body data
                    body.push_str(line);
                    state = State::Body;
                }
            }
            State::Body => {
                if line.starts_with("-----END ") && line.ends_with("-----") {
                    let data = BASE64.decode(body.as_bytes())?;
                    blocks.push(ArmoredBlock {
                        headers: std::mem::take(&mut headers),
                        data,
                    });
                    state = State::Outside;
                } else if !line.starts_with('=') && !line.is_empty() {
                    body.push_str(line);
                }
            }
        }
    }

    match state {
        State::Outside => Ok(blocks),
        _ => Err(PgpError::UnterminatedArmor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_block_with_headers() {
        let text = "\
-----BEGIN PGP PUBLIC KEY BLOCK-----
Key-ID: 0123456789ABCDEF
Email: alice@example.com

aGVsbG8=
=AbCd
-----END PGP PUBLIC KEY BLOCK-----
";
        let blocks = parse_armored_stream(text).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].header("Key-ID"), Some("0123456789ABCDEF"));
        assert_eq!(blocks[0].header("key-id"), Some("0123456789ABCDEF"));
        assert_eq!(blocks[0].header("Email"), Some("alice@example.com"));
        assert_eq!(blocks[0].header("User-ID"), None);
        assert_eq!(blocks[0].data, b"hello");
    }

    #[test]
    fn test_multiple_blocks_and_noise() {
        let text = "\
prologue text

-----BEGIN PGP PUBLIC KEY BLOCK-----
Key-ID: AAAA

aGVsbG8=
-----END PGP PUBLIC KEY BLOCK-----
between blocks
-----BEGIN PGP PUBLIC KEY BLOCK-----
Key-ID: BBBB

d29ybGQ=
-----END PGP PUBLIC KEY BLOCK-----
";
        let blocks = parse_armored_stream(text).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].data, b"hello");
        assert_eq!(blocks[1].data, b"world");
        assert_eq!(blocks[1].header("Key-ID"), Some("BBBB"));
    }

    #[test]
    fn test_multiline_body() {
        let text = "\
-----BEGIN PGP PUBLIC KEY BLOCK-----

aGVs
bG8g
d29ybGQ=
-----END PGP PUBLIC KEY BLOCK-----
";
        let blocks = parse_armored_stream(text).unwrap();
        assert_eq!(blocks[0].data, b"hello world");
    }

    #[test]
    fn test_body_without_blank_separator() {
        let text = "\
-----BEGIN PGP PUBLIC KEY BLOCK-----
aGVsbG8=
-----END PGP PUBLIC KEY BLOCK-----
";
        let blocks = parse_armored_stream(text).unwrap();
        assert_eq!(blocks[0].data, b"hello");
    }

    #[test]
    fn test_unterminated_block() {
        let text = "-----BEGIN PGP PUBLIC KEY BLOCK-----\n\naGVsbG8=\n";
        assert!(matches!(
            parse_armored_stream(text),
            Err(PgpError::UnterminatedArmor)
        ));
    }

    #[test]
    fn test_bad_base64() {
        let text = "\
-----BEGIN PGP PUBLIC KEY BLOCK-----

!!!not base64!!!
-----END PGP PUBLIC KEY BLOCK-----
";
        assert!(matches!(
            parse_armored_stream(text),
            Err(PgpError::Base64(_))
        ));
    }

    #[test]
    fn test_empty_input() {
        let blocks = parse_armored_stream("").unwrap();
        assert!(blocks.is_empty());
    }
}
