//! Decoding of external style sheets.
//!
//! Embedded sheets arrive as text. External sheets arrive as bytes and may
//! start with `@charset "name";`, which selects the decoder.

use crate::context::CssContext;
use crate::diagnostics::{CssError, Diagnostic, ErrorCode};

/// Character sets the engine can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// UTF-8, the default. Invalid sequences are replaced.
    Utf8,
    /// 7-bit ASCII. Bytes above 0x7f are replaced.
    UsAscii,
    /// ISO-8859-1, one byte per code point.
    Latin1,
}

impl Charset {
    /// Look a charset up by its IANA name or a common alias.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Self::Utf8),
            "us-ascii" | "ascii" => Some(Self::UsAscii),
            "iso-8859-1" | "iso8859-1" | "latin1" | "l1" => Some(Self::Latin1),
            _ => None,
        }
    }

    /// Decode `bytes`.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::UsAscii => bytes
                .iter()
                .map(|&b| if b.is_ascii() { char::from(b) } else { char::REPLACEMENT_CHARACTER })
                .collect(),
            Self::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
        }
    }
}

/// The name declared by a leading `@charset "name";`, if any.
#[must_use]
pub fn declared_charset(bytes: &[u8]) -> Option<&str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let rest = bytes.strip_prefix(b"@charset")?;
    let end = rest.iter().position(|&b| b == b';')?;
    let label = std::str::from_utf8(&rest[..end]).ok()?.trim();
    Some(crate::values::omit_quotes(label))
}

/// Decode an external sheet, honouring its `@charset`.
///
/// An unknown charset is reported and the sheet decoded as UTF-8.
pub fn decode_stylesheet(ctx: &mut CssContext, bytes: &[u8]) -> Result<String, CssError> {
    let charset = match declared_charset(bytes) {
        None => Charset::Utf8,
        Some(label) => match Charset::from_label(label) {
            Some(charset) => charset,
            None => {
                ctx.report(
                    &Diagnostic::new(
                        ErrorCode::EncodingUnsupported,
                        "@charset",
                        format!("External CSS encoding @charset {label} directive failed"),
                    )
                    .with_value(label),
                )?;
                Charset::Utf8
            }
        },
    };
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    Ok(charset.decode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_charset() {
        assert_eq!(declared_charset(b"@charset \"ISO-8859-1\"; p{}"), Some("ISO-8859-1"));
        assert_eq!(declared_charset(b"p { color: red }"), None);
    }

    #[test]
    fn test_latin1_decoding() {
        let mut ctx = CssContext::new();
        let text = decode_stylesheet(&mut ctx, b"@charset 'latin1'; p:before{content:\"\xE9\"}").unwrap();
        assert!(text.contains('\u{e9}'));
    }

    #[test]
    fn test_unknown_charset_is_reported() {
        let mut ctx = CssContext::new();
        let seen = std::rc::Rc::new(std::cell::Cell::new(false));
        let flag = std::rc::Rc::clone(&seen);
        ctx.set_handler(move |d| {
            flag.set(d.code == ErrorCode::EncodingUnsupported);
            true
        });
        let text = decode_stylesheet(&mut ctx, b"@charset \"koi8-r\"; p{}").unwrap();
        assert!(seen.get());
        assert!(text.ends_with("p{}"));
    }
}
