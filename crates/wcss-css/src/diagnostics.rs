//! Diagnostics reported while parsing stylesheets, applying them and
//! fetching their resources.
//!
//! Every problem is first offered to the caller's handler (see
//! [`crate::CssContext::set_handler`]). A handler returning `false` turns the
//! diagnostic into a hard [`CssError::Aborted`]; without a handler the message
//! is printed once through [`warn_once`] and processing continues with the
//! documented fallback.

use serde::Serialize;
use strum_macros::{Display, IntoStaticStr};
use thiserror::Error;
use wcss_common::warning::warn_once;

/// The kind of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize)]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorCode {
    /// A property name the active profile does not know.
    AttributeNotSupported,
    /// A known property whose value fails its grammar.
    AttributeValueInvalid,
    /// A relative URL with no base to resolve it against.
    NoBaseUrl,
    /// A declared charset that cannot be decoded.
    EncodingUnsupported,
    /// Attribute selector syntax error. The selector never matches.
    MalformedSelector,
    /// A fetch that failed.
    ResourceNotFound,
    /// A fetch that succeeded with unusable content.
    ResourceBadFormat,
}

impl ErrorCode {
    /// The component name used when the diagnostic falls back to a warning.
    #[must_use]
    pub const fn component(self) -> &'static str {
        match self {
            Self::ResourceNotFound | Self::ResourceBadFormat => "Fetch",
            _ => "CSS",
        }
    }
}

/// One reported problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// What went wrong.
    pub code: ErrorCode,
    /// The selector, tag or at-rule the problem appeared in.
    pub subject: String,
    /// The property or attribute name, if any.
    pub attribute: Option<String>,
    /// The offending raw value, if any.
    pub value: Option<String>,
    /// Human readable description.
    pub message: String,
}

impl Diagnostic {
    /// A diagnostic with no attribute or value.
    #[must_use]
    pub fn new(code: ErrorCode, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            subject: subject.into(),
            attribute: None,
            value: None,
            message: message.into(),
        }
    }

    /// Attach the attribute name.
    #[must_use]
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Attach the raw value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Caller supplied diagnostics callback. Returning `false` aborts.
pub type DiagnosticHandler = Box<dyn FnMut(&Diagnostic) -> bool>;

/// Errors surfaced by the engine.
#[derive(Debug, Error)]
pub enum CssError {
    /// The diagnostics handler asked to stop.
    #[error("{code}: {message}")]
    Aborted {
        /// The code of the diagnostic that stopped processing.
        code: ErrorCode,
        /// Its message.
        message: String,
    },
    /// A synchronous fetch failed.
    #[error("fetch failed: {0}")]
    Fetch(String),
    /// Reading a local stylesheet failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Offer `diagnostic` to `handler`, falling back to a one-time warning.
pub(crate) fn dispatch(
    handler: Option<&mut DiagnosticHandler>,
    diagnostic: &Diagnostic,
) -> Result<(), CssError> {
    match handler {
        Some(handler) => {
            if handler(diagnostic) {
                Ok(())
            } else {
                Err(CssError::Aborted {
                    code: diagnostic.code,
                    message: diagnostic.message.clone(),
                })
            }
        }
        None => {
            let _ = warn_once(diagnostic.code.component(), &diagnostic.message);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_false_aborts() {
        let mut handler: DiagnosticHandler = Box::new(|_| false);
        let diagnostic = Diagnostic::new(ErrorCode::NoBaseUrl, "@import", "no base");
        let err = dispatch(Some(&mut handler), &diagnostic).unwrap_err();
        assert!(matches!(
            err,
            CssError::Aborted {
                code: ErrorCode::NoBaseUrl,
                ..
            }
        ));
    }

    #[test]
    fn test_codes_display_kebab_case() {
        assert_eq!(ErrorCode::AttributeValueInvalid.to_string(), "attribute-value-invalid");
        assert_eq!(ErrorCode::ResourceNotFound.component(), "Fetch");
    }
}
