//! Error types for the upload coordinator.
//!
//! Nothing here is meant to escape as an uncaught fault: restriction and
//! transport errors are turned into user-visible messages, platform errors are
//! logged and absorbed.

use miette::Diagnostic;
use smol_str::SmolStr;

use crate::i18n::{I18nKey, Translator};

/// Main error type for uploader operations.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum UploaderError {
    #[error(transparent)]
    #[diagnostic_source]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic_source]
    Restriction(#[from] RestrictionError),

    #[error(transparent)]
    #[diagnostic_source]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// A file was rejected before it was ever queued.
#[derive(thiserror::Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RestrictionError {
    #[error("{name} exceeds maximum allowed size of {max_size} bytes")]
    #[diagnostic(code(shiki::restriction::size))]
    TooLarge {
        name: SmolStr,
        size: u64,
        max_size: u64,
    },

    #[error("{name} has type {mime_type:?}, allowed: {allowed}")]
    #[diagnostic(code(shiki::restriction::file_type))]
    DisallowedType {
        name: SmolStr,
        mime_type: SmolStr,
        allowed: String,
    },

    #[error("only {max} files can be uploaded at once")]
    #[diagnostic(code(shiki::restriction::too_many))]
    TooManyFiles { max: usize },

    #[error("at least {min} files have to be selected")]
    #[diagnostic(code(shiki::restriction::too_few))]
    TooFewFiles { min: usize },

    #[error("{name} is already being uploaded")]
    #[diagnostic(code(shiki::restriction::duplicate))]
    Duplicate { name: SmolStr },
}

impl RestrictionError {
    /// Render the violation as a localized, user-facing message.
    pub fn localized(&self, translator: &dyn Translator) -> String {
        match self {
            RestrictionError::TooLarge { max_size, .. } => translator.translate(
                I18nKey::EXCEEDS_SIZE,
                &[("size", format_size(*max_size))],
            ),
            RestrictionError::DisallowedType { allowed, .. } => {
                translator.translate(I18nKey::ONLY_FILE_TYPES, &[("types", allowed.clone())])
            }
            RestrictionError::TooManyFiles { max } => {
                translator.translate(I18nKey::ONLY_X_FILES, &[("count", max.to_string())])
            }
            RestrictionError::TooFewFiles { min } => {
                translator.translate(I18nKey::AT_LEAST_X_FILES, &[("count", min.to_string())])
            }
            RestrictionError::Duplicate { name } => {
                translator.translate(I18nKey::DUPLICATE_FILE, &[("file", name.to_string())])
            }
        }
    }
}

/// Human-readable byte size, in the largest unit that keeps the value >= 1.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if value.fract() == 0.0 {
        format!("{} {}", value as u64, UNITS[unit])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// A started upload failed.
#[derive(thiserror::Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request finished with an error status and no usable message.
    #[error("Upload error")]
    #[diagnostic(code(shiki::transport::generic))]
    Generic,

    /// The server explained why it rejected the file.
    #[error("{0}")]
    #[diagnostic(code(shiki::transport::rejected))]
    Rejected(String),

    /// The request never reached the server.
    #[error("network error: {0}")]
    #[diagnostic(code(shiki::transport::network))]
    Network(String),
}

impl TransportError {
    /// Whether the user should see the generic "failed to upload" message
    /// instead of the error's own text.
    pub fn is_generic(&self) -> bool {
        !matches!(self, TransportError::Rejected(_))
    }
}

/// Invalid uploader configuration.
#[derive(thiserror::Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("upload endpoint is empty")]
    #[diagnostic(
        code(shiki::config::endpoint),
        help("pass the URL the files should be POSTed to")
    )]
    MissingEndpoint,

    #[error("upload field name is empty")]
    #[diagnostic(code(shiki::config::field_name))]
    MissingFieldName,

    #[error("minNumberOfFiles ({min}) is greater than maxNumberOfFiles ({max})")]
    #[diagnostic(code(shiki::config::file_counts))]
    InconsistentFileCounts { min: usize, max: usize },

    #[error("invalid uploader options: {0}")]
    #[diagnostic(code(shiki::config::parse))]
    Parse(String),
}

/// Error type for platform operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError(pub String);

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{Locale, StaticTranslator};

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2 KB");
        assert_eq!(format_size(4 * 1024 * 1024), "4 MB");
        assert_eq!(format_size(1536), "1.5 KB");
    }

    #[test]
    fn test_restriction_localized() {
        let en = StaticTranslator::new(Locale::En);
        let err = RestrictionError::TooLarge {
            name: "big.png".into(),
            size: 10 * 1024 * 1024,
            max_size: 4 * 1024 * 1024,
        };
        assert_eq!(
            err.localized(&en),
            "This file exceeds maximum allowed size of 4 MB"
        );

        let err = RestrictionError::TooManyFiles { max: 150 };
        assert_eq!(err.localized(&en), "You can only upload 150 files");
    }

    #[test]
    fn test_transport_error_generic() {
        assert!(TransportError::Generic.is_generic());
        assert!(TransportError::Network("offline".into()).is_generic());
        assert!(!TransportError::Rejected("too blurry".into()).is_generic());
        assert_eq!(TransportError::Generic.to_string(), "Upload error");
    }
}
