//! Uploader configuration.
//!
//! Every field has a default so hosts only pass what they care about,
//! usually just the endpoint.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::ConfigError;
use crate::i18n::Locale;

/// Settings for one uploader instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploaderConfig {
    /// URL the files are POSTed to.
    pub endpoint: String,
    /// Multipart form field carrying the file.
    pub field_name: String,
    pub locale: Locale,
    pub restrictions: Restrictions,
    /// Delay before a document `dragleave` hides the overlay.
    pub leave_debounce_ms: u32,
    /// Overlay fade-out duration; the element is removed once it elapses.
    pub fade_ms: u32,
    /// Opacity the overlay fades in to.
    pub overlay_opacity: f64,
    /// Lower bound for the overlay's line height, in pixels.
    pub overlay_min_line_height: f64,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            field_name: "image".to_owned(),
            locale: Locale::default(),
            restrictions: Restrictions::default(),
            leave_debounce_ms: 200,
            fade_ms: 350,
            overlay_opacity: 0.75,
            overlay_min_line_height: 75.0,
        }
    }
}

impl UploaderConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        if self.field_name.trim().is_empty() {
            return Err(ConfigError::MissingFieldName);
        }
        if let (Some(min), Some(max)) = (
            self.restrictions.min_number_of_files,
            self.restrictions.max_number_of_files,
        ) {
            if min > max {
                return Err(ConfigError::InconsistentFileCounts { min, max });
            }
        }
        Ok(())
    }
}

/// What files the transport accepts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Restrictions {
    /// Largest accepted file, in bytes.
    pub max_file_size: Option<u64>,
    /// Most files that may be pending at once.
    pub max_number_of_files: Option<usize>,
    /// Fewest files an upload run may start with.
    pub min_number_of_files: Option<usize>,
    /// Accepted MIME types. `image/*` style wildcards are allowed.
    /// Empty accepts everything.
    pub allowed_file_types: Vec<SmolStr>,
}

impl Default for Restrictions {
    fn default() -> Self {
        Self {
            max_file_size: Some(4 * 1024 * 1024),
            max_number_of_files: Some(150),
            min_number_of_files: None,
            allowed_file_types: vec!["image/jpg".into(), "image/jpeg".into(), "image/png".into()],
        }
    }
}

impl Restrictions {
    /// No limits at all.
    pub fn none() -> Self {
        Self {
            max_file_size: None,
            max_number_of_files: None,
            min_number_of_files: None,
            allowed_file_types: Vec::new(),
        }
    }
}
