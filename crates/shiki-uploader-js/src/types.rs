//! Types exposed to JavaScript via wasm-bindgen.

use serde::{Deserialize, Serialize};
use shiki_uploader_core::{ConfigError, Locale, UploaderConfig};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

/// Uploader options as passed by the host page.
///
/// Only `endpoint` is required; everything else falls back to the defaults
/// of `UploaderConfig`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct UploaderOptions {
    pub endpoint: String,
    /// `"en"` or `"ru"`.
    #[tsify(optional)]
    pub locale: Option<String>,
    #[tsify(optional)]
    pub field_name: Option<String>,
    /// Bytes; `null` keeps the 4 MiB default.
    #[tsify(optional)]
    pub max_file_size: Option<u64>,
    #[tsify(optional)]
    pub max_number_of_files: Option<usize>,
    #[tsify(optional)]
    pub min_number_of_files: Option<usize>,
    #[tsify(optional)]
    pub allowed_file_types: Option<Vec<String>>,
    #[tsify(optional)]
    pub leave_debounce_ms: Option<u32>,
}

impl UploaderOptions {
    pub fn into_config(self) -> Result<UploaderConfig, ConfigError> {
        let mut config = UploaderConfig::new(self.endpoint);

        if let Some(locale) = self.locale {
            config.locale = locale
                .parse::<Locale>()
                .map_err(|()| ConfigError::Parse(format!("unknown locale {locale:?}")))?;
        }
        if let Some(field_name) = self.field_name {
            config.field_name = field_name;
        }
        if let Some(max) = self.max_file_size {
            config.restrictions.max_file_size = Some(max);
        }
        if let Some(max) = self.max_number_of_files {
            config.restrictions.max_number_of_files = Some(max);
        }
        if let Some(min) = self.min_number_of_files {
            config.restrictions.min_number_of_files = Some(min);
        }
        if let Some(types) = self.allowed_file_types {
            config.restrictions.allowed_file_types = types.into_iter().map(Into::into).collect();
        }
        if let Some(ms) = self.leave_debounce_ms {
            config.leave_debounce_ms = ms;
        }

        config.validate()?;
        Ok(config)
    }
}
