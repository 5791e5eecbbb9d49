//! Localized string lookup.
//!
//! The uploader never reads a process-wide string table. Every component that
//! needs text receives a `Translator`, so hosts can plug in their own lookup.
//! `StaticTranslator` ships the built-in English and Russian tables.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Localized string lookup capability.
pub trait Translator {
    /// Look up `key` and interpolate `%{name}` placeholders from `params`.
    ///
    /// Unknown keys come back as the key itself.
    fn translate(&self, key: &str, params: &[(&str, String)]) -> String;
}

impl<F> Translator for F
where
    F: Fn(&str, &[(&str, String)]) -> String,
{
    fn translate(&self, key: &str, params: &[(&str, String)]) -> String {
        self(key, params)
    }
}

/// Keys of the strings the uploader renders.
pub struct I18nKey;

impl I18nKey {
    pub const DROP_PICTURES_HERE: &'static str = "frontend.lib.file_uploader.drop_pictures_here";
    pub const UPLOADING_FILE: &'static str = "frontend.lib.file_uploader.uploading_file";
    pub const UPLOADING_FILES: &'static str = "frontend.lib.file_uploader.uploading_files";
    pub const FAILED_TO_UPLOAD: &'static str = "failedToUpload";
    pub const EXCEEDS_SIZE: &'static str = "exceedsSize";
    pub const ONLY_FILE_TYPES: &'static str = "youCanOnlyUploadFileTypes";
    pub const ONLY_X_FILES: &'static str = "youCanOnlyUploadX";
    pub const AT_LEAST_X_FILES: &'static str = "youHaveToAtLeastSelectX";
    pub const DUPLICATE_FILE: &'static str = "noDuplicates";
}

/// Built-in locales.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl FromStr for Locale {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Locale::En),
            "ru" => Ok(Locale::Ru),
            _ => Err(()),
        }
    }
}

/// Translator backed by the built-in string tables.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticTranslator {
    locale: Locale,
}

impl StaticTranslator {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    fn template(&self, key: &str) -> Option<&'static str> {
        match self.locale {
            Locale::En => english(key),
            Locale::Ru => russian(key).or_else(|| english(key)),
        }
    }
}

impl Translator for StaticTranslator {
    fn translate(&self, key: &str, params: &[(&str, String)]) -> String {
        match self.template(key) {
            Some(template) => interpolate(template, params),
            None => {
                tracing::debug!(key, "missing translation");
                key.to_string()
            }
        }
    }
}

fn english(key: &str) -> Option<&'static str> {
    Some(match key {
        I18nKey::DROP_PICTURES_HERE => "Drop pictures here",
        I18nKey::UPLOADING_FILE => "Uploading %{filename}, %{filesize} KB",
        I18nKey::UPLOADING_FILES => {
            "Uploading %{uploadedCount}/%{totalCount} files, %{kbUploaded}/%{kbTotal} KB"
        }
        I18nKey::FAILED_TO_UPLOAD => "Failed to upload %{file}",
        I18nKey::EXCEEDS_SIZE => "This file exceeds maximum allowed size of %{size}",
        I18nKey::ONLY_FILE_TYPES => "You can only upload: %{types}",
        I18nKey::ONLY_X_FILES => "You can only upload %{count} files",
        I18nKey::AT_LEAST_X_FILES => "You have to select at least %{count} files",
        I18nKey::DUPLICATE_FILE => "Cannot add the duplicate file '%{file}', it already exists",
        _ => return None,
    })
}

fn russian(key: &str) -> Option<&'static str> {
    Some(match key {
        I18nKey::DROP_PICTURES_HERE => "Перетащите сюда картинки",
        I18nKey::UPLOADING_FILE => "Загрузка %{filename}, %{filesize} КБ",
        I18nKey::UPLOADING_FILES => {
            "Загрузка %{uploadedCount}/%{totalCount} файлов, %{kbUploaded}/%{kbTotal} КБ"
        }
        I18nKey::FAILED_TO_UPLOAD => "Не удалось загрузить %{file}",
        I18nKey::EXCEEDS_SIZE => "Размер файла превышает максимально допустимый %{size}",
        I18nKey::ONLY_FILE_TYPES => "Можно загружать только: %{types}",
        I18nKey::ONLY_X_FILES => "Можно загрузить не более %{count} файлов",
        I18nKey::AT_LEAST_X_FILES => "Нужно выбрать хотя бы %{count} файлов",
        I18nKey::DUPLICATE_FILE => "Файл '%{file}' уже добавлен",
        _ => return None,
    })
}

/// Replace `%{name}` placeholders. Placeholders without a param stay as-is.
pub fn interpolate(template: &str, params: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("%{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        match params.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate() {
        assert_eq!(
            interpolate("Uploading %{filename}, %{filesize} KB", &[
                ("filename", "a.png".into()),
                ("filesize", "2".into()),
            ]),
            "Uploading a.png, 2 KB"
        );
    }

    #[test]
    fn test_interpolate_missing_param_kept() {
        assert_eq!(interpolate("x %{y} z", &[]), "x %{y} z");
        assert_eq!(interpolate("broken %{", &[]), "broken %{");
    }

    #[test]
    fn test_russian_falls_back_to_key() {
        let ru = StaticTranslator::new(Locale::Ru);
        assert_eq!(ru.translate("unknown.key", &[]), "unknown.key");
        assert_eq!(
            ru.translate(I18nKey::FAILED_TO_UPLOAD, &[("file", "a.png".into())]),
            "Не удалось загрузить a.png"
        );
    }

    #[test]
    fn test_closure_translator() {
        let upper = |key: &str, _: &[(&str, String)]| key.to_uppercase();
        assert_eq!(upper.translate("abc", &[]), "ABC");
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!("ru".parse::<Locale>(), Ok(Locale::Ru));
        assert!("de".parse::<Locale>().is_err());
    }
}
