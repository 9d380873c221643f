//! # Localization
//!
//! User-facing validation messages are looked up by key so the embedding
//! application can swap in its own translation service. The default
//! [`StaticTranslator`] ships English and Spanish tables.

use std::collections::HashMap;

use crate::constants::{DEFAULT_LANGUAGE, KEY_BAD_FILE_EXT, KEY_FILE_EXT_ADMITTED, KEY_MAX_FILE_SIZE};

/// Resolves a localization key to a display string.
pub trait Translator {
    /// Returns the translation for `key`, or the key itself when unknown.
    fn translate(&self, key: &str) -> String;
}

/// Translator backed by built-in string tables.
#[derive(Clone, Debug)]
pub struct StaticTranslator {
    language: String,
    tables: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl Default for StaticTranslator {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl StaticTranslator {
    /// Creates a translator preferring `language`. Unknown languages fall
    /// back to English.
    pub fn new(language: &str) -> Self {
        let mut tables = HashMap::new();
        tables.insert(
            "en",
            HashMap::from([
                (KEY_BAD_FILE_EXT, "Error: file type not supported"),
                (KEY_FILE_EXT_ADMITTED, "Allowed extensions"),
                (KEY_MAX_FILE_SIZE, "Error: maximum file size exceeded"),
            ]),
        );
        tables.insert(
            "es",
            HashMap::from([
                (KEY_BAD_FILE_EXT, "Error: tipo de archivo no admitido"),
                (KEY_FILE_EXT_ADMITTED, "Extensiones permitidas"),
                (KEY_MAX_FILE_SIZE, "Error: tamaño máximo de archivo superado"),
            ]),
        );

        let language = if tables.contains_key(language) {
            language.to_string()
        } else {
            DEFAULT_LANGUAGE.to_string()
        };

        Self { language, tables }
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl Translator for StaticTranslator {
    fn translate(&self, key: &str) -> String {
        self.tables
            .get(self.language.as_str())
            .and_then(|table| table.get(key))
            .map(|value| value.to_string())
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_is_the_default() {
        let translator = StaticTranslator::default();
        assert_eq!(translator.language(), "en");
        assert_eq!(translator.translate(KEY_BAD_FILE_EXT), "Error: file type not supported");
    }

    #[test]
    fn spanish_table_is_available() {
        let translator = StaticTranslator::new("es");
        assert_eq!(translator.translate(KEY_FILE_EXT_ADMITTED), "Extensiones permitidas");
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        assert_eq!(StaticTranslator::new("fr").language(), "en");
    }

    #[test]
    fn unknown_key_resolves_to_itself() {
        assert_eq!(StaticTranslator::default().translate("NOPE"), "NOPE");
    }
}
