//! Message translation.

use std::{collections::HashMap, path::Path};

/// Maps English message ids to the active locale.
#[derive(Clone, Debug, Default)]
pub struct Translator {
    lang: String,
    catalog: HashMap<String, String>,
}

impl Translator {
    /// Translator that returns every message unchanged.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Build from the process environment and a catalog directory.
    pub fn from_env(locale_dir: &Path) -> Self {
        let locale = ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|v| std::env::var(v).ok())
            .find(|v| !v.is_empty())
            .unwrap_or_default();
        Self::load(locale_dir, &locale)
    }

    /// Build for an explicit locale such as `de_DE.UTF-8`.
    pub fn load(locale_dir: &Path, locale: &str) -> Self {
        let lang = language_of(locale);
        if lang.is_empty() || lang == "en" || lang == "C" || lang == "POSIX" {
            return Self::identity();
        }
        let path = locale_dir.join(format!("{lang}.toml"));
        let catalog = std::fs::read_to_string(&path)
            .ok()
            .and_then(|s| match toml::from_str::<HashMap<String, String>>(&s) {
                Ok(map) => Some(map),
                Err(e) => {
                    tracing::warn!("bad catalog {}: {e}", path.display());
                    None
                }
            })
            .unwrap_or_default();
        tracing::info!("locale {lang}: {} messages", catalog.len());
        Self {
            lang: lang.to_string(),
            catalog,
        }
    }

    /// Language code in use, empty for untranslated.
    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Translate a message id.
    pub fn t(&self, msgid: &str) -> String {
        self.catalog
            .get(msgid)
            .filter(|s| !s.is_empty())
            .cloned()
            .unwrap_or_else(|| msgid.to_string())
    }
}

/// `de_DE.UTF-8@euro` -> `de`
fn language_of(locale: &str) -> &str {
    locale
        .split(['_', '.', '@', '-'])
        .next()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_code_is_extracted() {
        assert_eq!(language_of("de_DE.UTF-8"), "de");
        assert_eq!(language_of("fr"), "fr");
        assert_eq!(language_of(""), "");
    }

    #[test]
    fn catalog_translates_and_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("de.toml"),
            "\"Main menu\" = \"Hauptmenü\"\n\"Empty\" = \"\"\n",
        )
        .unwrap();
        let tr = Translator::load(dir.path(), "de_DE.UTF-8");
        assert_eq!(tr.lang(), "de");
        assert_eq!(tr.t("Main menu"), "Hauptmenü");
        assert_eq!(tr.t("Empty"), "Empty");
        assert_eq!(tr.t("Unknown"), "Unknown");
    }

    #[test]
    fn english_is_identity() {
        let tr = Translator::load(Path::new("/nonexistent"), "en_US.UTF-8");
        assert_eq!(tr.t("Reboot"), "Reboot");
        assert_eq!(tr.lang(), "");
    }
}
