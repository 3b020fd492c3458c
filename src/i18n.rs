use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock};

use regex::{Captures, Regex};

mod generated {
    include!(concat!(env!("OUT_DIR"), "/expensesync_i18n_generated.rs"));
}

static CATALOG: LazyLock<Arc<I18nCatalog>> = LazyLock::new(|| Arc::new(I18nCatalog::load()));

#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub enum Locale {
    #[default]
    System,
    Tag(String),
}

impl From<String> for Locale {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("system") {
            return Self::System;
        }
        Self::Tag(value.trim().to_string())
    }
}

impl From<&str> for Locale {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

/// Resolves message keys from the compiled-in `locales/*.toml` catalogs.
///
/// Clones share the selected locale.
#[derive(Clone)]
pub struct I18nManager {
    catalog: Arc<I18nCatalog>,
    locale: Arc<RwLock<Locale>>,
}

impl std::fmt::Debug for I18nManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I18nManager")
            .field("locale", &self.locale())
            .field("resolved", &self.resolved_locale())
            .finish()
    }
}

impl Default for I18nManager {
    fn default() -> Self {
        Self::new()
    }
}

impl I18nManager {
    pub fn new() -> Self {
        Self {
            catalog: CATALOG.clone(),
            locale: Arc::new(RwLock::new(Locale::System)),
        }
    }

    pub fn with_locale(locale: impl Into<Locale>) -> Self {
        let manager = Self::new();
        manager.set_locale(locale);
        manager
    }

    pub fn locale(&self) -> Locale {
        match self.locale.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set_locale(&self, locale: impl Into<Locale>) {
        let mut guard = match self.locale.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = locale.into();
    }

    pub fn default_locale(&self) -> &'static str {
        self.catalog.default_locale
    }

    pub fn resolved_locale(&self) -> &'static str {
        self.catalog
            .resolve_locale(self.requested_locale().as_deref())
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    pub fn t(&self, key: &str) -> String {
        self.lookup(key).unwrap_or(key).to_string()
    }

    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        let raw = self.lookup(key).unwrap_or(key);
        if params.is_empty() {
            return raw.to_string();
        }
        format_template(raw, params)
    }

    fn requested_locale(&self) -> Option<String> {
        match self.locale() {
            Locale::System => system_locale(),
            Locale::Tag(tag) => Some(tag),
        }
    }

    fn lookup(&self, key: &str) -> Option<&'static str> {
        let resolved = self.resolved_locale();
        self.catalog
            .lookup(resolved, key)
            .or_else(|| self.catalog.lookup(self.catalog.default_locale, key))
    }
}

#[cfg(feature = "i18n")]
fn system_locale() -> Option<String> {
    sys_locale::get_locale()
}

#[cfg(not(feature = "i18n"))]
fn system_locale() -> Option<String> {
    None
}

struct I18nCatalog {
    default_locale: &'static str,
    locales: HashMap<&'static str, HashMap<&'static str, &'static str>>,
    /// Normalized tag or bare language to catalog locale. Languages shared by
    /// several catalogs are left out.
    aliases: HashMap<String, &'static str>,
}

impl I18nCatalog {
    fn load() -> Self {
        let locales = generated::LOCALES
            .iter()
            .map(|(locale, entries)| (*locale, entries.iter().copied().collect()))
            .collect::<HashMap<_, HashMap<_, _>>>();

        let mut by_language: HashMap<String, Vec<&'static str>> = HashMap::new();
        let mut aliases = HashMap::new();
        for locale in locales.keys().copied() {
            let tag = normalize_locale_tag(locale);
            let language = primary_language(&tag).to_string();
            by_language.entry(language).or_default().push(locale);
            aliases.insert(tag, locale);
        }
        for (language, candidates) in by_language {
            if let [only] = candidates.as_slice() {
                aliases.entry(language).or_insert(*only);
            }
        }

        Self {
            default_locale: generated::DEFAULT_LOCALE,
            locales,
            aliases,
        }
    }

    /// Walks from the full tag towards its primary language, dropping one
    /// subtag at a time, and settles on the default when nothing matches.
    fn resolve_locale(&self, requested: Option<&str>) -> &'static str {
        let Some(requested) = requested else {
            return self.default_locale;
        };
        let mut tag = normalize_locale_tag(requested);
        loop {
            if let Some(locale) = self.aliases.get(&tag) {
                return *locale;
            }
            match tag.rfind('-') {
                Some(cut) => tag.truncate(cut),
                None => return self.default_locale,
            }
        }
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<&'static str> {
        self.locales.get(locale)?.get(key).copied()
    }
}

fn primary_language(tag: &str) -> &str {
    tag.split('-').next().unwrap_or(tag)
}

// POSIX locales look like `fr_FR.UTF-8@euro`; only the language and region
// parts matter here.
fn normalize_locale_tag(tag: &str) -> String {
    let base = tag
        .trim()
        .split(['.', '@'])
        .next()
        .unwrap_or_default();
    base.split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("placeholder pattern compiles"));

fn format_template(template: &str, params: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            params
                .iter()
                .find(|(key, _)| *key == name)
                .map_or_else(|| caps[0].to_string(), |(_, value)| (*value).to_string())
        })
        .into_owned()
}
