//! Localized message lookup.

use std::collections::HashMap;

use crate::error::Attributes;

/// Resolves message keys to localized text.
///
/// Locales are tags such as `en`, `en_US` or `pt-BR`. Lookup for `en_US`
/// falls back to `en` and then to the default catalog.
pub trait MessageSource: Send + Sync {
    /// Returns the interpolated message for `key`, or `key` itself if unknown.
    fn message(&self, key: &str, locale: &str, args: &Attributes) -> String;

    /// Returns true if `key` resolves for `locale` or one of its fallbacks.
    fn contains(&self, key: &str, locale: &str) -> bool;
}

/// In-memory message catalogs keyed by locale.
///
/// Templates reference arguments as `{name}`; unknown names are left as is.
#[derive(Debug, Clone, Default)]
pub struct MapMessageSource {
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl MapMessageSource {
    /// Locale of the fallback catalog.
    pub const DEFAULT_LOCALE: &'static str = "";

    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a template, builder style.
    #[must_use]
    pub fn with_message(mut self, locale: &str, key: &str, template: &str) -> Self {
        self.insert(locale, key, template);
        self
    }

    /// Adds every `(key, template)` pair to the catalog of `locale`.
    #[must_use]
    pub fn with_catalog<'a, I>(mut self, locale: &str, entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (key, template) in entries {
            self.insert(locale, key, template);
        }
        self
    }

    /// Adds a template.
    pub fn insert(&mut self, locale: &str, key: &str, template: &str) {
        self.catalogs
            .entry(normalize(locale))
            .or_default()
            .insert(key.to_string(), template.to_string());
    }

    fn lookup(&self, key: &str, locale: &str) -> Option<&str> {
        fallbacks(locale)
            .iter()
            .filter_map(|candidate| self.catalogs.get(candidate))
            .find_map(|catalog| catalog.get(key))
            .map(String::as_str)
    }
}

impl MessageSource for MapMessageSource {
    fn message(&self, key: &str, locale: &str, args: &Attributes) -> String {
        self.lookup(key, locale)
            .map_or_else(|| key.to_string(), |template| interpolate(template, args))
    }

    fn contains(&self, key: &str, locale: &str) -> bool {
        self.lookup(key, locale).is_some()
    }
}

fn normalize(locale: &str) -> String {
    locale.replace('-', "_")
}

/// `en_US` → `["en_US", "en", ""]`
fn fallbacks(locale: &str) -> Vec<String> {
    let locale = normalize(locale);
    let mut candidates = Vec::with_capacity(3);
    let mut current = locale.as_str();
    while !current.is_empty() {
        candidates.push(current.to_string());
        current = current.rsplit_once('_').map_or("", |(head, _)| head);
    }
    candidates.push(MapMessageSource::DEFAULT_LOCALE.to_string());
    candidates
}

/// Replaces `{name}` placeholders with values from `args`.
#[must_use]
pub fn interpolate(template: &str, args: &Attributes) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        match tail.find('}') {
            Some(close) => {
                let name = &tail[1..close];
                match args.get(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&tail[..=close]),
                }
                rest = &tail[close + 1..];
            }
            None => {
                out.push_str(tail);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_interpolate() {
        let a = args(&[("min", "1"), ("max", "5")]);
        assert_eq!(interpolate("between {min} and {max}", &a), "between 1 and 5");
        assert_eq!(interpolate("{unknown} stays", &a), "{unknown} stays");
        assert_eq!(interpolate("open { brace", &a), "open { brace");
        assert_eq!(interpolate("", &a), "");
    }

    #[test]
    fn test_locale_fallback() {
        let source = MapMessageSource::new()
            .with_message("", "notNull", "required")
            .with_message("de", "notNull", "erforderlich")
            .with_message("de_AT", "min", "zu klein");

        let none = Attributes::new();
        assert_eq!(source.message("min", "de-AT", &none), "zu klein");
        assert_eq!(source.message("notNull", "de_AT", &none), "erforderlich");
        assert_eq!(source.message("notNull", "fr", &none), "required");
        assert_eq!(source.message("size", "fr", &none), "size");
        assert!(source.contains("notNull", "ja"));
        assert!(!source.contains("min", "de"));
    }

    #[test]
    fn test_fallback_chain() {
        assert_eq!(fallbacks("pt-BR"), vec!["pt_BR", "pt", ""]);
        assert_eq!(fallbacks(""), vec![""]);
    }

    #[test]
    fn test_with_catalog() {
        let source = MapMessageSource::new().with_catalog("en", [("a", "A"), ("b", "B")]);
        assert_eq!(source.message("b", "en_GB", &Attributes::new()), "B");
    }
}
