//! Import options and their environment-variable loader.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Generation ordering on the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutDirection {
    /// Earliest ancestors at the top.
    #[default]
    TopToBottom,
    /// Earliest ancestors at the bottom.
    BottomToTop,
}

/// Language for generated labels and the sex property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fr,
}

/// Options recognized by the import pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct ImportOptions {
    /// Tag every node and edge with [`crate::convert::GENEALOGY_TAG`].
    pub add_genealogy_tag: bool,
    pub import_occupation: bool,
    pub import_notes: bool,
    /// Style nodes by sex instead of a neutral default.
    pub color_by_gender: bool,
    /// Emit `sibling of` edges (quadratic in family size).
    pub create_sibling_links: bool,
    /// Run the layout engine; otherwise every node sits at the origin.
    pub auto_layout: bool,
    pub layout_direction: LayoutDirection,
    pub locale: Locale,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            add_genealogy_tag: true,
            import_occupation: true,
            import_notes: true,
            color_by_gender: true,
            create_sibling_links: false,
            auto_layout: true,
            layout_direction: LayoutDirection::TopToBottom,
            locale: Locale::En,
        }
    }
}

impl ImportOptions {
    /// Build options from environment variables, defaulting absent keys.
    ///
    /// Optional:
    /// - `GENEALOGY_ADD_TAG`, `GENEALOGY_IMPORT_OCCUPATION`,
    ///   `GENEALOGY_IMPORT_NOTES`, `GENEALOGY_COLOR_BY_GENDER`,
    ///   `GENEALOGY_SIBLING_LINKS`, `GENEALOGY_AUTO_LAYOUT`: booleans
    /// - `GENEALOGY_LAYOUT_DIRECTION`: `top-to-bottom` (default) or `bottom-to-top`
    /// - `GENEALOGY_LOCALE`: `en` (default) or `fr`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a present key does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build options from any key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a present key does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let flag = |key: &str, default: bool| match lookup(key) {
            Some(raw) => parse_bool(key, &raw),
            None => Ok(default),
        };

        Ok(Self {
            add_genealogy_tag: flag("GENEALOGY_ADD_TAG", defaults.add_genealogy_tag)?,
            import_occupation: flag("GENEALOGY_IMPORT_OCCUPATION", defaults.import_occupation)?,
            import_notes: flag("GENEALOGY_IMPORT_NOTES", defaults.import_notes)?,
            color_by_gender: flag("GENEALOGY_COLOR_BY_GENDER", defaults.color_by_gender)?,
            create_sibling_links: flag("GENEALOGY_SIBLING_LINKS", defaults.create_sibling_links)?,
            auto_layout: flag("GENEALOGY_AUTO_LAYOUT", defaults.auto_layout)?,
            layout_direction: match lookup("GENEALOGY_LAYOUT_DIRECTION") {
                Some(raw) => parse_direction(&raw)?,
                None => defaults.layout_direction,
            },
            locale: match lookup("GENEALOGY_LOCALE") {
                Some(raw) => parse_locale(&raw)?,
                None => defaults.locale,
            },
        })
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key: key.to_owned(), value: raw.to_owned() }),
    }
}

/// Parse `top-to-bottom` / `bottom-to-top` (underscores accepted).
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for anything else.
pub fn parse_direction(raw: &str) -> Result<LayoutDirection, ConfigError> {
    match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
        "top-to-bottom" => Ok(LayoutDirection::TopToBottom),
        "bottom-to-top" => Ok(LayoutDirection::BottomToTop),
        _ => Err(ConfigError::InvalidValue { key: "GENEALOGY_LAYOUT_DIRECTION".to_owned(), value: raw.to_owned() }),
    }
}

/// Parse `en` / `fr`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for anything else.
pub fn parse_locale(raw: &str) -> Result<Locale, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "en" => Ok(Locale::En),
        "fr" => Ok(Locale::Fr),
        _ => Err(ConfigError::InvalidValue { key: "GENEALOGY_LOCALE".to_owned(), value: raw.to_owned() }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
