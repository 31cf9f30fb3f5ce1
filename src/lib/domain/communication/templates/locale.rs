//! Locale

use std::{fmt, str::FromStr};

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref LOCALE_REGEX: Regex = Regex::new(r"^([A-Za-z]{3})(?:-([A-Za-z]{2}))?$").unwrap();
}

/// The locale used when none is given: standard English
pub const BASE_LOCALE: &str = "eng";

/// An error that can occur when parsing a locale
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("locale \"{0}\" is not an ISO 639-3 language code optionally followed by an ISO 3166-1 alpha-2 country code")]
pub struct LocaleError(pub String);

/// A locale such as `eng`, `eng-US` or `fra`
///
/// The language is an ISO 639-3 alpha-3 code, optionally followed by a dash
/// and an ISO 3166-1 alpha-2 country code.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Locale {
    language: String,
    country: Option<String>,
}

impl Locale {
    /// Parses a locale, normalizing the case of its parts
    pub fn new(raw: &str) -> Result<Self, LocaleError> {
        let captures = LOCALE_REGEX
            .captures(raw.trim())
            .ok_or_else(|| LocaleError(raw.to_string()))?;

        Ok(Self {
            language: captures[1].to_ascii_lowercase(),
            country: captures.get(2).map(|m| m.as_str().to_ascii_uppercase()),
        })
    }

    /// The ISO 639-3 language code
    pub fn language(&self) -> &str {
        &self.language
    }

    /// The ISO 3166-1 alpha-2 country code
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            language: BASE_LOCALE.to_string(),
            country: None,
        }
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.country {
            Some(country) => write!(f, "{}-{}", self.language, country),
            None => write!(f, "{}", self.language),
        }
    }
}
