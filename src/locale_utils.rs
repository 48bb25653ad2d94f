use anyhow::{Result, anyhow};
use isolang::Language;

/// Locale utilities for `lang-REGION` tag handling
///
/// This module provides functions for validating, normalizing, and matching
/// the locale tags the synthesis API takes (e.g. "en-US", "fr-FR"): an
/// ISO 639-1 or ISO 639-3 language subtag, optionally followed by a
/// two-letter region subtag.
/// Split a locale tag into language and optional region subtags
fn split_locale(tag: &str) -> (String, Option<String>) {
    let trimmed = tag.trim();
    match trimmed.split_once(['-', '_']) {
        Some((lang, region)) => (lang.to_lowercase(), Some(region.to_uppercase())),
        None => (trimmed.to_lowercase(), None),
    }
}

/// Look up the language subtag of a locale
fn language_of(tag: &str) -> Option<Language> {
    let (lang, _) = split_locale(tag);
    match lang.len() {
        2 => Language::from_639_1(&lang),
        3 => Language::from_639_3(&lang),
        _ => None,
    }
}

/// Validate a locale tag
pub fn validate_locale(tag: &str) -> Result<()> {
    let (lang, region) = split_locale(tag);

    if language_of(&lang).is_none() {
        return Err(anyhow!("Invalid language subtag in locale: {}", tag));
    }

    if let Some(region) = region {
        if region.len() != 2 || !region.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(anyhow!("Invalid region subtag in locale: {}", tag));
        }
    }

    Ok(())
}

/// Normalize a locale tag to canonical casing ("en-US")
pub fn normalize_locale(tag: &str) -> Result<String> {
    validate_locale(tag)?;
    let (lang, region) = split_locale(tag);
    match region {
        Some(region) => Ok(format!("{}-{}", lang, region)),
        None => Ok(lang),
    }
}

/// Check if two locale tags share the same language
pub fn locales_match(tag1: &str, tag2: &str) -> bool {
    match (language_of(tag1), language_of(tag2)) {
        (Some(lang1), Some(lang2)) => lang1 == lang2,
        _ => false,
    }
}

/// Get the English language name from a locale tag
pub fn get_language_name(tag: &str) -> Result<String> {
    let lang = language_of(tag)
        .ok_or_else(|| anyhow!("Failed to get language from locale: {}", tag))?;

    Ok(lang.to_name().to_string())
}
