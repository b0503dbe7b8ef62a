//! Identifier transforms: prefix/suffix stripping, case conversion, tag lookup.
//!
//! Pure functions with no shared state. Registry literals arrive in
//! `SCREAMING_SNAKE` form (`VK_IMAGE_TYPE_2D`), type names in camel case
//! (`ImageType`); binding identifiers are derived from both.

use crate::error::IdentError;
use std::collections::BTreeSet;

/// Remove `prefix` from the front of `value` if present, then, when `suffix`
/// is given, cut everything from the suffix's last occurrence onward.
///
/// The prefix is optional; a non-empty suffix is mandatory.
pub fn strip(value: &str, prefix: &str, suffix: Option<&str>) -> Result<String, IdentError> {
    let stripped = value.strip_prefix(prefix).unwrap_or(value);
    match suffix {
        Some(suffix) if !suffix.is_empty() => match stripped.rfind(suffix) {
            Some(pos) => Ok(stripped[..pos].to_string()),
            None => Err(IdentError::MalformedIdentifier {
                value: value.to_string(),
                suffix: suffix.to_string(),
            }),
        },
        _ => Ok(stripped.to_string()),
    }
}

/// `IMAGE_TYPE_2D` → `ImageType2D`.
///
/// The first character is kept as-is. A character following `_` or a digit
/// starts a new word and keeps its case; every other letter is lower-cased.
/// Underscores are dropped.
pub fn to_camel_case(value: &str) -> Result<String, IdentError> {
    let mut chars = value.chars();
    let first = match chars.next() {
        Some(c) if c.is_ascii_uppercase() || c.is_ascii_digit() => c,
        _ => return Err(IdentError::NotScreamingSnake(value.to_string())),
    };

    let mut result = String::with_capacity(value.len());
    result.push(first);
    let mut prev = first;
    for c in chars {
        if c != '_' {
            if prev == '_' || prev.is_ascii_digit() {
                result.push(c);
            } else {
                result.push(c.to_ascii_lowercase());
            }
        }
        prev = c;
    }
    Ok(result)
}

/// `ColorSpaceKHR` → `COLOR_SPACE_KHR`.
///
/// An `_` goes before every uppercase letter that follows a lowercase letter
/// or a digit; then the whole string is upper-cased.
pub fn to_macro_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len() + 8);
    let mut prev: Option<char> = None;
    for c in value.chars() {
        if c.is_ascii_uppercase()
            && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
        {
            result.push('_');
        }
        result.push(c.to_ascii_uppercase());
        prev = Some(c);
    }
    result
}

/// The longest known tag that is a suffix of `name`.
pub fn find_tag<'a>(name: &str, tags: &'a BTreeSet<String>) -> Option<&'a str> {
    tags.iter()
        .filter(|tag| !tag.is_empty() && name.ends_with(tag.as_str()))
        .max_by_key(|tag| tag.len())
        .map(String::as_str)
}

/// `VK_KHR_surface` → `KHR`: the token between the first and second `_`.
pub fn extract_extension_tag(extension_name: &str) -> Result<String, IdentError> {
    let mut parts = extension_name.splitn(3, '_');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(tag), Some(_)) if !tag.is_empty() => Ok(tag.to_string()),
        _ => Err(IdentError::MalformedExtensionName(
            extension_name.to_string(),
        )),
    }
}

/// `vkCreateInstance` → `createInstance`.
pub fn strip_command(value: &str, prefix: &str) -> Result<String, IdentError> {
    let stripped = value.strip_prefix(prefix).unwrap_or(value);
    let mut chars = stripped.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => {
            Ok(c.to_ascii_lowercase().to_string() + chars.as_str())
        }
        _ => Err(IdentError::NotScreamingSnake(value.to_string())),
    }
}
