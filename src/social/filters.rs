//! src/social/filters.rs
//!
//! Pure display projections over backend keys. Registered as template
//! helpers; none of them touch request or database state.

use super::backends::{kind_of, Kind};

/// Human-facing provider name. A few providers have branding the generic
/// split-and-capitalize rule gets wrong.
pub fn backend_name(key: &str) -> String {
    match key {
        "google-oauth2" => "Google".to_string(),
        "google-plus" => "Google+".to_string(),
        "github" => "GitHub".to_string(),
        "stackoverflow" => "Stack Overflow".to_string(),
        _ => key
            .split(['-', '_'])
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// CSS class hook for a provider button.
pub fn backend_class(key: &str) -> String {
    format!("backend-{}", key.to_lowercase().replace(['_', '.'], "-"))
}

/// Icon font name; providers sharing one brand share one icon.
pub fn icon_name(key: &str) -> String {
    match key {
        "google-oauth2" | "google-plus" => "google".to_string(),
        "stackoverflow" => "stack-overflow".to_string(),
        "username" | "email" => "user".to_string(),
        _ => key.to_string(),
    }
}

pub fn social_backends(keys: &[String]) -> Vec<String> {
    keys.iter()
        .filter(|key| kind_of(key) != Some(Kind::Legacy))
        .cloned()
        .collect()
}

pub fn legacy_backends(keys: &[String]) -> Vec<String> {
    keys.iter()
        .filter(|key| kind_of(key) == Some(Kind::Legacy))
        .cloned()
        .collect()
}

pub fn oauth_backends(keys: &[String]) -> Vec<String> {
    keys.iter()
        .filter(|key| matches!(kind_of(key), Some(Kind::OAuth2) | Some(Kind::OAuth1)))
        .cloned()
        .collect()
}

pub fn filter_backends(keys: &[String], allowed: &[String]) -> Vec<String> {
    keys.iter()
        .filter(|key| allowed.contains(key))
        .cloned()
        .collect()
}

/// Chunk a backend list into rows of `size` for grid layouts.
pub fn slice_by(keys: &[String], size: usize) -> Vec<Vec<String>> {
    if size == 0 {
        return vec![keys.to_vec()];
    }
    keys.chunks(size).map(|chunk| chunk.to_vec()).collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
