//! Field checks shared by every boundary where user or catalog data enters.
//!
//! Each check returns the list of problems it found; an empty list means the
//! value is acceptable. Callers collect the lists and decide how to surface
//! them.

use regex::Regex;
use std::sync::LazyLock;

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("url pattern compiles"));

pub fn required(field: &str, value: &str) -> Vec<String> {
    if value.trim().is_empty() {
        vec![format!("{field} is required.")]
    } else {
        Vec::new()
    }
}

pub fn email(value: &str) -> Vec<String> {
    let mut errors = required("Email", value);
    if errors.is_empty() && !EMAIL.is_match(value.trim()) {
        errors.push(format!("\"{value}\" is not a valid email address."));
    }
    errors
}

pub fn url(value: &str) -> Vec<String> {
    let mut errors = required("URL", value);
    if errors.is_empty() && !URL.is_match(value.trim()) {
        errors.push(format!("\"{value}\" is not a valid http(s) URL."));
    }
    errors
}

pub fn password(value: &str) -> Vec<String> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        vec![format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long."
        )]
    } else {
        Vec::new()
    }
}
