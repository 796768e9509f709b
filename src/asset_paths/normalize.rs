use std::borrow::Cow;
use std::sync::OnceLock;

use percent_encoding::percent_decode_str;
use regex::Regex;

fn scale_hash_suffix() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"@(\d+)x_[A-Za-z0-9]+(\.[^./]+)$").expect("invalid scale suffix regex")
    })
}

fn hash_suffix() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"_[A-Za-z0-9]{4,}(\.[^./]+)$").expect("invalid hash suffix regex")
    })
}

/// Reduce a raw filename to its canonical identity.
///
/// Uploads of the same image recorded at different times or scales collapse to a single
/// name: `cover@2x_aB3dE9.png` becomes `cover@2x.png` and `cover_aB3dE9.png` becomes
/// `cover.png`. Both rewrites repeat until nothing changes, which keeps the function
/// idempotent for double-stamped names. Returns `None` for absent or blank input.
pub fn normalize(raw: Option<&str>) -> Option<String> {
    let decoded = decode_fully(raw?);
    let trimmed = decoded.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut name = trimmed.to_string();
    loop {
        let next = {
            let collapsed = scale_hash_suffix().replace(&name, "@${1}x${2}");
            hash_suffix().replace(&collapsed, "${1}").into_owned()
        };
        if next == name {
            break;
        }
        name = next;
    }

    Some(name)
}

/// Convenience wrapper around [`normalize`] for plain string slices.
pub fn canonical_name(raw: &str) -> Option<String> {
    normalize(Some(raw))
}

/// Percent-decode a value, leaving invalid UTF-8 sequences untouched.
pub fn decode_component(value: &str) -> Cow<'_, str> {
    match percent_decode_str(value).decode_utf8() {
        Ok(decoded) => decoded,
        Err(_) => Cow::Borrowed(value),
    }
}

/// Decode until stable. Every pass that changes the value shortens it, so this ends.
fn decode_fully(value: &str) -> String {
    let mut current = value.to_string();
    loop {
        let decoded = decode_component(&current).into_owned();
        if decoded == current {
            return current;
        }
        current = decoded;
    }
}
