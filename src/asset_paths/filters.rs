use regex::Regex;

fn remote_reference_patterns() -> &'static [Regex] {
    use std::sync::OnceLock;

    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            vec![
                Regex::new(r"(?i)^https?://").expect("invalid http(s) regex"),
                Regex::new(r"^//[^/]").expect("invalid protocol-relative regex"),
            ]
        })
        .as_slice()
}

const OS_ARTIFACTS: &[&str] = &["thumbs.db", "desktop.ini", "icon\r"];

/// Determine whether a reference already points at an absolute remote location.
pub fn is_remote_reference(value: &str) -> bool {
    remote_reference_patterns()
        .iter()
        .any(|pattern| pattern.is_match(value))
}

/// Whether a directory entry is operating-system clutter rather than a media asset.
///
/// Dot-files (`.DS_Store`, `._cover.jpg` resource forks) and the Windows/macOS thumbnail
/// caches never belong in the manifest.
pub fn is_os_artifact(file_name: &str) -> bool {
    file_name.starts_with('.') || OS_ARTIFACTS.contains(&file_name.to_ascii_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_absolute_urls() {
        assert!(is_remote_reference("https://cms.example/assets/abc"));
        assert!(is_remote_reference("HTTP://cms.example/assets/abc"));
        assert!(is_remote_reference("//cdn.example/cover.jpg"));
    }

    #[test]
    fn keeps_server_relative_paths() {
        assert!(!is_remote_reference("/assets/abc/cover.jpg"));
        assert!(!is_remote_reference("proj/abc/hero@2x_Q8mN.webp"));
    }

    #[test]
    fn skips_os_clutter() {
        assert!(is_os_artifact(".DS_Store"));
        assert!(is_os_artifact("._cover.jpg"));
        assert!(is_os_artifact("Thumbs.db"));
        assert!(!is_os_artifact("cover.jpg"));
    }
}
