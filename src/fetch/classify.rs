use crate::project::MediaProjectLayout;

/// Pick the asset subfolder for a downloaded file.
///
/// Rules are checked in configured order against the lower-cased canonical name; the
/// first substring match wins and the default subfolder catches everything else.
pub fn classify_subfolder<'a>(layout: &MediaProjectLayout<'a>, canonical: &str) -> &'a str {
    let lowered = canonical.to_lowercase();
    layout
        .subfolder_rules
        .iter()
        .find(|rule| !rule.contains.is_empty() && lowered.contains(&rule.contains.to_lowercase()))
        .map(|rule| rule.folder.as_str())
        .unwrap_or(layout.default_subfolder)
}
