use super::normalize::decode_component;

/// Generate candidate filenames for a media reference, most authoritative first.
///
/// An explicit name or title always wins. Otherwise the last segment of the server path
/// and then of the signed path is used, with any query string or fragment removed and
/// percent-encoding decoded. Duplicates are dropped while keeping order.
pub fn generate_filename_candidates(
    name: Option<&str>,
    path: Option<&str>,
    signed_path: Option<&str>,
) -> Vec<String> {
    let mut builder = CandidateBuilder::default();

    builder.add_explicit_name(name);
    builder.add_path_segment(path);
    builder.add_path_segment(signed_path);

    builder.finish()
}

/// Extract the decoded final segment of a path or URL.
pub fn last_path_segment(value: &str) -> Option<String> {
    let mut rest = value.split(['?', '#']).next().unwrap_or_default();
    let authority = rest
        .split_once("://")
        .map(|(_, after)| after)
        .or_else(|| rest.strip_prefix("//"));
    if let Some(after) = authority {
        rest = after.split_once('/').map(|(_, path)| path).unwrap_or_default();
    }

    let segment = rest
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .trim();
    if segment.is_empty() {
        return None;
    }
    Some(decode_component(segment).into_owned())
}

#[derive(Default)]
struct CandidateBuilder {
    result: Vec<String>,
}

impl CandidateBuilder {
    fn add_explicit_name(&mut self, name: Option<&str>) {
        if let Some(name) = name.map(str::trim).filter(|value| !value.is_empty()) {
            self.push(name.to_string());
        }
    }

    fn add_path_segment(&mut self, path: Option<&str>) {
        if let Some(segment) = path.and_then(last_path_segment) {
            self.push(segment);
        }
    }

    fn finish(self) -> Vec<String> {
        self.result
    }

    fn push(&mut self, candidate: String) {
        if !self.result.contains(&candidate) {
            self.result.push(candidate);
        }
    }
}
