use crate::project::MediaProjectLayout;

/// Produce the public, root-relative path for a mirrored asset.
///
/// The generated path always uses forward slashes and a single leading slash so the
/// manifest works regardless of the native separator used when files were discovered.
pub fn make_public_asset_path(
    layout: &MediaProjectLayout,
    subfolder: Option<&str>,
    file_name: &str,
) -> String {
    let root = layout.asset_root_url.trim_end_matches('/');
    let mut path = String::from(root);
    if !root.starts_with('/') {
        path.insert(0, '/');
    }

    if let Some(folder) = subfolder.map(|value| value.replace('\\', "/")) {
        let folder = folder.trim_matches('/');
        if !folder.is_empty() {
            path.push('/');
            path.push_str(folder);
        }
    }

    path.push('/');
    path.push_str(file_name.trim_start_matches('/'));
    path
}

/// Join a remote origin and a server-relative path, leaving absolute URLs untouched.
pub fn make_remote_url(remote_origin: &str, remote_path: &str) -> String {
    if super::is_remote_reference(remote_path) {
        return remote_path.to_string();
    }
    format!(
        "{}/{}",
        remote_origin.trim_end_matches('/'),
        remote_path.trim_start_matches('/')
    )
}
