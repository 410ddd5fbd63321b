//! Folder path handling for document libraries.

use compact_str::CompactString;

/// Names under which the default document library shows up in site URLs.
pub const DEFAULT_LIBRARIES: [&str; 2] = ["Shared Documents", "Documents"];

/// Turn a user-supplied folder path into a drive-relative path.
///
/// A leading `/sites/<site>/` prefix and the default library segment are
/// removed, as are surrounding slashes. The empty string is the drive root.
pub fn normalize_folder_path(raw: &str) -> String {
    let mut path = raw.trim();

    if let Some(rest) = path.strip_prefix("/sites/") {
        path = rest.split_once('/').map(|(_, tail)| tail).unwrap_or("");
    }
    let path = path.trim_matches('/');

    for library in DEFAULT_LIBRARIES {
        if path == library {
            return String::new();
        }
        if let Some(rest) = path
            .strip_prefix(library)
            .and_then(|rest| rest.strip_prefix('/'))
        {
            return rest.trim_matches('/').to_string();
        }
    }

    path.to_string()
}

/// Path of `name` inside the folder at `parent`.
pub fn join_path(parent: &str, name: &str) -> CompactString {
    if parent.is_empty() {
        CompactString::from(name)
    } else {
        let mut joined = CompactString::with_capacity(parent.len() + 1 + name.len());
        joined.push_str(parent);
        joined.push('/');
        joined.push_str(name);
        joined
    }
}

/// Percent-encode each segment of a drive path, keeping the separators.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment))
        .collect::<Vec<_>>()
        .join("/")
}

/// Split a site URL such as `https://contoso.sharepoint.com/sites/Team`
/// into host name and server-relative site path.
pub fn split_site_url(url: &str) -> Option<(&str, &str)> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);

    let (host, path) = match rest.split_once('/') {
        Some((host, path)) => (host, path.trim_matches('/')),
        None => (rest, ""),
    };

    if host.is_empty() {
        None
    } else {
        Some((host, path))
    }
}
