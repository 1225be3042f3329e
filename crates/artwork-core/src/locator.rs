//! Archive and source locators.
//!
//! Catalog records carry locators in several shapes: plain paths,
//! `file:` URIs, `jar:file:...!/` archive URIs, and remote URLs. Only
//! local locators can be read by the pipeline.

use std::path::{Path, PathBuf};

const REMOTE_SCHEMES: &[&str] = &["http://", "https://", "s3://", "ftp://"];

/// Local path a locator points at, or `None` for remote locators.
pub fn local_path(locator: &str) -> Option<PathBuf> {
    let locator = locator.trim();
    if locator.is_empty() {
        return None;
    }
    let lower = locator.to_ascii_lowercase();
    if REMOTE_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return None;
    }

    let mut rest = locator;
    if lower.starts_with("jar:") {
        rest = &rest[4..];
        rest = rest.strip_suffix("!/").unwrap_or(rest);
        rest = rest.strip_suffix('!').unwrap_or(rest);
    }
    if rest.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("file:")) {
        rest = &rest[5..];
        // file:///abs and file://localhost/abs carry an authority
        if let Some(after) = rest.strip_prefix("//") {
            rest = match after.find('/') {
                Some(0) => after,
                Some(idx) if after[..idx].eq_ignore_ascii_case("localhost") => &after[idx..],
                _ => return None,
            };
        }
    }

    if rest.is_empty() {
        None
    } else {
        Some(PathBuf::from(rest))
    }
}

/// Local path of the locator if it names an existing file.
pub fn reachable_path(locator: &str) -> Option<PathBuf> {
    local_path(locator).filter(|p| p.is_file())
}

/// Lowercased extension of the locator's file name, without the dot.
pub fn extension(locator: &str) -> Option<String> {
    Path::new(file_name(locator)?)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Final path component of the locator, ignoring any archive suffix.
pub fn file_name(locator: &str) -> Option<&str> {
    let trimmed = locator.trim();
    let trimmed = trimmed.strip_suffix("!/").unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('!').unwrap_or(trimmed);
    let name = trimmed
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())?;
    Some(name)
}

/// File name without its extension.
pub fn file_stem(locator: &str) -> Option<&str> {
    let name = file_name(locator)?;
    match name.rfind('.') {
        Some(0) | None => Some(name),
        Some(idx) => Some(&name[..idx]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_path_shapes() {
        assert_eq!(
            local_path("/data/cds/art.zip"),
            Some(PathBuf::from("/data/cds/art.zip"))
        );
        assert_eq!(
            local_path("file:///data/cds/art.zip"),
            Some(PathBuf::from("/data/cds/art.zip"))
        );
        assert_eq!(
            local_path("file:/data/cds/art.zip"),
            Some(PathBuf::from("/data/cds/art.zip"))
        );
        assert_eq!(
            local_path("jar:file:/data/cds/art.zip!/"),
            Some(PathBuf::from("/data/cds/art.zip"))
        );
        assert_eq!(
            local_path("file://localhost/data/art.zip"),
            Some(PathBuf::from("/data/art.zip"))
        );
    }

    #[test]
    fn test_remote_locators_have_no_local_path() {
        assert_eq!(local_path("https://example.com/art.zip"), None);
        assert_eq!(local_path("S3://bucket/art.zip"), None);
        assert_eq!(local_path("file://otherhost/art.zip"), None);
        assert_eq!(local_path("   "), None);
    }

    #[test]
    fn test_reachable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.png");
        std::fs::write(&path, b"x").unwrap();
        let locator = format!("file://{}", path.display());
        assert_eq!(reachable_path(&locator), Some(path.clone()));
        assert_eq!(reachable_path(path.to_str().unwrap()), Some(path));
        assert_eq!(reachable_path(dir.path().to_str().unwrap()), None);
        assert_eq!(reachable_path(dir.path().join("nope.png").to_str().unwrap()), None);
        assert_eq!(reachable_path("http://example.com/cover.png"), None);
    }

    #[test]
    fn test_name_helpers() {
        assert_eq!(extension("/a/b/Cover.PDF"), Some("pdf".to_string()));
        assert_eq!(extension("jar:file:/a/art.ZIP!/"), Some("zip".to_string()));
        assert_eq!(extension("/a/b/README"), None);
        assert_eq!(file_name("/a/b/cover.pdf"), Some("cover.pdf"));
        assert_eq!(file_stem("/a/b/cover.final.pdf"), Some("cover.final"));
        assert_eq!(file_stem("https://x/y/art.zip"), Some("art"));
        assert_eq!(file_name("/a/b/"), None);
    }
}
