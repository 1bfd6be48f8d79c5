use std::path::{Component, Path, PathBuf};

/// Outcome of checking a path against the directory allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathCheckResult {
    /// Whether the path lies inside one of the allowed directories.
    pub allowed: bool,

    /// The lexically normalized path the decision was computed against.
    pub normalized: PathBuf,
}

/// Lexically normalizes a path.
///
/// Resolves `.` and `..` components and collapses repeated separators
/// without touching the filesystem. `..` never climbs above the root of an
/// absolute path; leading `..` components of a relative path are kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            Component::Normal(part) => normalized.push(part),
        }
    }

    normalized
}

/// Checks `target` against the allowed directories and reports the
/// normalized path used for the decision.
///
/// A path is allowed when, once normalized, it equals an allowed directory
/// or continues below one. The comparison is done per path component, so
/// `/home/userX` is not inside `/home/user`. Relative targets and relative
/// allow-list entries never match.
pub fn check_path(target: &Path, allowed_dirs: &[PathBuf]) -> PathCheckResult {
    let normalized = normalize_path(target);

    let allowed = normalized.is_absolute()
        && allowed_dirs.iter().any(|dir| {
            let dir = normalize_path(dir);
            dir.is_absolute() && normalized.starts_with(&dir)
        });

    PathCheckResult {
        allowed,
        normalized,
    }
}

/// Returns whether `target` lies inside one of `allowed_dirs`.
pub fn is_allowed(target: &Path, allowed_dirs: &[PathBuf]) -> bool {
    check_path(target, allowed_dirs).allowed
}

/// Lowercased extension of the file name including the leading dot
/// (`"notes/Plan.MD"` gives `".md"`), or `None` when there is none.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}

/// Normalizes a configured extension to the `".ext"` lowercase form.
pub fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim().to_lowercase();
    if trimmed.is_empty() || trimmed.starts_with('.') {
        trimmed
    } else {
        format!(".{}", trimmed)
    }
}

/// Returns whether the file's extension is in the allow-list.
///
/// Files without an extension are always rejected.
pub fn is_allowed_extension(path: &Path, allowed_extensions: &[String]) -> bool {
    let Some(extension) = extension_of(path) else {
        return false;
    };

    allowed_extensions
        .iter()
        .any(|allowed| normalize_extension(allowed) == extension)
}

/// Returns whether `size` is within the ceiling. Equal is allowed.
pub fn is_within_limit(size: u64, max_bytes: u64) -> bool {
    size <= max_bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dirs(list: &[&str]) -> Vec<PathBuf> {
        list.iter().map(PathBuf::from).collect()
    }

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_resolves_dots() {
        assert_eq!(
            normalize_path(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
        assert_eq!(normalize_path(Path::new("/a//b/")), PathBuf::from("/a/b"));
        assert_eq!(normalize_path(Path::new("/../../etc")), PathBuf::from("/etc"));
        assert_eq!(normalize_path(Path::new("../x")), PathBuf::from("../x"));
    }

    #[cfg(unix)]
    #[test]
    fn test_allowed_directory_itself_and_children() {
        let allowed = dirs(&["/tmp/notes"]);

        assert!(is_allowed(Path::new("/tmp/notes"), &allowed));
        assert!(is_allowed(Path::new("/tmp/notes/"), &allowed));
        assert!(is_allowed(Path::new("/tmp/notes/a.md"), &allowed));
        assert!(is_allowed(Path::new("/tmp/notes/deep/er/b.txt"), &allowed));
    }

    #[cfg(unix)]
    #[test]
    fn test_sibling_with_shared_prefix_is_rejected() {
        let allowed = dirs(&["/a/b"]);

        assert!(!is_allowed(Path::new("/a/bc"), &allowed));
        assert!(!is_allowed(Path::new("/a/bc/file.md"), &allowed));
        assert!(!is_allowed(Path::new("/a"), &allowed));
    }

    #[cfg(unix)]
    #[test]
    fn test_traversal_out_of_allowed_dir_is_rejected() {
        let allowed = dirs(&["/tmp/notes"]);

        let result = check_path(Path::new("/tmp/notes/../other/a.md"), &allowed);
        assert!(!result.allowed);
        assert_eq!(result.normalized, PathBuf::from("/tmp/other/a.md"));

        assert!(is_allowed(
            Path::new("/tmp/notes/sub/../a.md"),
            &allowed
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_relative_paths_never_match() {
        let allowed = dirs(&["/tmp/notes", "relative/dir"]);

        assert!(!is_allowed(Path::new("tmp/notes/a.md"), &allowed));
        assert!(!is_allowed(Path::new("relative/dir/a.md"), &allowed));
    }

    #[cfg(unix)]
    #[test]
    fn test_allowed_entry_with_trailing_separator() {
        let allowed = dirs(&["/tmp/notes/"]);
        assert!(is_allowed(Path::new("/tmp/notes"), &allowed));
        assert!(is_allowed(Path::new("/tmp/notes/a.md"), &allowed));
    }

    #[test]
    fn test_empty_allow_list_rejects_everything() {
        assert!(!is_allowed(Path::new("/"), &[]));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("a.MD")).as_deref(), Some(".md"));
        assert_eq!(
            extension_of(Path::new("/x/archive.tar.gz")).as_deref(),
            Some(".gz")
        );
        assert_eq!(extension_of(Path::new("Makefile")), None);
        assert_eq!(extension_of(Path::new(".bashrc")), None);
    }

    #[test]
    fn test_extension_policy() {
        let allowed = exts(&[".md", "TXT"]);

        assert!(is_allowed_extension(Path::new("/n/a.md"), &allowed));
        assert!(is_allowed_extension(Path::new("/n/a.Md"), &allowed));
        assert!(is_allowed_extension(Path::new("/n/a.txt"), &allowed));
        assert!(!is_allowed_extension(Path::new("/n/a.rs"), &allowed));
        assert!(!is_allowed_extension(Path::new("/n/README"), &allowed));
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("MD"), ".md");
        assert_eq!(normalize_extension(" .Txt "), ".txt");
        assert_eq!(normalize_extension(""), "");
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        assert!(is_within_limit(0, 1024));
        assert!(is_within_limit(1024, 1024));
        assert!(!is_within_limit(1025, 1024));
    }
}
