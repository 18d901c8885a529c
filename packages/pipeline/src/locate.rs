use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Maximum depth below the workspace root to search for a manifest.
const PROJECT_SEARCH_DEPTH: usize = 3;

/// Candidate artifact directory names in priority order. Export-style
/// output beats framework-internal output when both qualify.
const ARTIFACT_CANDIDATES: [&str; 4] = ["out", "dist", "build", ".next"];

/// Name returned when no candidate qualifies; the publisher then fails
/// with a clear artifact-missing error instead of guessing.
const ARTIFACT_DEFAULT: &str = "dist";

/// Find the buildable project root within a fetched tree.
///
/// Pre-order traversal in directory-listing order, bounded to
/// `PROJECT_SEARCH_DEPTH` levels, skipping dot-directories. The first
/// directory containing `package.json` wins. When nothing matches, the
/// search root itself is returned and downstream stages run in degraded
/// mode against a manifest-less tree.
pub fn find_project_root(root: &Path) -> PathBuf {
    // Explicit stack instead of recursion; trees can be arbitrarily deep
    // even though the search itself is bounded.
    let mut stack: Vec<(PathBuf, usize)> = vec![(root.to_path_buf(), 0)];

    while let Some((dir, depth)) = stack.pop() {
        if dir.join("package.json").is_file() {
            debug!(project_root = %dir.display(), "Found project manifest");
            return dir;
        }

        if depth >= PROJECT_SEARCH_DEPTH {
            continue;
        }

        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Skipping unreadable directory");
                continue;
            }
        };

        let mut children: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .filter(|p| !is_dot_dir(p))
            .collect();

        // Stack is LIFO; push in reverse so the first-listed child is
        // visited first (pre-order).
        children.reverse();
        for child in children {
            stack.push((child, depth + 1));
        }
    }

    warn!(root = %root.display(), "No project manifest found, using fetch root");
    root.to_path_buf()
}

/// Select the build output directory beneath a project root.
///
/// A candidate qualifies only if it exists and directly contains at least
/// one HTML document. When none qualify the default name is returned even
/// though it may not exist.
pub fn find_artifact_dir(project_root: &Path) -> PathBuf {
    for candidate in ARTIFACT_CANDIDATES {
        let dir = project_root.join(candidate);
        if dir.is_dir() && contains_html_file(&dir) {
            debug!(artifact = %dir.display(), "Selected artifact directory");
            return dir;
        }
    }
    project_root.join(ARTIFACT_DEFAULT)
}

/// Non-recursive check for an HTML document directly inside `dir`.
fn contains_html_file(dir: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    entries.filter_map(|e| e.ok()).any(|entry| {
        let path = entry.path();
        path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
    })
}

fn is_dot_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}
