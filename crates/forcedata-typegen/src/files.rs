//! Glob expansion for sample file patterns such as `json/*.json`.

use std::path::{Component, Path, PathBuf};

use globset::GlobBuilder;
use walkdir::WalkDir;

use crate::{Result, TypeGenError};

fn has_glob_meta(text: &str) -> bool {
    text.contains(['*', '?', '[', '{'])
}

/// Files matching `pattern`, sorted. A pattern without wildcards names a
/// single file. `*` stops at path separators; `**` crosses them.
pub fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let no_match = || TypeGenError::NoMatch {
        pattern: pattern.to_string(),
    };

    if !has_glob_meta(pattern) {
        let path = PathBuf::from(pattern);
        return if path.is_file() {
            Ok(vec![path])
        } else {
            Err(no_match())
        };
    }

    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| TypeGenError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?
        .compile_matcher();

    // Walk from the longest wildcard-free prefix.
    let components: Vec<Component<'_>> = Path::new(pattern).components().collect();
    let fixed = components
        .iter()
        .take_while(|c| !has_glob_meta(&c.as_os_str().to_string_lossy()))
        .count();
    let root: PathBuf = components[..fixed].iter().collect();
    let implicit_root = root.as_os_str().is_empty();
    let walk_root = if implicit_root {
        PathBuf::from(".")
    } else {
        root
    };
    if !walk_root.is_dir() {
        return Err(no_match());
    }

    let mut walker = WalkDir::new(&walk_root).follow_links(true);
    if !pattern.contains("**") {
        walker = walker.max_depth(components.len() - fixed);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|source| TypeGenError::Walk {
            root: walk_root.clone(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let candidate = if implicit_root {
            entry.path().strip_prefix(".").unwrap_or(entry.path())
        } else {
            entry.path()
        };
        if matcher.is_match(candidate) {
            files.push(candidate.to_path_buf());
        }
    }

    if files.is_empty() {
        return Err(no_match());
    }
    files.sort();
    tracing::debug!(pattern, matched = files.len(), "expanded pattern");
    Ok(files)
}
