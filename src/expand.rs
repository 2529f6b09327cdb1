//! Classpath string splitting and `*` expansion.
//!
//! `*` segments follow the JVM launcher convention: they stand for the
//! `.jar` files of one directory, never for sub-directories or other files.

use regex::Regex;
use std::path::{MAIN_SEPARATOR, MAIN_SEPARATOR_STR, Path};

pub const PATH_SEPARATOR: char = if cfg!(windows) { ';' } else { ':' };

const JAR_SUFFIX: &str = ".jar";

/// Splits on the platform path separator. Order and duplicates are kept;
/// empty segments are dropped.
pub fn split_path(path: &str) -> Vec<String> {
    path.split(PATH_SEPARATOR)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits `path` and, when `expand_star` is set, expands wildcard segments.
/// Relative wildcard directories are listed under `base_dir`.
pub fn expand_path(path: &str, expand_star: bool, base_dir: &Path) -> Vec<String> {
    let segments = split_path(path);
    if !expand_star {
        return segments;
    }
    let base_dir = if base_dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        base_dir
    };
    segments
        .iter()
        .flat_map(|segment| expand_segment(segment, base_dir))
        .collect()
}

fn expand_segment(segment: &str, base_dir: &Path) -> Vec<String> {
    if segment == "*" {
        return list_jars(base_dir, |_| true);
    }

    let wild_suffix = format!("{MAIN_SEPARATOR}*");
    if let Some(dir) = segment.strip_suffix(wild_suffix.as_str()) {
        let dir = if dir.is_empty() { MAIN_SEPARATOR_STR } else { dir };
        return list_jars(&base_dir.join(dir), |_| true);
    }

    if !segment.contains('*') {
        return vec![segment.to_string()];
    }

    let (dir, file_pattern) = match segment.rsplit_once(MAIN_SEPARATOR) {
        Some(("", file_pattern)) => (Path::new(MAIN_SEPARATOR_STR).to_path_buf(), file_pattern),
        Some((dir, file_pattern)) => (base_dir.join(dir), file_pattern),
        None => (base_dir.to_path_buf(), segment),
    };
    let pattern = format!("^{}$", regex::escape(file_pattern).replace(r"\*", ".*"));
    match Regex::new(&pattern) {
        Ok(re) => list_jars(&dir, |name| re.is_match(name)),
        Err(err) => {
            tracing::debug!(segment, error = %err, "unusable wildcard, keeping segment as-is");
            vec![segment.to_string()]
        }
    }
}

/// `.jar` files (any case) directly inside `dir`, sorted by name.
fn list_jars(dir: &Path, filter: impl Fn(&str) -> bool) -> Vec<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::debug!(dir = %dir.display(), error = %err, "wildcard directory not listable");
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.to_ascii_lowercase().ends_with(JAR_SUFFIX) && filter(name))
        .collect();
    names.sort();
    names
        .into_iter()
        .map(|name| dir.join(name).to_string_lossy().to_string())
        .collect()
}
