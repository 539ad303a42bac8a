//! Rewrites the rendered version inside arbitrary text files
//!
//! Each updater targets a glob of files. Each pattern is a regular expression
//! with a `{{ version }}` placeholder. The placeholder is replaced by the
//! escaped old version, and the old version is swapped for the new one only
//! inside the matched regions.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{NoExpand, Regex};
use tracing::{debug, info, warn};

/// Pattern used when a file lists none: every occurrence of the version
pub const DEFAULT_PATTERN: &str = "{{ version }}";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*version\s*\}\}").expect("placeholder regex is valid"));

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("Failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid path glob `{glob}`: {source}")]
    Glob {
        glob: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Invalid pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpdater {
    path: PathBuf,
    patterns: Vec<String>,
}

impl FileUpdater {
    /// `path` is a glob; every matching file is updated
    pub fn new(path: impl Into<PathBuf>, patterns: Vec<String>) -> Self {
        let patterns = if patterns.is_empty() {
            vec![DEFAULT_PATTERN.to_string()]
        } else {
            patterns
        };
        Self {
            path: path.into(),
            patterns,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Replace `old_version` with `new_version` in every file matching the glob.
    ///
    /// Returns the number of matched regions that were rewritten. An empty
    /// `old_version` matches everywhere, so nothing is touched in that case.
    pub fn update(&self, old_version: &str, new_version: &str) -> Result<usize, UpdateError> {
        if old_version.is_empty() {
            warn!(
                "No previous version to replace in {:?}, skipping",
                self.path
            );
            return Ok(0);
        }

        let glob = self.path.to_string_lossy();
        let paths = glob::glob(&glob).map_err(|source| UpdateError::Glob {
            glob: glob.to_string(),
            source,
        })?;

        let mut total = 0;
        let mut matched = 0;
        for entry in paths {
            let path = entry.map_err(|e| UpdateError::Io {
                path: e.path().to_path_buf(),
                source: e.into_error(),
            })?;
            if path.is_file() {
                total += self.update_file(&path, old_version, new_version)?;
                matched += 1;
            }
        }

        if matched == 0 {
            warn!("No files match {:?}", self.path);
        }
        Ok(total)
    }

    fn update_file(
        &self,
        path: &Path,
        old_version: &str,
        new_version: &str,
    ) -> Result<usize, UpdateError> {
        let io_error = |source| UpdateError::Io {
            path: path.to_path_buf(),
            source,
        };

        let content = std::fs::read_to_string(path).map_err(io_error)?;
        let (updated, count) = self.update_content(&content, old_version, new_version)?;

        if count > 0 {
            std::fs::write(path, updated).map_err(io_error)?;
        }
        info!(
            "Updated {} occurrence(s) of {} in {:?}",
            count, old_version, path
        );
        Ok(count)
    }

    fn update_content(
        &self,
        content: &str,
        old_version: &str,
        new_version: &str,
    ) -> Result<(String, usize), UpdateError> {
        let mut ranges: Vec<Range<usize>> = Vec::new();
        for regex in self.rendered_patterns(old_version)? {
            ranges.extend(regex.find_iter(content).map(|m| m.range()));
        }
        let ranges = merge_ranges(ranges);

        let mut updated = String::with_capacity(content.len());
        let mut last = 0;
        for range in &ranges {
            updated.push_str(&content[last..range.start]);
            updated.push_str(&content[range.clone()].replace(old_version, new_version));
            last = range.end;
        }
        updated.push_str(&content[last..]);

        Ok((updated, ranges.len()))
    }

    fn rendered_patterns(&self, version: &str) -> Result<Vec<Regex>, UpdateError> {
        let escaped = regex::escape(version);
        self.patterns
            .iter()
            .map(|pattern| {
                let rendered = PLACEHOLDER.replace_all(pattern, NoExpand(&escaped));
                debug!("Rendered pattern `{}` as `{}`", pattern, rendered);
                Regex::new(&rendered).map_err(|source| UpdateError::Pattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect()
    }
}

/// Sort ranges and merge the ones that overlap, so that no text is rewritten twice
fn merge_ranges(mut ranges: Vec<Range<usize>>) -> Vec<Range<usize>> {
    ranges.sort_by_key(|range| (range.start, range.end));

    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start < last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const CONTENT: &str = "We are currently at version 1.0, although we want to get to 3.8\n\
        soon. We depend on Something 1.0. Support OurProject 1.0!\n";

    #[test]
    fn default_pattern_replaces_every_occurrence() {
        let updater = FileUpdater::new("unused", vec![]);

        let (updated, count) = updater.update_content(CONTENT, "1.0", "2.2").unwrap();

        assert_eq!(
            updated,
            "We are currently at version 2.2, although we want to get to 3.8\n\
             soon. We depend on Something 2.2. Support OurProject 2.2!\n"
        );
        assert_eq!(count, 3);
    }

    #[test]
    fn patterns_restrict_replacement_to_matches() {
        let updater = FileUpdater::new(
            "unused",
            vec![
                "We are currently at version {{ version }}".to_string(),
                "OurP.*{{ version }}".to_string(),
            ],
        );

        let (updated, _) = updater.update_content(CONTENT, "1.0", "2.2").unwrap();

        assert_eq!(
            updated,
            "We are currently at version 2.2, although we want to get to 3.8\n\
             soon. We depend on Something 1.0. Support OurProject 2.2!\n"
        );
    }

    #[test]
    fn version_is_matched_literally() {
        let updater = FileUpdater::new("unused", vec![]);

        let (updated, count) = updater.update_content("1x0 and 1.0", "1.0", "1.1").unwrap();

        assert_eq!(updated, "1x0 and 1.1");
        assert_eq!(count, 1);
    }

    #[test]
    fn overlapping_matches_are_rewritten_once() {
        let updater = FileUpdater::new(
            "unused",
            vec!["v{{version}}".to_string(), "{{ version }}".to_string()],
        );

        let (updated, _) = updater.update_content("v1.0", "1.0", "1.0.1").unwrap();

        assert_eq!(updated, "v1.0.1");
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let updater = FileUpdater::new("unused", vec!["({{ version }}".to_string()]);

        let result = updater.update_content(CONTENT, "1.0", "2.2");

        assert!(matches!(result, Err(UpdateError::Pattern { .. })));
    }

    #[rstest]
    #[case(vec![], vec![])]
    #[case(vec![0..2, 5..7], vec![0..2, 5..7])]
    #[case(vec![5..7, 0..2], vec![0..2, 5..7])]
    #[case(vec![0..4, 2..6], vec![0..6])]
    #[case(vec![0..6, 2..4], vec![0..6])]
    #[case(vec![0..2, 2..4], vec![0..2, 2..4])] // adjacent, not overlapping
    fn merge_ranges_merges_overlaps(
        #[case] ranges: Vec<Range<usize>>,
        #[case] expected: Vec<Range<usize>>,
    ) {
        assert_eq!(merge_ranges(ranges), expected);
    }

    #[test]
    fn update_rewrites_file_on_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("VERSION");
        std::fs::write(&path, "1.0\n").unwrap();

        let count = FileUpdater::new(&path, vec![]).update("1.0", "2.0").unwrap();

        assert_eq!(count, 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "2.0\n");
    }

    #[test]
    fn update_without_matching_files_changes_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let updater = FileUpdater::new(dir.path().join("missing"), vec![]);

        assert_eq!(updater.update("1.0", "2.0").unwrap(), 0);
    }

    #[test]
    fn update_follows_path_glob() {
        let dir = tempfile::TempDir::new().unwrap();
        for name in ["a.txt", "b.txt", "c.md"] {
            std::fs::write(dir.path().join(name), "v1.0\n").unwrap();
        }

        let count = FileUpdater::new(dir.path().join("*.txt"), vec![])
            .update("1.0", "2.0")
            .unwrap();

        assert_eq!(count, 2);
        for name in ["a.txt", "b.txt"] {
            assert_eq!(
                std::fs::read_to_string(dir.path().join(name)).unwrap(),
                "v2.0\n"
            );
        }
        assert_eq!(
            std::fs::read_to_string(dir.path().join("c.md")).unwrap(),
            "v1.0\n"
        );
    }

    #[test]
    fn update_with_empty_old_version_leaves_file_untouched() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("README.md");
        std::fs::write(&path, "abc\n").unwrap();

        let count = FileUpdater::new(&path, vec![]).update("", "1").unwrap();

        assert_eq!(count, 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "abc\n");
    }

    #[test]
    fn invalid_path_glob_is_reported() {
        let updater = FileUpdater::new("[", vec![]);

        assert!(matches!(
            updater.update("1.0", "2.0"),
            Err(UpdateError::Glob { .. })
        ));
    }
}
