//! Possession entries: the workspace paths a tooth claims as its own.
//!
//! - `plugins/a/` claims a directory subtree
//! - `plugins/*.dll` is a glob
//! - anything else is a single file

use anyhow::Result;
use glob::{MatchOptions, Pattern};
use log::debug;
use std::path::{Component, Path, PathBuf};

use crate::context::STATE_DIR_NAME;
use crate::runtime::Runtime;

const GLOB_METACHARS: &[char] = &['*', '?', '['];
const GLOB_CLOSERS: &[char] = &['*', '?', ']'];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
pub enum Possession {
    /// Stored without the trailing `/`.
    Directory(String),
    Glob(Pattern),
    File(String),
}

impl Possession {
    pub fn parse(entry: &str) -> Result<Self> {
        let entry = entry.trim();
        if entry.contains(GLOB_METACHARS) {
            let pattern = Pattern::new(entry)
                .map_err(|e| anyhow::anyhow!("invalid possession pattern {:?}: {}", entry, e))?;
            return Ok(Possession::Glob(pattern));
        }
        match entry.strip_suffix('/') {
            Some(dir) => Ok(Possession::Directory(dir.to_string())),
            None => Ok(Possession::File(entry.to_string())),
        }
    }

    /// The literal path, for directory and file entries.
    fn literal(&self) -> Option<&str> {
        match self {
            Possession::Directory(path) | Possession::File(path) => Some(path),
            Possession::Glob(_) => None,
        }
    }

    /// Whether `path` (workspace-relative, `/`-separated) falls under this entry.
    pub fn covers(&self, path: &str) -> bool {
        match self {
            Possession::Directory(dir) => {
                path == dir
                    || path
                        .strip_prefix(dir.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            Possession::Glob(pattern) => pattern.matches_with(path, MATCH_OPTIONS),
            Possession::File(file) => path == file,
        }
    }

    /// Whether two entries could claim the same path.
    ///
    /// Glob pairs are compared conservatively: they conflict unless their
    /// depth or literal head or tail rules out a common match.
    pub fn conflicts_with(&self, other: &Possession) -> bool {
        match (self, other) {
            (Possession::Glob(a), Possession::Glob(b)) => globs_may_overlap(a.as_str(), b.as_str()),
            (Possession::Glob(pattern), _) => other
                .literal()
                .is_some_and(|path| glob_reaches(pattern.as_str(), path)),
            (_, Possession::Glob(_)) => other.conflicts_with(self),
            _ => {
                let (a, b) = (self.literal(), other.literal());
                match (a, b) {
                    (Some(a), Some(b)) => self.covers(b) || other.covers(a),
                    _ => false,
                }
            }
        }
    }

    /// Delete whatever this entry claims under `workspace`.
    ///
    /// Missing paths are skipped. Emptied parent directories are kept.
    pub fn remove<R: Runtime>(&self, runtime: &R, workspace: &Path) -> Result<()> {
        match self {
            Possession::Directory(dir) => remove_path(runtime, &workspace.join(dir)),
            Possession::File(file) => remove_path(runtime, &workspace.join(file)),
            Possession::Glob(pattern) => {
                let root = workspace.join(literal_prefix(pattern.as_str()));
                if !runtime.exists(&root) {
                    debug!("Nothing matches {}", pattern);
                    return Ok(());
                }
                for path in matching_paths(runtime, workspace, &root, self)? {
                    remove_path(runtime, &path)?;
                }
                Ok(())
            }
        }
    }
}

fn remove_path<R: Runtime>(runtime: &R, path: &Path) -> Result<()> {
    if !runtime.exists(path) {
        debug!("{:?} already absent", path);
        return Ok(());
    }
    if runtime.is_dir(path) {
        runtime.remove_dir_all(path)
    } else {
        runtime.remove_file(path)
    }
}

/// Whether two globs might match a common path.
fn globs_may_overlap(a: &str, b: &str) -> bool {
    let recursive = a.contains("**") || b.contains("**");
    if !recursive && a.matches('/').count() != b.matches('/').count() {
        return false;
    }
    let (head_a, head_b) = (glob_head(a), glob_head(b));
    let (tail_a, tail_b) = (glob_tail(a), glob_tail(b));
    (head_a.starts_with(head_b) || head_b.starts_with(head_a))
        && (tail_a.ends_with(tail_b) || tail_b.ends_with(tail_a))
}

fn glob_head(pattern: &str) -> &str {
    pattern.find(GLOB_METACHARS).map_or(pattern, |i| &pattern[..i])
}

fn glob_tail(pattern: &str) -> &str {
    pattern.rfind(GLOB_CLOSERS).map_or(pattern, |i| &pattern[i + 1..])
}

/// Whether a glob matches `path`, one of its parent directories or (for a
/// directory claim) anything below it. Removing a matched directory deletes
/// it whole, so a match on any common leading segment counts.
fn glob_reaches(pattern: &str, path: &str) -> bool {
    let segments: Vec<&str> = pattern.split('/').collect();
    let parts: Vec<&str> = path.split('/').collect();
    let depth = segments.len().min(parts.len());

    if segments[..depth].iter().any(|s| s.contains("**")) {
        return true;
    }
    Pattern::new(&segments[..depth].join("/"))
        .map_or(true, |head| head.matches_with(&parts[..depth].join("/"), MATCH_OPTIONS))
}

/// Leading directories of a glob that contain no metacharacters.
fn literal_prefix(pattern: &str) -> PathBuf {
    let mut prefix = PathBuf::new();
    let mut parts = pattern.split('/').peekable();
    while let Some(part) = parts.next() {
        // The last part names entries, never a directory to descend from.
        if part.contains(GLOB_METACHARS) || parts.peek().is_none() {
            break;
        }
        prefix.push(part);
    }
    prefix
}

/// Paths under `dir` covered by `possession`. A matched directory is
/// returned whole and not descended into.
fn matching_paths<R: Runtime>(
    runtime: &R,
    workspace: &Path,
    dir: &Path,
    possession: &Possession,
) -> Result<Vec<PathBuf>> {
    let mut matched = Vec::new();
    for path in runtime.read_dir(dir)? {
        let Some(relative) = relative_slash_path(workspace, &path) else {
            continue;
        };
        if relative == STATE_DIR_NAME {
            continue;
        }
        if possession.covers(&relative) {
            matched.push(path);
        } else if runtime.is_dir(&path) {
            matched.extend(matching_paths(runtime, workspace, &path, possession)?);
        }
    }
    Ok(matched)
}

fn relative_slash_path(workspace: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(workspace).ok()?;
    let parts: Vec<&str> = relative
        .components()
        .map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Option<_>>()?;
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RealRuntime;
    use std::fs;
    use tempfile::tempdir;

    fn parse(entry: &str) -> Possession {
        Possession::parse(entry).unwrap()
    }

    #[test]
    fn test_parse_kinds() {
        assert!(matches!(parse("plugins/a/"), Possession::Directory(d) if d == "plugins/a"));
        assert!(matches!(parse("plugins/*.dll"), Possession::Glob(_)));
        assert!(matches!(parse("plugins/a.dll"), Possession::File(f) if f == "plugins/a.dll"));
        assert!(Possession::parse("plugins/[a").is_err());
    }

    #[test]
    fn test_covers() {
        assert!(parse("plugins/a/").covers("plugins/a/config.json"));
        assert!(parse("plugins/a/").covers("plugins/a"));
        assert!(!parse("plugins/a/").covers("plugins/ab/config.json"));
        assert!(parse("plugins/*.dll").covers("plugins/a.dll"));
        assert!(!parse("plugins/*.dll").covers("plugins/sub/a.dll"));
        assert!(parse("plugins/a.dll").covers("plugins/a.dll"));
    }

    #[test]
    fn test_conflicts() {
        let cases = [
            ("plugins/a.dll", "plugins/a.dll", true),
            ("plugins/a/", "plugins/a/data.json", true),
            ("plugins/a/data.json", "plugins/a/", true),
            ("plugins/a/", "plugins/a/sub/", true),
            ("plugins/*.dll", "plugins/b.dll", true),
            ("plugins/b.dll", "plugins/*.dll", true),
            ("plugins/*.dll", "plugins/*.dll", true),
            ("plugins/a/", "plugins/b/", false),
            ("plugins/a.dll", "plugins/b.dll", false),
            ("plugins/*.dll", "plugins/*.so", false),
            ("plugins/*.dll", "plugins/readme.md", false),
            ("plugins/*.dll", "plugins/a*", true),
            ("plugins/a*", "plugins/*.dll", true),
            ("plugins/a*.dll", "plugins/b*", false),
            ("*.dll", "plugins/*.dll", false),
            ("plugins/**", "plugins/a/*.json", true),
            ("plugins/a/", "plugins/a/*.dll", true),
            ("plugins/*/x.json", "plugins/a/", true),
            ("plugins/*", "plugins/a/data.json", true),
            ("plugins/*.dll", "plugins/a/", false),
        ];
        for (a, b, expected) in cases {
            assert_eq!(parse(a).conflicts_with(&parse(b)), expected, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_literal_prefix() {
        assert_eq!(literal_prefix("plugins/a/*.dll"), PathBuf::from("plugins/a"));
        assert_eq!(literal_prefix("plugins/*/x.json"), PathBuf::from("plugins"));
        assert_eq!(literal_prefix("*.log"), PathBuf::new());
    }

    #[test]
    fn test_remove_each_kind() {
        let dir = tempdir().unwrap();
        let ws = dir.path();
        fs::create_dir_all(ws.join("plugins/a/lang")).unwrap();
        fs::write(ws.join("plugins/a/lang/en.json"), "{}").unwrap();
        fs::write(ws.join("plugins/a.dll"), "").unwrap();
        fs::write(ws.join("plugins/b.log"), "").unwrap();
        fs::write(ws.join("plugins/c.log"), "").unwrap();
        fs::write(ws.join("plugins/keep.txt"), "").unwrap();

        let runtime = RealRuntime;
        parse("plugins/a/").remove(&runtime, ws).unwrap();
        parse("plugins/a.dll").remove(&runtime, ws).unwrap();
        parse("plugins/*.log").remove(&runtime, ws).unwrap();
        parse("plugins/missing.dll").remove(&runtime, ws).unwrap();
        parse("nowhere/*.dll").remove(&runtime, ws).unwrap();

        assert!(!ws.join("plugins/a").exists());
        assert!(!ws.join("plugins/a.dll").exists());
        assert!(!ws.join("plugins/b.log").exists());
        assert!(!ws.join("plugins/c.log").exists());
        assert!(ws.join("plugins/keep.txt").exists());
    }

    #[test]
    fn test_glob_removal_skips_state_dir() {
        let dir = tempdir().unwrap();
        let ws = dir.path();
        fs::create_dir_all(ws.join(".lip/records")).unwrap();
        fs::write(ws.join(".lip/records/a.json"), "{}").unwrap();
        fs::write(ws.join("a.txt"), "").unwrap();

        parse("*").remove(&RealRuntime, ws).unwrap();

        assert!(ws.join(".lip/records/a.json").exists());
        assert!(!ws.join("a.txt").exists());
    }
}
