//! Expansion of asset glob patterns into the files to upload.
use glob::{MatchOptions, Pattern};
use log::*;
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use crate::{ReleaseError, Result};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Local file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFile {
    pub path: PathBuf,
    /// Base name used as the remote asset name.
    pub name: String,
}

struct Candidate {
    file: AssetFile,
    canonical: PathBuf,
}

/// Expand `patterns` relative to `base_dir`.
///
/// Patterns are applied in order. One starting with `!` drops the files
/// gathered so far that it matches; later patterns can add them back.
/// Results hold no directories and list each file once even when several
/// patterns (or a symlink and its target) reach it.
pub fn resolve_assets(
    patterns: &[String],
    base_dir: &Path,
) -> Result<Vec<AssetFile>> {
    let base_dir = fs::canonicalize(base_dir)?;
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut candidates: Vec<Candidate> = vec![];

    for pattern in patterns.iter().map(|p| p.trim()).filter(|p| !p.is_empty())
    {
        match pattern.strip_prefix('!') {
            Some(exclude) => {
                let exclude = exclude.trim();
                let compiled = Pattern::new(&anchor(exclude, &base_dir))
                    .map_err(|source| ReleaseError::InvalidPattern {
                        pattern: exclude.to_string(),
                        source,
                    })?;
                candidates.retain(|c| {
                    let excluded = [&c.file.path, &c.canonical]
                        .iter()
                        .any(|p| compiled.matches_path_with(p, MATCH_OPTIONS));
                    if excluded {
                        debug!("excluding asset {}", c.file.path.display());
                        seen.remove(&c.canonical);
                    }
                    !excluded
                });
            }
            None => {
                let matches = expand(pattern, &base_dir)?;

                if matches.is_empty() {
                    warn!("no files matched asset pattern: {pattern}");
                }

                for candidate in matches {
                    if seen.insert(candidate.canonical.clone()) {
                        candidates.push(candidate);
                    }
                }
            }
        }
    }

    let files = candidates
        .into_iter()
        .map(|c| c.file)
        .collect::<Vec<AssetFile>>();

    info!("resolved {} asset file(s)", files.len());

    Ok(files)
}

/// Files matched by one include pattern, in glob order.
fn expand(pattern: &str, base_dir: &Path) -> Result<Vec<Candidate>> {
    let full = anchor(pattern, base_dir);
    let paths = glob::glob_with(&full, MATCH_OPTIONS).map_err(|source| {
        ReleaseError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        }
    })?;

    let mut matches = vec![];

    for entry in paths {
        let path = match entry {
            Ok(path) => path,
            Err(err) => {
                warn!("skipping unreadable path for {pattern}: {err}");
                continue;
            }
        };

        if path.is_dir() {
            continue;
        }

        let Some(name) = path.file_name() else {
            continue;
        };
        let name = name.to_string_lossy().to_string();
        let canonical = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());

        matches.push(Candidate {
            file: AssetFile { path, name },
            canonical,
        });
    }

    Ok(matches)
}

fn anchor(pattern: &str, base_dir: &Path) -> String {
    if Path::new(pattern).is_absolute() {
        return pattern.to_string();
    }

    let base = Pattern::escape(&base_dir.to_string_lossy());
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);

    format!("{}/{}", base.trim_end_matches('/'), pattern)
}
