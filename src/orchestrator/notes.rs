//! Release note composition from a notes file, inline text and a generated
//! changelog.
use std::{path::Path, str::FromStr};
use tokio::fs;

use crate::{ReleaseError, Result};

/// Where the release body comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteSource {
    /// No body is sent; the forge default applies.
    #[default]
    None,
    File,
    Inline,
    GenerateOnly,
    FileAndGenerate,
    InlineAndGenerate,
}

impl NoteSource {
    /// Whether the changelog generator has to run for this source.
    pub fn wants_changelog(&self, include_changelog: bool) -> bool {
        match self {
            Self::GenerateOnly => true,
            Self::FileAndGenerate | Self::InlineAndGenerate => include_changelog,
            Self::None | Self::File | Self::Inline => false,
        }
    }

    pub fn reads_file(&self) -> bool {
        matches!(self, Self::File | Self::FileAndGenerate)
    }
}

impl FromStr for NoteSource {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "file" | "filepath" => Ok(Self::File),
            "input" | "inline" => Ok(Self::Inline),
            "generate" | "changelog" => Ok(Self::GenerateOnly),
            "file-and-generate" => Ok(Self::FileAndGenerate),
            "input-and-generate" | "inline-and-generate" => {
                Ok(Self::InlineAndGenerate)
            }
            _ => Err(ReleaseError::invalid_input(format!(
                "invalid release notes source '{s}'"
            ))),
        }
    }
}

/// Compose the release body.
///
/// Only the file sources touch the filesystem; the changelog is passed in
/// already generated. `None` means the body is left to the forge default.
pub async fn compose(
    source: NoteSource,
    file: Option<&Path>,
    inline: Option<&str>,
    changelog: &str,
    include_changelog: bool,
) -> Result<Option<String>> {
    let note = match source {
        NoteSource::None => return Ok(None),
        NoteSource::File => read_notes_file(file).await?,
        NoteSource::Inline => inline.unwrap_or_default().to_string(),
        NoteSource::GenerateOnly => changelog.to_string(),
        NoteSource::FileAndGenerate => {
            let base = read_notes_file(file).await?;
            append_changelog(base, changelog, include_changelog)
        }
        NoteSource::InlineAndGenerate => {
            let base = inline.unwrap_or_default().to_string();
            append_changelog(base, changelog, include_changelog)
        }
    };

    Ok(Some(note))
}

fn append_changelog(
    base: String,
    changelog: &str,
    include_changelog: bool,
) -> String {
    if !include_changelog || changelog.is_empty() {
        return base;
    }

    format!("{base}\n\n{changelog}")
}

async fn read_notes_file(file: Option<&Path>) -> Result<String> {
    let path = file.ok_or_else(|| {
        ReleaseError::invalid_input("release notes file path is required")
    })?;

    log::debug!("reading release notes from {}", path.display());

    fs::read_to_string(path)
        .await
        .map_err(|source| ReleaseError::FileRead {
            path: path.to_path_buf(),
            source,
        })
}
