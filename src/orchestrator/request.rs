//! Validated description of the release operation requested for one run.
use derive_builder::Builder;
use std::{fmt, path::PathBuf, str::FromStr};

use crate::{
    ReleaseError, Result,
    orchestrator::{notes::NoteSource, uploader::AssetUploadMode},
};

/// Remote operation performed on the release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseAction {
    Create,
    Edit,
    Delete,
}

impl FromStr for ReleaseAction {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "edit" => Ok(Self::Edit),
            "delete" => Ok(Self::Delete),
            _ => Err(ReleaseError::invalid_input(format!(
                "invalid action '{s}': expected one of create, edit, delete"
            ))),
        }
    }
}

impl fmt::Display for ReleaseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(setter(into), build_fn(private, name = "_build"))]
pub struct ReleaseRequest {
    pub action: ReleaseAction,
    /// Repository in "owner/name" form.
    pub repository: String,
    #[builder(default)]
    pub tag: Option<String>,
    /// Ref or commit-ish the release is anchored to.
    #[builder(default)]
    pub target: Option<String>,
    #[builder(default)]
    pub title: Option<String>,
    #[builder(default)]
    pub draft: bool,
    #[builder(default)]
    pub prerelease: bool,
    #[builder(default)]
    pub asset_patterns: Vec<String>,
    #[builder(default)]
    pub note_source: NoteSource,
    #[builder(default)]
    pub note_file: Option<PathBuf>,
    #[builder(default)]
    pub note_text: Option<String>,
    #[builder(default)]
    pub include_changelog: bool,
    #[builder(default)]
    pub asset_upload_mode: AssetUploadMode,
}

impl ReleaseRequestBuilder {
    /// Build the request, treating blank strings as absent and enforcing
    /// the fields each action requires.
    pub fn build(&self) -> Result<ReleaseRequest> {
        let mut request = self._build().map_err(|e| {
            ReleaseError::invalid_input(format!(
                "Failed to build release request: {}",
                e
            ))
        })?;

        request.tag = non_blank(request.tag);
        request.target = non_blank(request.target);
        request.title = non_blank(request.title);

        request.validate()?;

        Ok(request)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ReleaseRequest {
    pub fn builder() -> ReleaseRequestBuilder {
        ReleaseRequestBuilder::default()
    }

    fn validate(&self) -> Result<()> {
        if self.repository.trim().is_empty() {
            return Err(ReleaseError::invalid_input("repository is required"));
        }

        match self.action {
            ReleaseAction::Delete => {
                self.required_tag()?;
            }
            ReleaseAction::Edit => {
                self.required_tag()?;
                self.required_target()?;
            }
            ReleaseAction::Create => {
                self.required_target()?;
            }
        }

        if self.action != ReleaseAction::Delete
            && self.note_source.reads_file()
            && self.note_file.is_none()
        {
            return Err(ReleaseError::invalid_input(
                "release notes file is required for the selected notes source",
            ));
        }

        for pattern in self.asset_patterns.iter() {
            let pattern = pattern.trim();
            let pattern = pattern.strip_prefix('!').unwrap_or(pattern);
            glob::Pattern::new(pattern.trim()).map_err(|source| {
                ReleaseError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                }
            })?;
        }

        Ok(())
    }

    pub fn required_tag(&self) -> Result<&str> {
        self.tag.as_deref().ok_or_else(|| {
            ReleaseError::invalid_input(format!(
                "tag is required for the {} action",
                self.action
            ))
        })
    }

    pub fn required_target(&self) -> Result<&str> {
        self.target.as_deref().ok_or_else(|| {
            ReleaseError::invalid_input(format!(
                "target is required for the {} action",
                self.action
            ))
        })
    }
}
