use derive_builder::Builder;
use std::{path::PathBuf, rc::Rc};

use crate::{
    ReleaseError, Result,
    forge::{
        manager::ForgeManager,
        request::{CreateReleaseRequest, ForgeRelease, UpdateReleaseRequest},
    },
    orchestrator::{
        assets::resolve_assets,
        changelog::{ChangelogGenerator, DEFAULT_MAX_CHANGELOG_COMMITS},
        lookup::ReleaseLookup,
        reporter::{LogReporter, ReleaseReporter, ReleaseStep},
        request::{ReleaseAction, ReleaseRequest},
        uploader::{
            AssetUploadMode, AssetUploader, ConflictRetryPolicy, UploadReport,
        },
    },
};

pub mod assets;
pub mod changelog;
pub mod lookup;
pub mod notes;
pub mod reporter;
pub mod request;
pub mod uploader;


/// Release created or updated by a run, with the outcome of its uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedRelease {
    pub release: ForgeRelease,
    pub uploads: UploadReport,
    /// Created because an edit found no release for the tag.
    pub from_edit_fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Published(PublishedRelease),
    /// No tag was given and none points at the target.
    NoTagWarning { target: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Deleted { tag: String },
    Created(PublishedRelease),
    Updated(PublishedRelease),
    NoEligibleTag { target: String },
}

impl RunOutcome {
    /// Successful runs that still need the user's attention.
    pub fn is_warning(&self) -> bool {
        match self {
            Self::NoEligibleTag { .. } => true,
            Self::Created(p) | Self::Updated(p) => !p.uploads.is_complete(),
            Self::Deleted { .. } => false,
        }
    }

    pub fn release(&self) -> Option<&ForgeRelease> {
        match self {
            Self::Created(p) | Self::Updated(p) => Some(&p.release),
            Self::Deleted { .. } | Self::NoEligibleTag { .. } => None,
        }
    }
}

/// Local knobs for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// Directory relative asset patterns are resolved from.
    pub base_dir: PathBuf,
    pub max_changelog_commits: usize,
    pub retry_policy: ConflictRetryPolicy,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            max_changelog_commits: DEFAULT_MAX_CHANGELOG_COMMITS,
            retry_policy: ConflictRetryPolicy::default(),
        }
    }
}

fn default_reporter() -> Rc<dyn ReleaseReporter> {
    Rc::new(LogReporter)
}

#[derive(Builder)]
#[builder(setter(into), build_fn(private, name = "_build"))]
pub struct OrchestratorParams {
    pub forge: Rc<ForgeManager>,
    #[builder(default = "default_reporter()")]
    pub reporter: Rc<dyn ReleaseReporter>,
    #[builder(default)]
    pub settings: OrchestratorSettings,
}

impl OrchestratorParamsBuilder {
    pub fn build(&self) -> Result<Orchestrator> {
        let params = self._build().map_err(|e| {
            ReleaseError::invalid_input(format!(
                "Failed to build release orchestrator: {}",
                e
            ))
        })?;
        Ok(Orchestrator::new(params))
    }
}

/// Runs one create, edit or delete against the forge.
pub struct Orchestrator {
    forge: Rc<ForgeManager>,
    reporter: Rc<dyn ReleaseReporter>,
    settings: OrchestratorSettings,
    lookup: ReleaseLookup,
    changelog: ChangelogGenerator,
    uploader: AssetUploader,
}

impl Orchestrator {
    pub fn builder() -> OrchestratorParamsBuilder {
        OrchestratorParamsBuilder::default()
    }

    pub fn new(params: OrchestratorParams) -> Self {
        Self {
            forge: Rc::clone(&params.forge),
            reporter: Rc::clone(&params.reporter),
            lookup: ReleaseLookup::new(Rc::clone(&params.forge)),
            changelog: ChangelogGenerator::new(Rc::clone(&params.forge)),
            uploader: AssetUploader::new(
                Rc::clone(&params.forge),
                Rc::clone(&params.reporter),
                params.settings.retry_policy,
            ),
            settings: params.settings,
        }
    }

    pub async fn run(&self, request: &ReleaseRequest) -> Result<RunOutcome> {
        self.reporter
            .run_started(request.action, &request.repository);

        let outcome = match request.action {
            ReleaseAction::Delete => self.delete(request).await?,
            ReleaseAction::Edit => self.edit(request).await?,
            ReleaseAction::Create => match self.create(request).await? {
                CreateOutcome::Published(published) => {
                    RunOutcome::Created(published)
                }
                CreateOutcome::NoTagWarning { target } => {
                    RunOutcome::NoEligibleTag { target }
                }
            },
        };

        self.reporter.run_finished(&outcome);

        Ok(outcome)
    }

    /// Delete the release for the request's tag. A missing release is an
    /// error and nothing is deleted.
    pub async fn delete(&self, request: &ReleaseRequest) -> Result<RunOutcome> {
        let tag = request.required_tag()?;

        self.reporter.step_selected(ReleaseStep::Deleting, tag);

        let release = self
            .lookup
            .find_by_tag(tag)
            .await?
            .ok_or_else(|| ReleaseError::ReleaseNotFound(tag.to_string()))?;

        self.forge.delete_release(release.id).await?;

        Ok(RunOutcome::Deleted {
            tag: tag.to_string(),
        })
    }

    /// Create a release, deriving the tag from the target when none was
    /// given.
    pub async fn create(
        &self,
        request: &ReleaseRequest,
    ) -> Result<CreateOutcome> {
        let target = request.required_target()?;

        let resolution = self
            .lookup
            .resolve_tag(request.tag.as_deref(), target)
            .await?;

        let Some(tag) = resolution.tag() else {
            self.reporter.warning(&format!(
                "no tag found for target {target}: skipping release creation"
            ));
            return Ok(CreateOutcome::NoTagWarning {
                target: target.to_string(),
            });
        };

        self.reporter.step_selected(ReleaseStep::Creating, tag);

        let notes = self.compose_notes(request, target).await?;
        let published =
            self.publish_new(request, tag, target, notes, false).await?;

        Ok(CreateOutcome::Published(published))
    }

    /// Update the release for the request's tag in place, or create it when
    /// the tag has no release yet.
    pub async fn edit(&self, request: &ReleaseRequest) -> Result<RunOutcome> {
        let tag = request.required_tag()?;
        let target = request.required_target()?;

        let notes = self.compose_notes(request, target).await?;

        let Some(existing) = self.lookup.find_by_tag(tag).await? else {
            self.reporter.warning(&format!(
                "no release found for tag {tag}: creating a new release"
            ));
            self.reporter
                .step_selected(ReleaseStep::EditFallbackToCreate, tag);

            let published =
                self.publish_new(request, tag, target, notes, true).await?;

            return Ok(RunOutcome::Created(published));
        };

        self.reporter.step_selected(ReleaseStep::Editing, tag);

        let release = self
            .forge
            .update_release(UpdateReleaseRequest {
                release_id: existing.id,
                tag: tag.to_string(),
                target: target.to_string(),
                title: request.title.clone(),
                notes,
                draft: request.draft,
                prerelease: request.prerelease,
            })
            .await?;

        if request.asset_upload_mode == AssetUploadMode::Delete {
            self.uploader.delete_existing_assets(release.id).await?;
        }

        let uploads = self.upload_assets(request, release.id).await?;

        Ok(RunOutcome::Updated(PublishedRelease {
            release,
            uploads,
            from_edit_fallback: false,
        }))
    }

    async fn publish_new(
        &self,
        request: &ReleaseRequest,
        tag: &str,
        target: &str,
        notes: Option<String>,
        from_edit_fallback: bool,
    ) -> Result<PublishedRelease> {
        let release = self
            .forge
            .create_release(CreateReleaseRequest {
                tag: tag.to_string(),
                target: target.to_string(),
                title: request.title.clone(),
                notes,
                draft: request.draft,
                prerelease: request.prerelease,
            })
            .await?;

        let uploads = self.upload_assets(request, release.id).await?;

        Ok(PublishedRelease {
            release,
            uploads,
            from_edit_fallback,
        })
    }

    async fn compose_notes(
        &self,
        request: &ReleaseRequest,
        target: &str,
    ) -> Result<Option<String>> {
        let changelog = if request
            .note_source
            .wants_changelog(request.include_changelog)
        {
            self.changelog
                .generate(target, self.settings.max_changelog_commits)
                .await?
        } else {
            String::new()
        };

        notes::compose(
            request.note_source,
            request.note_file.as_deref(),
            request.note_text.as_deref(),
            &changelog,
            request.include_changelog,
        )
        .await
    }

    async fn upload_assets(
        &self,
        request: &ReleaseRequest,
        release_id: u64,
    ) -> Result<UploadReport> {
        if request.asset_patterns.is_empty() {
            return Ok(UploadReport::default());
        }

        let files =
            resolve_assets(&request.asset_patterns, &self.settings.base_dir)?;

        if files.is_empty() {
            self.reporter
                .warning("asset patterns matched no files: nothing uploaded");
            return Ok(UploadReport::default());
        }

        let report = self.uploader.upload(release_id, &files).await;

        if let Err(err) = report.ensure_complete() {
            self.reporter.warning(&err.to_string());
        }

        Ok(report)
    }
}
