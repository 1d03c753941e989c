//! Uploading resolved asset files to a release.
use bytes::Bytes;
use log::*;
use std::{collections::HashSet, fmt, rc::Rc, str::FromStr};
use tokio::fs;

use crate::{
    ReleaseError, Result,
    forge::{
        manager::ForgeManager,
        request::{UploadAssetRequest, UploadResult},
    },
    orchestrator::{assets::AssetFile, reporter::ReleaseReporter},
};

/// Times an upload is retried after a name conflict.
pub const DEFAULT_CONFLICT_RETRIES: u32 = 1;

/// What happens to assets already attached to a release being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssetUploadMode {
    /// Keep existing assets; same-named ones are replaced on upload.
    #[default]
    Replace,
    /// Remove every existing asset before uploading.
    Delete,
}

impl FromStr for AssetUploadMode {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "delete" => Ok(Self::Delete),
            _ => Err(ReleaseError::invalid_input(format!(
                "invalid asset upload mode '{s}': expected replace or delete"
            ))),
        }
    }
}

impl fmt::Display for AssetUploadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => write!(f, "replace"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictRetryPolicy {
    pub max_retries: u32,
}

impl Default for ConflictRetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_CONFLICT_RETRIES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    Uploaded,
    /// Uploaded after removing a same-named asset.
    Replaced,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFailure {
    pub name: String,
    pub reason: String,
}

/// Per-file results of one upload batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub uploaded: Vec<String>,
    pub failed: Vec<AssetFailure>,
}

impl UploadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_names(&self) -> Vec<String> {
        self.failed.iter().map(|f| f.name.clone()).collect()
    }

    /// Turn any per-file failure into an [`ReleaseError::AssetUpload`].
    pub fn ensure_complete(&self) -> Result<()> {
        if self.is_complete() {
            return Ok(());
        }

        Err(ReleaseError::AssetUpload {
            failed: self.failed_names(),
        })
    }

    fn record(&mut self, name: &str, outcome: &AssetOutcome) {
        match outcome {
            AssetOutcome::Uploaded | AssetOutcome::Replaced => {
                self.uploaded.push(name.to_string())
            }
            AssetOutcome::Failed(reason) => self.failed.push(AssetFailure {
                name: name.to_string(),
                reason: reason.clone(),
            }),
        }
    }
}

pub struct AssetUploader {
    forge: Rc<ForgeManager>,
    reporter: Rc<dyn ReleaseReporter>,
    policy: ConflictRetryPolicy,
}

impl AssetUploader {
    pub fn new(
        forge: Rc<ForgeManager>,
        reporter: Rc<dyn ReleaseReporter>,
        policy: ConflictRetryPolicy,
    ) -> Self {
        Self {
            forge,
            reporter,
            policy,
        }
    }

    /// Upload `files` one at a time. A failed file is recorded and the
    /// batch moves on to the next one.
    pub async fn upload(
        &self,
        release_id: u64,
        files: &[AssetFile],
    ) -> UploadReport {
        let mut report = UploadReport::default();
        let mut names: HashSet<&str> = HashSet::new();

        for file in files.iter() {
            let outcome = if !names.insert(file.name.as_str()) {
                AssetOutcome::Failed(format!(
                    "another file named {} is already part of this upload: {}",
                    file.name,
                    file.path.display()
                ))
            } else {
                match self.upload_file(release_id, file).await {
                    Ok(outcome) => outcome,
                    Err(err) => AssetOutcome::Failed(err.to_string()),
                }
            };

            self.reporter.asset_outcome(&file.name, &outcome);
            report.record(&file.name, &outcome);
        }

        report
    }

    /// Remove every asset currently attached to the release.
    pub async fn delete_existing_assets(&self, release_id: u64) -> Result<()> {
        let assets = self.forge.list_release_assets(release_id).await?;

        info!("deleting {} existing asset(s)", assets.len());

        for asset in assets {
            debug!("deleting asset {} ({})", asset.name, asset.id);
            self.forge.delete_asset(asset.id).await?;
        }

        Ok(())
    }

    async fn upload_file(
        &self,
        release_id: u64,
        file: &AssetFile,
    ) -> Result<AssetOutcome> {
        let content = fs::read(&file.path).await.map_err(|source| {
            ReleaseError::FileRead {
                path: file.path.clone(),
                source,
            }
        })?;
        let content = Bytes::from(content);

        let mut retries = 0;

        loop {
            let result = self
                .forge
                .upload_asset(UploadAssetRequest {
                    release_id,
                    name: file.name.clone(),
                    content: content.clone(),
                })
                .await?;

            match result {
                UploadResult::Uploaded(_) if retries == 0 => {
                    return Ok(AssetOutcome::Uploaded);
                }
                UploadResult::Uploaded(_) => {
                    return Ok(AssetOutcome::Replaced);
                }
                UploadResult::NameConflict
                    if retries >= self.policy.max_retries =>
                {
                    return Err(ReleaseError::forge(format!(
                        "asset {} still conflicts after {retries} retry attempt(s)",
                        file.name
                    )));
                }
                UploadResult::NameConflict => {
                    retries += 1;
                    warn!(
                        "asset {} already exists: replacing it (attempt {retries})",
                        file.name
                    );
                    self.remove_existing(release_id, &file.name).await?;
                }
            }
        }
    }

    async fn remove_existing(&self, release_id: u64, name: &str) -> Result<()> {
        let assets = self.forge.list_release_assets(release_id).await?;

        let mut removed = 0;

        for asset in assets.into_iter().filter(|a| a.name == name) {
            self.forge.delete_asset(asset.id).await?;
            removed += 1;
        }

        if removed == 0 {
            debug!("no existing asset named {name} to remove");
        }

        Ok(())
    }
}
