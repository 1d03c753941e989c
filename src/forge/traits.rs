//! Traits related to remote git forges
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{
    Result,
    forge::{
        config::RemoteConfig,
        request::{
            CommitComparison, CompareCommitsRequest, CreateReleaseRequest,
            ForgeCommit, ForgeRelease, ForgeTag, ListCommitsRequest,
            ListTagsRequest, ReleaseAsset, UpdateReleaseRequest,
            UploadAssetRequest, UploadResult,
        },
    },
};

/// Release, commit, tag and asset operations the orchestrator needs from a
/// hosting service. Lookups return `Ok(None)` for missing resources and
/// reserve `Err` for transport or API failures.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Forge {
    fn remote_config(&self) -> RemoteConfig;
    async fn get_release_by_tag(&self, tag: &str)
    -> Result<Option<ForgeRelease>>;
    async fn get_latest_release(&self) -> Result<Option<ForgeRelease>>;
    async fn get_commit_sha(&self, reference: &str) -> Result<String>;
    async fn list_commits(
        &self,
        req: ListCommitsRequest,
    ) -> Result<Vec<ForgeCommit>>;
    async fn compare_commits(
        &self,
        req: CompareCommitsRequest,
    ) -> Result<CommitComparison>;
    async fn list_tags(&self, req: ListTagsRequest) -> Result<Vec<ForgeTag>>;
    async fn create_release(
        &self,
        req: CreateReleaseRequest,
    ) -> Result<ForgeRelease>;
    async fn update_release(
        &self,
        req: UpdateReleaseRequest,
    ) -> Result<ForgeRelease>;
    async fn delete_release(&self, release_id: u64) -> Result<()>;
    async fn list_release_assets(
        &self,
        release_id: u64,
    ) -> Result<Vec<ReleaseAsset>>;
    async fn upload_asset(&self, req: UploadAssetRequest)
    -> Result<UploadResult>;
    async fn delete_asset(&self, asset_id: u64) -> Result<()>;
}
