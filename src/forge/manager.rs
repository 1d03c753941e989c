//! Manager that wraps forge implementations
use log::*;

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
        traits::Forge,
    },
};

pub struct ForgeManager {
    forge: Box<dyn Forge>,
    remote_config: RemoteConfig,
}

impl ForgeManager {
    /// Wrap a forge implementation, caching its remote configuration so
    /// mutating calls can honor dry-run mode.
    pub fn new(forge: Box<dyn Forge>) -> Self {
        let remote_config = forge.remote_config();
        Self {
            forge,
            remote_config,
        }
    }

    pub fn remote_config(&self) -> RemoteConfig {
        self.remote_config.clone()
    }

    pub fn dry_run(&self) -> bool {
        self.remote_config.dry_run
    }

    pub async fn get_release_by_tag(
        &self,
        tag: &str,
    ) -> Result<Option<ForgeRelease>> {
        debug!("looking up release for tag: {tag}");
        self.forge.get_release_by_tag(tag).await
    }

    pub async fn get_latest_release(&self) -> Result<Option<ForgeRelease>> {
        self.forge.get_latest_release().await
    }

    pub async fn get_commit_sha(&self, reference: &str) -> Result<String> {
        debug!("resolving reference to commit: {reference}");
        self.forge.get_commit_sha(reference).await
    }

    pub async fn list_commits(
        &self,
        req: ListCommitsRequest,
    ) -> Result<Vec<ForgeCommit>> {
        debug!(
            "getting commits from sha {}: page {}, per_page {}",
            req.sha, req.page, req.per_page
        );
        self.forge.list_commits(req).await
    }

    pub async fn compare_commits(
        &self,
        req: CompareCommitsRequest,
    ) -> Result<CommitComparison> {
        debug!(
            "comparing commits {}...{}: page {}, per_page {}",
            req.base, req.head, req.page, req.per_page
        );
        self.forge.compare_commits(req).await
    }

    pub async fn list_tags(&self, req: ListTagsRequest) -> Result<Vec<ForgeTag>> {
        self.forge.list_tags(req).await
    }

    pub async fn list_release_assets(
        &self,
        release_id: u64,
    ) -> Result<Vec<ReleaseAsset>> {
        self.forge.list_release_assets(release_id).await
    }

    pub async fn create_release(
        &self,
        req: CreateReleaseRequest,
    ) -> Result<ForgeRelease> {
        if self.remote_config.dry_run {
            warn!("dry_run: would create release: req: {:#?}", req);
            return Ok(ForgeRelease {
                id: 0,
                tag: req.tag.clone(),
                name: req.title,
                html_url: format!(
                    "{}/{}",
                    self.remote_config.release_link_base_url, req.tag
                ),
                draft: req.draft,
                prerelease: req.prerelease,
                assets: vec![],
            });
        }

        self.forge.create_release(req).await
    }

    pub async fn update_release(
        &self,
        req: UpdateReleaseRequest,
    ) -> Result<ForgeRelease> {
        if self.remote_config.dry_run {
            warn!("dry_run: would update release: req: {:#?}", req);
            return Ok(ForgeRelease {
                id: req.release_id,
                tag: req.tag.clone(),
                name: req.title,
                html_url: format!(
                    "{}/{}",
                    self.remote_config.release_link_base_url, req.tag
                ),
                draft: req.draft,
                prerelease: req.prerelease,
                assets: vec![],
            });
        }

        self.forge.update_release(req).await
    }

    pub async fn delete_release(&self, release_id: u64) -> Result<()> {
        if self.remote_config.dry_run {
            warn!("dry_run: would delete release: id: {release_id}");
            return Ok(());
        }

        self.forge.delete_release(release_id).await
    }

    pub async fn upload_asset(
        &self,
        req: UploadAssetRequest,
    ) -> Result<UploadResult> {
        if self.remote_config.dry_run {
            warn!(
                "dry_run: would upload asset: name: {}, release: {}, size: {} bytes",
                req.name,
                req.release_id,
                req.content.len()
            );
            return Ok(UploadResult::Uploaded(ReleaseAsset {
                id: 0,
                name: req.name,
            }));
        }

        self.forge.upload_asset(req).await
    }

    pub async fn delete_asset(&self, asset_id: u64) -> Result<()> {
        if self.remote_config.dry_run {
            warn!("dry_run: would delete asset: id: {asset_id}");
            return Ok(());
        }

        self.forge.delete_asset(asset_id).await
    }
}
