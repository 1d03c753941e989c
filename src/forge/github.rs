//! Implements the Forge trait for Github
use async_trait::async_trait;
use log::*;
use octocrab::{Octocrab, models::repos::Release};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{
    ReleaseError, Result,
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

#[derive(Debug, Deserialize)]
struct GithubCommitAuthor {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubCommitDetail {
    pub message: String,
    pub author: Option<GithubCommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    pub login: String,
}

#[derive(Debug, Deserialize)]
struct GithubCommit {
    pub sha: String,
    pub commit: GithubCommitDetail,
    pub author: Option<GithubUser>,
}

impl From<GithubCommit> for ForgeCommit {
    fn from(value: GithubCommit) -> Self {
        let author_name = value
            .commit
            .author
            .and_then(|a| a.name)
            .or(value.author.map(|u| u.login))
            .unwrap_or_default();

        Self {
            sha: value.sha,
            message: value.commit.message,
            author_name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GithubComparison {
    pub total_commits: usize,
    pub commits: Vec<GithubCommit>,
}

#[derive(Debug, Serialize)]
struct PageQueryParams {
    pub per_page: u8,
    pub page: u32,
}

#[derive(Debug, Serialize)]
struct CommitsQueryParams<'a> {
    pub sha: &'a str,
    pub per_page: u8,
    pub page: u32,
}

/// Whether an octocrab error is an API response with the given status.
fn has_status(err: &octocrab::Error, status: StatusCode) -> bool {
    matches!(
        err,
        octocrab::Error::GitHub { source, .. } if source.status_code == status
    )
}

fn to_forge_release(release: Release) -> ForgeRelease {
    ForgeRelease {
        id: release.id.0,
        tag: release.tag_name,
        name: release.name,
        html_url: release.html_url.to_string(),
        draft: release.draft,
        prerelease: release.prerelease,
        assets: release
            .assets
            .into_iter()
            .map(|a| ReleaseAsset {
                id: a.id.0,
                name: a.name,
            })
            .collect(),
    }
}

/// GitHub forge implementation using Octocrab for API interactions with
/// releases, release assets, commits and tags.
pub struct Github {
    config: RemoteConfig,
    base_uri: String,
    instance: Octocrab,
}

impl Github {
    /// Create GitHub client with personal access token authentication and API
    /// base URL configuration.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let base_uri = config.api_base_url.trim_end_matches('/').to_string();
        let builder = Octocrab::builder()
            .personal_token(config.token.clone())
            .base_uri(base_uri.clone())?;
        let instance = builder.build()?;

        Ok(Self {
            config,
            base_uri,
            instance,
        })
    }
}

#[async_trait]
impl Forge for Github {
    fn remote_config(&self) -> RemoteConfig {
        self.config.clone()
    }

    async fn get_release_by_tag(
        &self,
        tag: &str,
    ) -> Result<Option<ForgeRelease>> {
        let result = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .releases()
            .get_by_tag(tag)
            .await;

        match result {
            Ok(release) => Ok(Some(to_forge_release(release))),
            Err(err) if has_status(&err, StatusCode::NOT_FOUND) => {
                info!("no release found for tag: {tag}");
                Ok(None)
            }
            Err(err) => {
                error!("error getting release for tag {tag}: {err}");
                Err(err.into())
            }
        }
    }

    async fn get_latest_release(&self) -> Result<Option<ForgeRelease>> {
        let result = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .releases()
            .get_latest()
            .await;

        match result {
            Ok(release) => Ok(Some(to_forge_release(release))),
            Err(err) if has_status(&err, StatusCode::NOT_FOUND) => {
                info!("no published releases found for {}", self.config.path);
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn get_commit_sha(&self, reference: &str) -> Result<String> {
        let endpoint = format!(
            "{}/repos/{}/{}/commits/{}",
            self.base_uri, self.config.owner, self.config.repo, reference
        );

        let result: std::result::Result<GithubCommit, octocrab::Error> =
            self.instance.get(endpoint, None::<&()>).await;

        match result {
            Ok(commit) => Ok(commit.sha),
            Err(err)
                if has_status(&err, StatusCode::NOT_FOUND)
                    || has_status(&err, StatusCode::UNPROCESSABLE_ENTITY) =>
            {
                Err(ReleaseError::forge(format!(
                    "unable to resolve reference '{reference}' to a commit"
                )))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn list_commits(
        &self,
        req: ListCommitsRequest,
    ) -> Result<Vec<ForgeCommit>> {
        let endpoint = format!(
            "{}/repos/{}/{}/commits",
            self.base_uri, self.config.owner, self.config.repo
        );

        let params = CommitsQueryParams {
            sha: &req.sha,
            per_page: req.per_page,
            page: req.page,
        };

        debug!("listing commits: {:?}", params);

        let commits: Vec<GithubCommit> =
            self.instance.get(endpoint, Some(&params)).await?;

        Ok(commits.into_iter().map(ForgeCommit::from).collect())
    }

    async fn compare_commits(
        &self,
        req: CompareCommitsRequest,
    ) -> Result<CommitComparison> {
        let endpoint = format!(
            "{}/repos/{}/{}/compare/{}...{}",
            self.base_uri,
            self.config.owner,
            self.config.repo,
            req.base,
            req.head
        );

        let params = PageQueryParams {
            per_page: req.per_page,
            page: req.page,
        };

        let comparison: GithubComparison =
            self.instance.get(endpoint, Some(&params)).await?;

        Ok(CommitComparison {
            total_commits: comparison.total_commits,
            commits: comparison
                .commits
                .into_iter()
                .map(ForgeCommit::from)
                .collect(),
        })
    }

    async fn list_tags(&self, req: ListTagsRequest) -> Result<Vec<ForgeTag>> {
        let page = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .list_tags()
            .per_page(req.per_page)
            .page(req.page)
            .send()
            .await?;

        Ok(page
            .items
            .into_iter()
            .map(|t| ForgeTag {
                name: t.name,
                sha: t.commit.sha,
            })
            .collect())
    }

    async fn create_release(
        &self,
        req: CreateReleaseRequest,
    ) -> Result<ForgeRelease> {
        let repos = self.instance.repos(&self.config.owner, &self.config.repo);
        let releases = repos.releases();

        let mut builder = releases
            .create(&req.tag)
            .target_commitish(&req.target)
            .draft(req.draft)
            .prerelease(req.prerelease);

        if let Some(title) = req.title.as_deref() {
            builder = builder.name(title);
        }

        if let Some(notes) = req.notes.as_deref() {
            builder = builder.body(notes);
        }

        let release = builder.send().await?;

        info!("created release {} (id: {})", release.tag_name, release.id.0);

        Ok(to_forge_release(release))
    }

    async fn update_release(
        &self,
        req: UpdateReleaseRequest,
    ) -> Result<ForgeRelease> {
        let repos = self.instance.repos(&self.config.owner, &self.config.repo);
        let releases = repos.releases();

        let mut builder = releases
            .update(req.release_id)
            .tag_name(&req.tag)
            .target_commitish(&req.target)
            .draft(req.draft)
            .prerelease(req.prerelease);

        if let Some(title) = req.title.as_deref() {
            builder = builder.name(title);
        }

        if let Some(notes) = req.notes.as_deref() {
            builder = builder.body(notes);
        }

        let release = builder.send().await?;

        info!("updated release {} (id: {})", release.tag_name, release.id.0);

        Ok(to_forge_release(release))
    }

    async fn delete_release(&self, release_id: u64) -> Result<()> {
        self.instance
            .repos(&self.config.owner, &self.config.repo)
            .releases()
            .delete(release_id)
            .await?;

        Ok(())
    }

    async fn list_release_assets(
        &self,
        release_id: u64,
    ) -> Result<Vec<ReleaseAsset>> {
        let page = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .releases()
            .assets(release_id)
            .per_page(100)
            .send()
            .await?;

        Ok(page
            .items
            .into_iter()
            .map(|a| ReleaseAsset {
                id: a.id.0,
                name: a.name,
            })
            .collect())
    }

    async fn upload_asset(
        &self,
        req: UploadAssetRequest,
    ) -> Result<UploadResult> {
        // octocrab does not URL-encode asset names before building the
        // upload URI
        let encoded_name = url::form_urlencoded::byte_serialize(
            req.name.as_bytes(),
        )
        .collect::<String>();

        let repos = self.instance.repos(&self.config.owner, &self.config.repo);
        let releases = repos.releases();

        let result = releases
            .upload_asset(req.release_id, &encoded_name, req.content)
            .send()
            .await;

        match result {
            Ok(asset) => Ok(UploadResult::Uploaded(ReleaseAsset {
                id: asset.id.0,
                name: asset.name,
            })),
            Err(err) if has_status(&err, StatusCode::UNPROCESSABLE_ENTITY) => {
                warn!(
                    "asset {} already exists on release {}",
                    req.name, req.release_id
                );
                Ok(UploadResult::NameConflict)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_asset(&self, asset_id: u64) -> Result<()> {
        self.instance
            .repos(&self.config.owner, &self.config.repo)
            .release_assets()
            .delete(asset_id)
            .await?;

        Ok(())
    }
}
