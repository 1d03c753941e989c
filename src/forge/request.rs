use bytes::Bytes;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Asset attached to a release on the forge.
pub struct ReleaseAsset {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Normalized release returned from the forge.
pub struct ForgeRelease {
    pub id: u64,
    pub tag: String,
    pub name: Option<String>,
    pub html_url: String,
    pub draft: bool,
    pub prerelease: bool,
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to create a new release.
pub struct CreateReleaseRequest {
    pub tag: String,
    pub target: String,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub draft: bool,
    pub prerelease: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to update an existing release in place.
pub struct UpdateReleaseRequest {
    pub release_id: u64,
    pub tag: String,
    pub target: String,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub draft: bool,
    pub prerelease: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request for one page of commits reachable from `sha`, newest first.
pub struct ListCommitsRequest {
    pub sha: String,
    pub page: u32,
    pub per_page: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request for one page of the commits reachable from `head` but not from
/// `base`.
pub struct CompareCommitsRequest {
    pub base: String,
    pub head: String,
    pub page: u32,
    pub per_page: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One page of a comparison between two commits.
pub struct CommitComparison {
    /// Size of the whole comparison, across all pages.
    pub total_commits: usize,
    /// Oldest first.
    pub commits: Vec<ForgeCommit>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request for one page of repository tags.
pub struct ListTagsRequest {
    pub page: u32,
    pub per_page: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents a normalized commit returned from the forge
pub struct ForgeCommit {
    pub sha: String,
    pub message: String,
    pub author_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Tag name and the commit it points at.
pub struct ForgeTag {
    pub name: String,
    pub sha: String,
}

#[derive(Debug, Clone)]
/// Request to upload one file to a release.
pub struct UploadAssetRequest {
    pub release_id: u64,
    pub name: String,
    pub content: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of an upload attempt that reached the forge.
pub enum UploadResult {
    Uploaded(ReleaseAsset),
    /// An asset with the same name already exists on the release.
    NameConflict,
}
