//! Changelog generation from the commits between the latest release and the
//! release target.
use log::*;
use std::{cmp, rc::Rc};

use crate::{
    Result,
    forge::{
        config::DEFAULT_PAGE_SIZE,
        manager::ForgeManager,
        request::{CompareCommitsRequest, ForgeCommit, ListCommitsRequest},
    },
};

/// Upper bound on commits included in a generated changelog.
pub const DEFAULT_MAX_CHANGELOG_COMMITS: usize = 250;

const SHORT_SHA_LENGTH: usize = 7;

/// One commit rendered into the changelog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    pub sha: String,
    pub message: String,
    pub author: String,
}

impl From<ForgeCommit> for ChangelogEntry {
    fn from(commit: ForgeCommit) -> Self {
        Self {
            sha: commit.sha,
            message: commit.message,
            author: commit.author_name,
        }
    }
}

impl ChangelogEntry {
    pub fn short_sha(&self) -> &str {
        self.sha.get(..SHORT_SHA_LENGTH).unwrap_or(&self.sha)
    }

    /// First line of the commit message.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or_default().trim()
    }
}

/// Render entries one per line, in the order given.
pub fn format_changelog(entries: &[ChangelogEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("* {} {}", e.short_sha(), e.subject()))
        .collect::<Vec<String>>()
        .join("\n")
}

// page size must stay constant for page numbers to line up
fn page_size(max_commits: usize) -> usize {
    cmp::min(usize::from(DEFAULT_PAGE_SIZE), max_commits)
}

pub struct ChangelogGenerator {
    forge: Rc<ForgeManager>,
}

impl ChangelogGenerator {
    pub fn new(forge: Rc<ForgeManager>) -> Self {
        Self { forge }
    }

    /// Generate changelog text for `target`. Empty text means there is
    /// nothing to report.
    pub async fn generate(
        &self,
        target: &str,
        max_commits: usize,
    ) -> Result<String> {
        let entries = self.collect_entries(target, max_commits).await?;

        info!("generated changelog with {} commit(s)", entries.len());

        Ok(format_changelog(&entries))
    }

    /// Commits reachable from `target` but not from the latest release's
    /// tag, newest first, capped at `max_commits`.
    pub async fn collect_entries(
        &self,
        target: &str,
        max_commits: usize,
    ) -> Result<Vec<ChangelogEntry>> {
        if max_commits == 0 {
            return Ok(vec![]);
        }

        let head_sha = self.forge.get_commit_sha(target).await?;

        let commits = match self.previous_release_sha().await? {
            Some(previous_sha) if previous_sha == head_sha => {
                info!("target {target} is the latest release: no new commits");
                return Ok(vec![]);
            }
            Some(previous_sha) => {
                self.commits_since(&previous_sha, &head_sha, max_commits)
                    .await?
            }
            None => self.history(&head_sha, max_commits).await?,
        };

        Ok(commits.into_iter().map(ChangelogEntry::from).collect())
    }

    /// Newest commits of the `base...head` comparison. The forge pages the
    /// comparison oldest first, so pages are read from the last one back.
    async fn commits_since(
        &self,
        base: &str,
        head: &str,
        max_commits: usize,
    ) -> Result<Vec<ForgeCommit>> {
        let per_page = page_size(max_commits);
        let compare = |page: u32| CompareCommitsRequest {
            base: base.to_string(),
            head: head.to_string(),
            page,
            per_page: per_page as u8,
        };

        let first = self.forge.compare_commits(compare(1)).await?;

        if first.total_commits == 0 {
            return Ok(vec![]);
        }

        let last_page = first.total_commits.div_ceil(per_page) as u32;
        let mut commits: Vec<ForgeCommit> = vec![];

        for page in (2..=last_page).rev() {
            let page = self.forge.compare_commits(compare(page)).await?;
            commits.extend(page.commits.into_iter().rev());

            if commits.len() >= max_commits {
                break;
            }
        }

        if commits.len() < max_commits {
            commits.extend(first.commits.into_iter().rev());
        }

        if commits.len() > max_commits {
            debug!("changelog capped at {max_commits} commits");
            commits.truncate(max_commits);
        }

        Ok(commits)
    }

    /// Full history reachable from `head`, newest first.
    async fn history(
        &self,
        head: &str,
        max_commits: usize,
    ) -> Result<Vec<ForgeCommit>> {
        let per_page = page_size(max_commits);
        let mut commits: Vec<ForgeCommit> = vec![];
        let mut page = 1;

        loop {
            let page_commits = self
                .forge
                .list_commits(ListCommitsRequest {
                    sha: head.to_string(),
                    page,
                    per_page: per_page as u8,
                })
                .await?;

            let page_len = page_commits.len();
            commits.extend(page_commits);

            if commits.len() >= max_commits {
                debug!("changelog capped at {max_commits} commits");
                commits.truncate(max_commits);
                return Ok(commits);
            }

            if page_len < per_page {
                return Ok(commits);
            }

            page += 1;
        }
    }

    async fn previous_release_sha(&self) -> Result<Option<String>> {
        match self.forge.get_latest_release().await? {
            Some(release) => {
                info!("generating changelog since release {}", release.tag);
                let sha = self.forge.get_commit_sha(&release.tag).await?;
                Ok(Some(sha))
            }
            None => {
                info!("no previous release found: using full history");
                Ok(None)
            }
        }
    }
}
