//! Release lookup by tag and tag resolution for the create action.
use log::*;
use std::rc::Rc;

use crate::{
    Result,
    forge::{
        config::DEFAULT_PAGE_SIZE,
        manager::ForgeManager,
        request::{ForgeRelease, ListTagsRequest},
    },
};

/// How the tag for a new release was decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagResolution {
    /// Tag was supplied by the caller.
    Explicit(String),
    /// An existing tag already points at the target commit.
    Derived(String),
    /// No tag was supplied and none points at the target commit.
    NotFound,
}

impl TagResolution {
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Explicit(tag) | Self::Derived(tag) => Some(tag),
            Self::NotFound => None,
        }
    }
}

pub struct ReleaseLookup {
    forge: Rc<ForgeManager>,
}

impl ReleaseLookup {
    pub fn new(forge: Rc<ForgeManager>) -> Self {
        Self { forge }
    }

    pub async fn find_by_tag(&self, tag: &str) -> Result<Option<ForgeRelease>> {
        let release = self.forge.get_release_by_tag(tag).await?;

        match &release {
            Some(r) => debug!("found release {} for tag {tag}", r.id),
            None => debug!("no release found for tag {tag}"),
        }

        Ok(release)
    }

    /// Use the explicit tag when given, otherwise the first repository tag
    /// pointing at the commit `target` resolves to.
    pub async fn resolve_tag(
        &self,
        explicit: Option<&str>,
        target: &str,
    ) -> Result<TagResolution> {
        if let Some(tag) = explicit {
            return Ok(TagResolution::Explicit(tag.to_string()));
        }

        let target_sha = self.forge.get_commit_sha(target).await?;
        info!("searching for a tag pointing at {target} ({target_sha})");

        let per_page = DEFAULT_PAGE_SIZE;
        let mut page = 1;

        loop {
            let tags = self
                .forge
                .list_tags(ListTagsRequest { page, per_page })
                .await?;

            let page_len = tags.len();

            if let Some(tag) = tags.into_iter().find(|t| t.sha == target_sha) {
                info!("derived tag {} from target {target}", tag.name);
                return Ok(TagResolution::Derived(tag.name));
            }

            if page_len < usize::from(per_page) {
                return Ok(TagResolution::NotFound);
            }

            page += 1;
        }
    }
}
