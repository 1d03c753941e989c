//! CLI argument parsing and forge configuration.
use clap::Parser;
use color_eyre::eyre::OptionExt;
use git_url_parse::GitUrl;
use regex::Regex;
use secrecy::SecretString;
use std::{env, path::PathBuf, sync::LazyLock};
use url::Url;

use crate::{
    ReleaseError, Result,
    forge::config::{DEFAULT_GITHUB_HOST, RemoteConfig},
    orchestrator::{
        OrchestratorSettings,
        changelog::DEFAULT_MAX_CHANGELOG_COMMITS,
        notes::NoteSource,
        request::{ReleaseAction, ReleaseRequest},
        uploader::{AssetUploadMode, ConflictRetryPolicy},
    },
};

static SHORT_REPO_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?<owner>[\w.-]+)/(?<repo>[\w.-]+?)(\.git)?$").unwrap()
});

/// Create, edit or delete a GitHub release.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long)]
    /// Release action: create, edit or delete (case-insensitive).
    pub action: String,

    #[arg(long, default_value = "")]
    /// GitHub repository as owner/name or https://github.com/owner/name.
    pub github_repo: String,

    #[arg(long, default_value = "")]
    /// GitHub personal access token. Falls back to GITHUB_TOKEN env var.
    pub github_token: String,

    #[arg(long, default_value = "")]
    /// REST API base URL, e.g. https://github.example.com/api/v3.
    pub api_url: String,

    #[arg(long, default_value = "")]
    /// Branch, tag or commit the release points at.
    pub target: String,

    #[arg(long, default_value = "")]
    /// Release tag. Required for edit and delete; derived from the target
    /// for create when omitted.
    pub tag: String,

    #[arg(long, default_value = "")]
    /// Release title. Defaults to the tag on the forge.
    pub title: String,

    #[arg(long, default_value_t = false)]
    /// Save the release as a draft.
    pub draft: bool,

    #[arg(long, default_value_t = false)]
    /// Mark the release as a prerelease.
    pub prerelease: bool,

    #[arg(long)]
    /// Asset glob patterns, newline-delimited or repeated. Prefix a pattern
    /// with ! to exclude matches.
    pub assets: Vec<String>,

    #[arg(long, default_value = "")]
    /// Release notes source: none, file, input, generate,
    /// file-and-generate or input-and-generate.
    pub release_notes_source: String,

    #[arg(long)]
    /// Path of the release notes file.
    pub release_notes_file: Option<PathBuf>,

    #[arg(long, default_value = "")]
    /// Inline release notes.
    pub release_notes: String,

    #[arg(long, default_value_t = false)]
    /// Append a changelog of commits since the latest release.
    pub add_changelog: bool,

    #[arg(long, default_value_t = DEFAULT_MAX_CHANGELOG_COMMITS)]
    /// Maximum number of commits in the changelog.
    pub changelog_commits: usize,

    #[arg(long, default_value = "replace")]
    /// What to do with existing assets when editing: replace or delete.
    pub asset_upload_mode: String,

    #[arg(long)]
    /// Directory relative asset patterns are resolved from. Defaults to
    /// the current directory.
    pub working_dir: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    /// Log mutating API calls instead of executing them.
    pub dry_run: bool,

    #[arg(long, default_value_t = false)]
    /// Enable debug logging.
    pub debug: bool,
}

impl Args {
    /// Asset patterns with multi-line values split and blank lines removed.
    pub fn asset_patterns(&self) -> Vec<String> {
        self.assets
            .iter()
            .flat_map(|value| value.lines())
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(|line| line.to_string())
            .collect()
    }

    /// Validated release request for the repository in `remote`.
    pub fn release_request(
        &self,
        remote: &RemoteConfig,
    ) -> Result<ReleaseRequest> {
        let action = self.release_action()?;

        ReleaseRequest::builder()
            .action(action)
            .repository(remote.path.clone())
            .tag(Some(self.tag.clone()))
            .target(Some(self.target.clone()))
            .title(Some(self.title.clone()))
            .draft(self.draft)
            .prerelease(self.prerelease)
            .asset_patterns(self.asset_patterns())
            .note_source(self.release_notes_source.parse::<NoteSource>()?)
            .note_file(self.release_notes_file.clone())
            .note_text(non_empty(&self.release_notes))
            .include_changelog(self.add_changelog)
            .asset_upload_mode(
                self.asset_upload_mode.parse::<AssetUploadMode>()?,
            )
            .build()
    }

    pub fn release_action(&self) -> Result<ReleaseAction> {
        self.action.parse::<ReleaseAction>()
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            base_dir: self
                .working_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(".")),
            max_changelog_commits: self.changelog_commits,
            retry_policy: ConflictRetryPolicy::default(),
        }
    }

    /// Configure the remote repository connection from CLI arguments.
    pub fn get_remote(&self) -> Result<RemoteConfig> {
        let repo = self.github_repo.trim();

        if repo.is_empty() {
            return Err(ReleaseError::invalid_input(
                "must configure a github repository",
            ));
        }

        let parsed = if repo.contains("://") {
            parse_repo_url(repo)?
        } else {
            parse_short_repo(repo)?
        };

        let token = resolve_token(&self.github_token, parsed.token)?;

        let api_base_url = if self.api_url.trim().is_empty() {
            RemoteConfig::default_api_base_url(&parsed.scheme, &parsed.host)
        } else {
            let url = Url::parse(self.api_url.trim())?;
            url.as_str().trim_end_matches('/').to_string()
        };

        let release_link_base_url = format!(
            "{}://{}/{}/{}/releases/tag",
            parsed.scheme, parsed.host, parsed.owner, parsed.repo
        );

        Ok(RemoteConfig {
            path: format!("{}/{}", parsed.owner, parsed.repo),
            host: parsed.host,
            scheme: parsed.scheme,
            owner: parsed.owner,
            repo: parsed.repo,
            token,
            api_base_url,
            release_link_base_url,
            dry_run: self.dry_run,
        })
    }
}

struct ParsedRepo {
    host: String,
    scheme: String,
    owner: String,
    repo: String,
    token: Option<String>,
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Validate repository URL uses HTTP or HTTPS scheme.
fn validate_scheme(scheme: git_url_parse::Scheme) -> Result<()> {
    match scheme {
        git_url_parse::Scheme::Http => Ok(()),
        git_url_parse::Scheme::Https => Ok(()),
        _ => Err(ReleaseError::InvalidRemoteUrl(
            "only http and https schemes are supported for repo urls".into(),
        )),
    }
}

fn parse_repo_url(repo: &str) -> Result<ParsedRepo> {
    let parsed = GitUrl::parse(repo)?;

    validate_scheme(parsed.scheme)?;

    let host = parsed
        .host
        .ok_or_eyre("unable to parse host from github repo")?;

    let owner = parsed
        .owner
        .ok_or_eyre("unable to parse owner from github repo")?;

    Ok(ParsedRepo {
        host,
        scheme: parsed.scheme.to_string(),
        owner,
        repo: parsed.name,
        token: parsed.token,
    })
}

fn parse_short_repo(repo: &str) -> Result<ParsedRepo> {
    let captures = SHORT_REPO_REGEX.captures(repo).ok_or_else(|| {
        ReleaseError::invalid_input(format!(
            "invalid repository '{repo}': expected owner/name or a repository url"
        ))
    })?;

    Ok(ParsedRepo {
        host: DEFAULT_GITHUB_HOST.to_string(),
        scheme: "https".to_string(),
        owner: captures["owner"].to_string(),
        repo: captures["repo"].to_string(),
        token: None,
    })
}

/// Token precedence: flag, then URL credentials, then GITHUB_TOKEN.
fn resolve_token(
    flag_token: &str,
    url_token: Option<String>,
) -> Result<SecretString> {
    let mut token = flag_token.to_string();

    if token.is_empty()
        && let Some(parsed_token) = url_token
    {
        token = parsed_token;
    }

    if token.is_empty()
        && let Ok(env_var_token) = env::var("GITHUB_TOKEN")
    {
        token = env_var_token;
    }

    if token.is_empty() {
        return Err(ReleaseError::invalid_input("must set github token"));
    }

    Ok(SecretString::from(token))
}
