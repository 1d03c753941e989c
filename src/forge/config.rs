//! Configuration for the remote forge connection.
use secrecy::SecretString;

/// Default page size for paginated commit and tag queries
pub const DEFAULT_PAGE_SIZE: u8 = 100;
/// Default host used when a repository is given as `owner/name`.
pub const DEFAULT_GITHUB_HOST: &str = "github.com";

/// Remote repository connection configuration for authenticating and
/// interacting with the forge.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Remote forge host (e.g., "github.com").
    pub host: String,
    /// URL scheme (http or https).
    pub scheme: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Full repository path ("owner/name").
    pub path: String,
    /// Access token for authentication.
    pub token: SecretString,
    /// Base URL of the REST API.
    pub api_base_url: String,
    /// Base URL for release links.
    pub release_link_base_url: String,
    /// Log mutating calls instead of executing them.
    pub dry_run: bool,
}

impl RemoteConfig {
    /// REST API base for a host: api.github.com for the public instance,
    /// `/api/v3` for GitHub Enterprise servers.
    pub fn default_api_base_url(scheme: &str, host: &str) -> String {
        if host == DEFAULT_GITHUB_HOST {
            format!("{scheme}://api.{host}")
        } else {
            format!("{scheme}://{host}/api/v3")
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: "".to_string(),
            scheme: "".to_string(),
            owner: "".to_string(),
            repo: "".to_string(),
            path: "".to_string(),
            token: SecretString::from("".to_string()),
            api_base_url: "".to_string(),
            release_link_base_url: "".to_string(),
            dry_run: false,
        }
    }
}
