//! Interface to the remote source-hosting service.
//!
//! Provides token-based authentication, release and release asset
//! management, and commit and tag listing through a common trait.

/// Configuration and authentication for the forge connection.
pub mod config;

/// Construction of the forge from remote configuration.
pub mod factory;

/// GitHub API client implementation for GitHub.com and Enterprise.
pub mod github;

/// Wrapper adding dry-run guards and logging around a forge.
pub mod manager;

/// Request and response types shared by forge implementations.
pub mod request;

/// Common trait for forge platform abstraction.
pub mod traits;
