//! Command execution for release-steward.
//!
//! A run parses the CLI arguments into a validated release request, builds
//! the forge connection and hands both to the orchestrator. Dry-run mode is
//! handled by the forge manager, so commands never branch on it.

/// Create, edit or delete a release.
pub mod release;
