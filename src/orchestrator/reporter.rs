//! Progress reporting for a release run.
use log::*;
use std::fmt;

use crate::orchestrator::{
    RunOutcome, request::ReleaseAction, uploader::AssetOutcome,
};

/// Branch the orchestrator took for the requested action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseStep {
    Deleting,
    Creating,
    Editing,
    /// Edit found no release for the tag and creates one instead.
    EditFallbackToCreate,
}

impl fmt::Display for ReleaseStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            Self::Deleting => "deleting release",
            Self::Creating => "creating release",
            Self::Editing => "editing release",
            Self::EditFallbackToCreate => {
                "no release to edit: creating release"
            }
        };
        write!(f, "{step}")
    }
}

/// Receives progress events as a run advances.
pub trait ReleaseReporter {
    fn run_started(&self, action: ReleaseAction, repository: &str);
    fn step_selected(&self, step: ReleaseStep, tag: &str);
    fn asset_outcome(&self, name: &str, outcome: &AssetOutcome);
    fn warning(&self, message: &str);
    fn run_finished(&self, outcome: &RunOutcome);
}

/// Reporter writing every event to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ReleaseReporter for LogReporter {
    fn run_started(&self, action: ReleaseAction, repository: &str) {
        info!("starting {action} release run for {repository}");
    }

    fn step_selected(&self, step: ReleaseStep, tag: &str) {
        info!("{step}: {tag}");
    }

    fn asset_outcome(&self, name: &str, outcome: &AssetOutcome) {
        match outcome {
            AssetOutcome::Uploaded => info!("uploaded asset: {name}"),
            AssetOutcome::Replaced => {
                info!("replaced existing asset: {name}")
            }
            AssetOutcome::Failed(reason) => {
                error!("failed to upload asset {name}: {reason}")
            }
        }
    }

    fn warning(&self, message: &str) {
        warn!("{message}");
    }

    fn run_finished(&self, outcome: &RunOutcome) {
        match outcome {
            RunOutcome::Deleted { tag } => info!("deleted release {tag}"),
            RunOutcome::Created(published) => {
                info!("created release: {}", published.release.html_url)
            }
            RunOutcome::Updated(published) => {
                info!("updated release: {}", published.release.html_url)
            }
            RunOutcome::NoEligibleTag { target } => {
                warn!("no tag found for target {target}: no release created")
            }
        }
    }
}
