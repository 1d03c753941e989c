//! Common test utilities for orchestrator tests.

use std::{cell::RefCell, path::Path, rc::Rc};

use crate::{
    forge::{
        config::RemoteConfig,
        manager::ForgeManager,
        request::{ForgeRelease, ReleaseAsset},
        traits::MockForge,
    },
    orchestrator::{
        Orchestrator, OrchestratorParams, OrchestratorSettings, RunOutcome,
        reporter::{ReleaseReporter, ReleaseStep},
        request::ReleaseAction,
        uploader::AssetOutcome,
    },
};

pub const TEST_REPO: &str = "acme/tool";
pub const RELEASE_LINK_BASE_URL: &str = "https://github.com/acme/tool/releases/tag";

/// Reporter that records every event as a line of text.
#[derive(Default)]
pub struct RecordingReporter {
    pub events: RefCell<Vec<String>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| e.strip_prefix("warning: ").map(|w| w.to_string()))
            .collect()
    }

    fn push(&self, event: String) {
        self.events.borrow_mut().push(event);
    }
}

impl ReleaseReporter for RecordingReporter {
    fn run_started(&self, action: ReleaseAction, repository: &str) {
        self.push(format!("started: {action} {repository}"));
    }

    fn step_selected(&self, step: ReleaseStep, tag: &str) {
        self.push(format!("step: {step:?} {tag}"));
    }

    fn asset_outcome(&self, name: &str, outcome: &AssetOutcome) {
        self.push(format!("asset: {name} {outcome:?}"));
    }

    fn warning(&self, message: &str) {
        self.push(format!("warning: {message}"));
    }

    fn run_finished(&self, outcome: &RunOutcome) {
        let kind = match outcome {
            RunOutcome::Deleted { .. } => "deleted",
            RunOutcome::Created(_) => "created",
            RunOutcome::Updated(_) => "updated",
            RunOutcome::NoEligibleTag { .. } => "no-eligible-tag",
        };
        self.push(format!("finished: {kind}"));
    }
}

/// MockForge with the remote configuration every ForgeManager reads.
pub fn mock_forge() -> MockForge {
    mock_forge_with_dry_run(false)
}

pub fn mock_forge_with_dry_run(dry_run: bool) -> MockForge {
    let mut mock_forge = MockForge::new();
    mock_forge.expect_remote_config().returning(move || RemoteConfig {
        owner: "acme".into(),
        repo: "tool".into(),
        path: TEST_REPO.into(),
        release_link_base_url: RELEASE_LINK_BASE_URL.into(),
        dry_run,
        ..Default::default()
    });
    mock_forge
}

/// Creates a test Orchestrator with the provided mock forge, resolving
/// assets from `base_dir`.
pub fn create_test_orchestrator(
    mock_forge: MockForge,
    base_dir: &Path,
) -> (Orchestrator, Rc<RecordingReporter>) {
    let reporter = Rc::new(RecordingReporter::default());
    let forge = Rc::new(ForgeManager::new(Box::new(mock_forge)));

    let orchestrator = Orchestrator::new(OrchestratorParams {
        forge,
        reporter: Rc::clone(&reporter) as Rc<dyn ReleaseReporter>,
        settings: OrchestratorSettings {
            base_dir: base_dir.to_path_buf(),
            ..Default::default()
        },
    });

    (orchestrator, reporter)
}

pub fn release(id: u64, tag: &str) -> ForgeRelease {
    ForgeRelease {
        id,
        tag: tag.into(),
        name: Some(tag.into()),
        html_url: format!("{RELEASE_LINK_BASE_URL}/{tag}"),
        draft: false,
        prerelease: false,
        assets: vec![],
    }
}

pub fn asset(id: u64, name: &str) -> ReleaseAsset {
    ReleaseAsset {
        id,
        name: name.into(),
    }
}

/// Write `relative` under `dir` with its own path as content.
pub fn write_file(dir: &Path, relative: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, relative).unwrap();
}
