//! Release lifecycle command implementation.
use log::*;
use std::rc::Rc;

use crate::{
    Result, cli,
    forge::factory::ForgeFactory,
    orchestrator::{Orchestrator, RunOutcome},
};

/// Execute the requested release action against the configured repository.
pub async fn execute(args: &cli::Args) -> Result<RunOutcome> {
    let action = args.release_action()?;
    debug!("requested action: {action}");

    let remote = args.get_remote()?;
    let request = args.release_request(&remote)?;

    if remote.dry_run {
        warn!("dry run enabled: no changes will be made to {}", remote.path);
    }

    let forge = Rc::new(ForgeFactory::create(&remote)?);

    let orchestrator = Orchestrator::builder()
        .forge(forge)
        .settings(args.orchestrator_settings())
        .build()?;

    orchestrator.run(&request).await
}
