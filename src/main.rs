use clap::Parser;
use log::*;

use release_steward::{ReleaseError, RunOutcome, cli, command};

fn initialize_logger(debug: bool) -> Result<(), ReleaseError> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("release_steward")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli_args = cli::Args::parse();

    initialize_logger(cli_args.debug)?;

    let outcome = command::release::execute(&cli_args).await?;

    match &outcome {
        RunOutcome::NoEligibleTag { target } => {
            warn!("no release created: no tag points at {target}")
        }
        RunOutcome::Created(published) | RunOutcome::Updated(published)
            if !published.uploads.is_complete() =>
        {
            warn!(
                "release {} published with {} failed asset upload(s): {}",
                published.release.tag,
                published.uploads.failed.len(),
                published.uploads.failed_names().join(", ")
            )
        }
        _ => {}
    }

    Ok(())
}
