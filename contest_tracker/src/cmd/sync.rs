use crate::{
    cmd::TargetDomain,
    modules::{
        config::SourceConfig,
        services::{self, Stores},
    },
};
use anyhow::{Context, Result};
use clap::Args;

#[derive(Debug, Args)]
pub struct SyncArgs {
    domain: TargetDomain,
}

/// Run one synchronization against the database and exit.
pub async fn run(args: SyncArgs) -> Result<()> {
    tracing::info!("Start to sync {}", args.domain);

    let config = SourceConfig::from_env();
    let stores = Stores::open(false).await?;
    let solution_link_synchronizer = services::solution_link_synchronizer(&config, &stores)?;

    match args.domain {
        TargetDomain::Contests => {
            let synchronizer =
                services::contest_synchronizer(&config, &stores, solution_link_synchronizer)?;
            let report = synchronizer.sync().await.with_context(|| {
                let message = "contest sync failed";
                tracing::error!(message);
                message
            })?;

            tracing::info!(
                "Contest sync finished: {} fetched, {} upserted, {} pruned, failed resources {:?}, {} solution links created",
                report.fetched,
                report.upserted,
                report.pruned,
                report.failed_resources,
                report.solution_links.created
            );
            Ok(())
        }
        TargetDomain::SolutionLinks => {
            let report = solution_link_synchronizer.sync_solution_links().await;

            tracing::info!(
                "Solution link sync finished: processed {:?}, skipped {:?}, failed {:?}",
                report.processed,
                report.skipped,
                report.failed
            );
            Ok(())
        }
    }
}
