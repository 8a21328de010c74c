use clap::Parser;
use luogu_stats::config::{load_roster, Cli, Command, FetchArgs, ReportArgs};
use luogu_stats::domain::model::DateBoundary;
use luogu_stats::utils::logger;
use luogu_stats::{
    aggregate, LocalStorage, RecordFetcher, RecordStore, ReportWriter, SessionContext, Settings,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::info!("Starting luogu-stats");

    let settings = Settings::load(cli.settings.as_deref())?;
    if cli.verbose {
        tracing::debug!(?settings, "run settings");
    }

    match cli.command {
        Command::Fetch(args) => run_fetch(args, &settings).await,
        Command::Report(args) => run_report(args, &settings).await,
    }
}

async fn run_fetch(args: FetchArgs, settings: &Settings) -> anyhow::Result<()> {
    let FetchArgs {
        roster,
        client_id,
        session_uid,
        since,
    } = args;

    let roster = load_roster(&roster)?;
    // A malformed boundary only costs the filter, not the run.
    let boundary = match since.as_deref() {
        Some(input) => match DateBoundary::parse(input) {
            Ok(boundary) => {
                tracing::info!(since = input, "excluding records before boundary");
                Some(boundary)
            }
            Err(e) => {
                tracing::warn!(error = %e, "ignoring invalid date boundary");
                None
            }
        },
        None => None,
    };

    // The session lives only for this phase; dropped with the fetcher.
    let session = SessionContext::new(client_id, session_uid)?;
    let fetcher = RecordFetcher::new(&settings.base_url, session, settings.retry_policy())?;
    let store = RecordStore::new(LocalStorage::new(settings.records_dir.clone()));

    let outcomes = fetcher.fetch_roster(&roster, boundary.as_ref()).await;

    let mut saved = 0usize;
    let mut failed = 0usize;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(set) => {
                store.save(set).await?;
                saved += 1;
            }
            Err(_) => failed += 1,
        }
    }

    tracing::info!(saved = saved, failed = failed, "fetch phase complete");
    if failed > 0 {
        tracing::warn!(
            failed = failed,
            "some users contributed no records; the report will omit them"
        );
    }
    Ok(())
}

async fn run_report(args: ReportArgs, settings: &Settings) -> anyhow::Result<()> {
    let roster = load_roster(&args.roster)?;

    let store = RecordStore::new(LocalStorage::new(settings.records_dir.clone()));
    let sets = store.load_roster(&roster).await?;

    let (summary, detail) = aggregate(&sets);

    let writer = ReportWriter::new(LocalStorage::new(settings.report_dir.clone()));
    writer.write(&summary, &detail).await?;

    tracing::info!(
        users = summary.len(),
        problems = detail.len(),
        dir = %settings.report_dir,
        "report complete"
    );
    Ok(())
}
