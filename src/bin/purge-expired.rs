/// Delete announcements that are no longer current.
/// Run periodically (e.g., via cron job: 0 3 * * * /app/purge-expired)
///
/// Usage: purge-expired [--before ISO_TIMESTAMP] [--dry-run]

use clap::Parser;

use announcements_api::{
    db::{self, announcements::PgAnnouncementStore},
    services::clock::{iso_timestamp, Clock, SystemClock},
    store::AnnouncementStore,
};

#[derive(Parser)]
#[command(name = "purge-expired", about = "Purge expired announcements from the database")]
struct Args {
    /// Cutoff; announcements expiring at or before it are removed (default: now, UTC)
    #[arg(long)]
    before: Option<String>,

    /// Report how many would be removed without deleting anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("Missing required env var: DATABASE_URL"))?;
    let pool = db::create_pool(&database_url, 5).await?;
    let store = PgAnnouncementStore::new(pool);

    let before = args
        .before
        .unwrap_or_else(|| iso_timestamp(SystemClock.now()));

    if args.dry_run {
        // Expired is the exact complement of current at the same cutoff.
        let total = store.count().await?;
        let current = store.find_current(&before).await?.len() as u64;
        tracing::info!(
            "Dry run: {} announcement(s) expired at or before {}",
            total.saturating_sub(current),
            before
        );
        return Ok(());
    }

    let removed = store.purge_expired(&before).await?;
    tracing::info!("Purged {} announcement(s) expired at or before {}", removed, before);

    Ok(())
}
