mod cli;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use watchlist_sync::{
    config::Config, HttpWatchlistService, JsonFileStore, NewEntry, Outcome, SharedAuth, SyncMode,
    WatchlistState, WatchlistStore,
};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let auth = SharedAuth::new();
    if let Some(user_id) = &config.user_id {
        auth.login(user_id.clone());
    }

    let remote = HttpWatchlistService::from_config(&config)?;
    let local = JsonFileStore::new(config.watchlist_path.clone());
    let store = WatchlistStore::new(Arc::new(remote), Arc::new(local), Arc::new(auth));

    match cli.command {
        Commands::Sync => {
            if store.fetch_remote().await == Outcome::Skipped {
                anyhow::bail!("USER_ID is not set, nothing to sync with");
            }
        }
        Commands::List => {
            store.ensure_synced().await;
        }
        Commands::Add {
            movie_id,
            title,
            poster,
            overview,
            year,
            release_date,
        } => {
            if store.ensure_synced().await == Outcome::Failed {
                anyhow::bail!(store.error().unwrap_or_default());
            }

            let entry = NewEntry {
                movie_id: movie_id.into(),
                title,
                poster,
                overview,
                year,
                release_date,
            };
            let outcome = store.add(entry).settled().await;
            tracing::debug!(?outcome, "Add settled");
        }
        Commands::Remove { movie_id } => {
            if store.ensure_synced().await == Outcome::Failed {
                anyhow::bail!(store.error().unwrap_or_default());
            }

            let outcome = store.remove(movie_id).settled().await;
            tracing::debug!(?outcome, "Remove settled");
        }
    }

    if let Some(error) = store.error() {
        anyhow::bail!(error);
    }

    print_watchlist(&store.snapshot());
    Ok(())
}

fn print_watchlist(state: &WatchlistState) {
    if state.is_empty() {
        println!("No movies in watchlist yet.");
        return;
    }

    for entry in &state.items {
        match &entry.year {
            Some(year) => println!("{:>10}  {} ({})", entry.movie_id, entry.title, year),
            None => println!("{:>10}  {}", entry.movie_id, entry.title),
        }
    }

    let mode = match state.sync_mode {
        SyncMode::Local => "stored locally",
        SyncMode::Backend => "synced",
    };
    println!("{} movie(s), {}", state.len(), mode);
}
