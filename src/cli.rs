use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "watchlist")]
#[command(about = "Keep a movie watchlist locally or in sync with your account")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the watchlist
    List,
    /// Add a movie
    Add {
        /// Catalog id of the movie
        movie_id: String,

        /// Movie title
        #[arg(long)]
        title: String,

        /// Poster URL or catalog poster path (e.g. /abc.jpg)
        #[arg(long)]
        poster: Option<String>,

        /// Short synopsis
        #[arg(long)]
        overview: Option<String>,

        /// Release year; derived from --release-date when omitted
        #[arg(long)]
        year: Option<String>,

        /// Release date as YYYY-MM-DD
        #[arg(long)]
        release_date: Option<String>,
    },
    /// Remove a movie
    Remove {
        /// Catalog id of the movie
        movie_id: String,
    },
    /// Fetch the watchlist from the service
    Sync,
}
