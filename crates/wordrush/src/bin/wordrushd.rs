//! The wordrush server daemon.
//!
//! ```text
//! wordrushd --lexicon words.txt --bind 0.0.0.0:8080
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use wordrush::prelude::*;

/// Realtime multiplayer word game server.
#[derive(Debug, Parser)]
#[command(name = "wordrushd", version, about)]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Word list file, one word per line.
    #[arg(long)]
    lexicon: PathBuf,

    /// Lives each player starts a game with.
    #[arg(long, default_value_t = 2)]
    lives: u8,

    /// Players required before a game can start.
    #[arg(long, default_value_t = 2)]
    min_players: usize,

    /// Distinct words a letter sequence must appear in before it can be
    /// dealt as a challenge.
    #[arg(long, default_value_t = 100)]
    min_sequence_words: usize,
}

#[tokio::main]
async fn main() -> Result<(), WordrushError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let lexicon = Lexicon::load(
        &args.lexicon,
        LexiconConfig {
            min_occurrences: args.min_sequence_words,
            ..LexiconConfig::default()
        },
    )?;

    let server = WordrushServer::builder()
        .bind(&args.bind)
        .game_config(GameConfig {
            starting_lives: args.lives,
            min_players: args.min_players,
        })
        .build(Arc::new(lexicon))
        .await?;

    server.run().await
}
