use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::time::Duration;
use tmr_grading::data::save_picks_to_csv;
use tmr_grading::odds::american_odds_to_probability;
use tmr_grading::{
    compute_leaderboard, compute_stats, compute_stats_by_sport, settle, CachedScores, Config,
    GameScoreProvider, GradingScheduler, JsonPickStore, Outcome, PickStore, ScoresApiClient,
};

#[derive(Parser)]
#[command(name = "tmr-grading", about = "Grade TrustMyRecord picks and report stats")]
struct Cli {
    /// Pick store JSON file (overrides PICKS_FILE)
    #[arg(long, global = true)]
    picks_file: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one grading pass over all pending picks
    Grade {
        /// Read final scores from a JSON file instead of the scoreboard API
        #[arg(long)]
        scores_file: Option<String>,
    },
    /// Grade on a fixed interval until Ctrl-C
    Watch {
        #[arg(long)]
        interval_secs: Option<u64>,
        #[arg(long)]
        scores_file: Option<String>,
    },
    /// Show a user's record
    Stats {
        #[arg(long)]
        user: String,
        #[arg(long)]
        by_sport: bool,
    },
    /// Rank every user by profit
    Leaderboard {
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Settle a pick by hand (props, disputed games)
    Settle {
        #[arg(long)]
        pick: String,
        #[arg(long)]
        outcome: Outcome,
    },
    /// Export a user's picks to CSV
    Export {
        #[arg(long)]
        user: String,
        #[arg(long)]
        out: String,
    },
}

fn score_provider(config: &Config, scores_file: Option<String>) -> Box<dyn GameScoreProvider> {
    match scores_file {
        Some(path) => Box::new(CachedScores::new(path)),
        None => Box::new(ScoresApiClient::new(
            config.scores_api_base_url.clone(),
            config.scores_api_key.clone(),
        )),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(picks_file) = cli.picks_file {
        config.picks_file = picks_file;
    }

    let store = JsonPickStore::open(&config.picks_file)
        .await
        .with_context(|| format!("Failed to open pick store {}", config.picks_file))?;

    match cli.command {
        Command::Grade { scores_file } => {
            let scheduler = GradingScheduler::new(
                score_provider(&config, scores_file),
                store,
                config.profit_convention,
                config.lookback_days,
            );
            match scheduler.run_pass().await.context("Grading pass failed")? {
                Some(report) => {
                    println!("{}", report.format());
                    for pick_id in &report.needs_review {
                        println!("  needs review: {}", pick_id);
                    }
                    for sport in &report.failed_sports {
                        println!("  score lookup failed: {}", sport);
                    }
                }
                None => println!("A grading pass is already running."),
            }
        }
        Command::Watch {
            interval_secs,
            scores_file,
        } => {
            let interval = interval_secs.unwrap_or(config.interval_secs);
            println!("Grading every {}s, press Ctrl+C to stop\n", interval);
            let scheduler = GradingScheduler::new(
                score_provider(&config, scores_file),
                store,
                config.profit_convention,
                config.lookback_days,
            );
            scheduler.run_periodic(Duration::from_secs(interval)).await?;
        }
        Command::Stats { user, by_sport } => {
            let picks = store.user_picks(&user).await?;
            if picks.is_empty() {
                println!("No picks found for {}.", user);
                return Ok(());
            }
            let stats = compute_stats(&picks);
            println!("{}: {}", user, stats.format());

            // Break-even win rate at the user's average price
            let decided: Vec<i32> = picks
                .iter()
                .filter(|p| p.status.is_graded())
                .map(|p| p.odds)
                .collect();
            if !decided.is_empty() {
                let break_even = decided
                    .iter()
                    .map(|&o| american_odds_to_probability(o))
                    .sum::<f64>()
                    / decided.len() as f64;
                println!("Break-even win rate at these prices: {:.1}%", break_even * 100.0);
            }

            if by_sport {
                println!();
                for (sport, stats) in compute_stats_by_sport(&picks) {
                    println!("{:>6}: {}", sport.key(), stats.format());
                }
            }
        }
        Command::Leaderboard { top } => {
            let picks = store.all_picks().await?;
            let board = compute_leaderboard(&picks);
            if board.is_empty() {
                println!("No picks recorded yet.");
            }
            for (i, (user, stats)) in board.iter().take(top).enumerate() {
                println!("{}. {} | {}", i + 1, user, stats.format());
            }
        }
        Command::Settle { pick, outcome } => {
            let found = store.get_pick(&pick).await?;
            let result = settle(&found, outcome, config.profit_convention)
                .with_context(|| format!("Cannot settle {}", pick))?;
            if store
                .record_grade(&pick, &result, chrono::Utc::now())
                .await?
            {
                println!("{} settled as {} ({:+.2} units)", pick, result.status, result.profit);
            } else {
                println!("{} was already graded as {}; nothing changed.", pick, found.status);
            }
        }
        Command::Export { user, out } => {
            let picks = store.user_picks(&user).await?;
            let stats = compute_stats(&picks);
            save_picks_to_csv(&picks, &stats, &out)
                .with_context(|| format!("Failed to write {}", out))?;
            println!("Saved {} picks to {}", picks.len(), out);
        }
    }

    Ok(())
}
