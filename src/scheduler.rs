//! Batch grading passes.
//!
//! A pass loads every pending pick, groups them by sport, fetches final
//! scores once per sport and grades what it can. Only one pass runs at a
//! time; a trigger that arrives while a pass is in flight is dropped.

use crate::api::scores_api::GameScoreProvider;
use crate::error::{GradingError, Result};
use crate::models::{CompletedGame, Pick, PickStatus, Sport};
use crate::store::PickStore;
use crate::utils::grader::{grade, ProfitConvention};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// What happened during one pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
    pub pending: usize,
    pub graded: usize,
    pub wins: usize,
    pub losses: usize,
    pub pushes: usize,
    /// Game not found, not final, or missing scores
    pub deferred: usize,
    /// Needs a human: unparseable line, prop bet, bad odds
    pub needs_review: Vec<String>,
    pub failed_sports: Vec<Sport>,
}

impl PassReport {
    pub fn format(&self) -> String {
        format!(
            "{} pending | {} graded ({}W-{}L-{}P) | {} deferred | {} need review | {} sports failed",
            self.pending,
            self.graded,
            self.wins,
            self.losses,
            self.pushes,
            self.deferred,
            self.needs_review.len(),
            self.failed_sports.len()
        )
    }
}

/// Clears the in-flight flag when a pass ends, including on error
struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag.clone()))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct GradingScheduler<P, S> {
    provider: P,
    store: S,
    convention: ProfitConvention,
    lookback_days: u32,
    running: Arc<AtomicBool>,
}

impl<P, S> GradingScheduler<P, S>
where
    P: GameScoreProvider,
    S: PickStore,
{
    pub fn new(provider: P, store: S, convention: ProfitConvention, lookback_days: u32) -> Self {
        Self {
            provider,
            store,
            convention,
            lookback_days,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run one pass. Returns `Ok(None)` if another pass is already running.
    pub async fn run_pass(&self) -> Result<Option<PassReport>> {
        let Some(_guard) = InFlight::acquire(&self.running) else {
            info!("Grading pass already in flight, skipping trigger");
            return Ok(None);
        };

        let pending = self.store.pending_picks().await?;
        let mut report = PassReport {
            pending: pending.len(),
            ..PassReport::default()
        };

        let mut by_sport: BTreeMap<Sport, Vec<Pick>> = BTreeMap::new();
        for pick in pending {
            by_sport.entry(pick.sport).or_default().push(pick);
        }

        for (sport, picks) in by_sport {
            let games = match self
                .provider
                .fetch_completed_games(sport, self.lookback_days)
                .await
            {
                Ok(games) => games,
                Err(e) => {
                    warn!(%sport, error = %e, "Failed to fetch scores, leaving picks pending");
                    report.failed_sports.push(sport);
                    report.deferred += picks.len();
                    continue;
                }
            };

            let games: HashMap<&str, &CompletedGame> =
                games.iter().map(|g| (g.id.as_str(), g)).collect();
            for pick in &picks {
                self.grade_pick(pick, games.get(pick.game_id.as_str()).copied(), &mut report)
                    .await?;
            }
        }

        info!(
            pending = report.pending,
            graded = report.graded,
            deferred = report.deferred,
            review = report.needs_review.len(),
            "Grading pass complete"
        );
        Ok(Some(report))
    }

    async fn grade_pick(
        &self,
        pick: &Pick,
        game: Option<&CompletedGame>,
        report: &mut PassReport,
    ) -> Result<()> {
        let Some(game) = game else {
            debug!(pick_id = %pick.id, game_id = %pick.game_id, "No final score yet");
            report.deferred += 1;
            return Ok(());
        };

        let result = match grade(pick, game, self.convention) {
            Ok(Some(result)) => result,
            Ok(None) => {
                debug!(pick_id = %pick.id, game_id = %game.id, "Scores unavailable, deferring");
                report.deferred += 1;
                return Ok(());
            }
            Err(GradingError::AlreadyGraded { .. }) => return Ok(()),
            Err(e @ GradingError::ManualResolutionRequired { .. }) => {
                debug!(pick_id = %pick.id, "{}", e);
                report.needs_review.push(pick.id.clone());
                return Ok(());
            }
            Err(e) => {
                warn!(pick_id = %pick.id, selection = %pick.selection_text, "Skipping pick for manual review: {}", e);
                report.needs_review.push(pick.id.clone());
                return Ok(());
            }
        };

        match self.store.record_grade(&pick.id, &result, Utc::now()).await {
            Ok(true) => {
                report.graded += 1;
                match result.status {
                    PickStatus::Win => report.wins += 1,
                    PickStatus::Loss => report.losses += 1,
                    PickStatus::Push => report.pushes += 1,
                    PickStatus::Pending => {}
                }
                Ok(())
            }
            Ok(false) => {
                debug!(pick_id = %pick.id, "Pick graded elsewhere, not re-applying");
                Ok(())
            }
            Err(e) => {
                error!(pick_id = %pick.id, error = %e, "Failed to persist grade");
                Err(e)
            }
        }
    }

    /// Run passes on a fixed interval until Ctrl-C.
    /// A tick that lands during a running pass is skipped.
    pub async fn run_periodic(&self, interval: Duration) -> Result<()> {
        self.run_until(interval, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run passes on a fixed interval until `shutdown` resolves. Shutdown is
    /// also honoured mid-pass; the abandoned pass leaves its remaining picks
    /// pending and releases the in-flight guard.
    pub async fn run_until<F>(&self, interval: Duration, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = &mut shutdown => break,
            }
            tokio::select! {
                result = self.run_pass() => match result {
                    Ok(Some(report)) => info!("{}", report.format()),
                    Ok(None) => {}
                    Err(e) => error!(error = %e, "Grading pass failed"),
                },
                _ = &mut shutdown => break,
            }
        }
        info!("Shutting down grading scheduler");
        Ok(())
    }
}
