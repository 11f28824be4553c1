use crate::error::{GradingError, Result};
use crate::models::{Bet, CompletedGame, GradedResult, Outcome, Pick, TeamSide, TotalSide};
use crate::utils::line_parser::parse_line;
use crate::utils::odds::{risk_amount, validate_american_odds};
use serde::{Deserialize, Serialize};

/// How a losing pick is charged.
///
/// `units` on a pick is the amount the user wants to WIN. A win always pays
/// `+units`. The conventions only differ on losses:
/// - `ToWin`: a loss costs `units` (symmetric win/loss, the historical
///   TrustMyRecord figures).
/// - `Risk`: a loss costs the stake needed to win `units` at the pick's odds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfitConvention {
    #[default]
    ToWin,
    Risk,
}

impl std::str::FromStr for ProfitConvention {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "to_win" | "towin" | "to-win" => Ok(ProfitConvention::ToWin),
            "risk" => Ok(ProfitConvention::Risk),
            other => Err(format!("unknown profit convention '{}'", other)),
        }
    }
}

/// Grade a pending pick against a game.
///
/// Returns `Ok(None)` when the game cannot be graded yet (not final, or a
/// score is missing). That is not a failure; try again on the next pass.
pub fn grade(
    pick: &Pick,
    game: &CompletedGame,
    convention: ProfitConvention,
) -> Result<Option<GradedResult>> {
    if pick.status.is_graded() {
        return Err(GradingError::AlreadyGraded {
            pick_id: pick.id.clone(),
            status: pick.status,
        });
    }
    if pick.game_id != game.id {
        return Err(GradingError::GameMismatch {
            pick_id: pick.id.clone(),
            expected: pick.game_id.clone(),
            actual: game.id.clone(),
        });
    }
    validate_wager(pick)?;

    let Some((home, away)) = game.final_scores() else {
        return Ok(None);
    };

    let outcome = determine_outcome(pick, home as f64, away as f64)?;
    settle(pick, outcome, convention).map(Some)
}

/// Odds must be valid American odds and units a positive amount
fn validate_wager(pick: &Pick) -> Result<()> {
    validate_american_odds(pick.odds)?;
    if !(pick.units.is_finite() && pick.units > 0.0) {
        return Err(GradingError::InvalidUnits {
            pick_id: pick.id.clone(),
            units: pick.units,
        });
    }
    Ok(())
}

/// Decide win/loss/push from final scores
fn determine_outcome(pick: &Pick, home: f64, away: f64) -> Result<Outcome> {
    match &pick.bet {
        Bet::Moneyline { pick_side } => {
            let (ours, theirs) = sided(*pick_side, home, away);
            Ok(compare(ours, theirs))
        }
        Bet::Spread { pick_side, line } => {
            let line = resolve_line(pick, *line)?;
            let (ours, theirs) = sided(*pick_side, home, away);
            Ok(compare(ours + line, theirs))
        }
        Bet::Total { pick_side, line } => {
            let line = resolve_line(pick, *line)?;
            let total = home + away;
            Ok(match pick_side {
                TotalSide::Over => compare(total, line),
                TotalSide::Under => compare(line, total),
            })
        }
        Bet::Prop { .. } => Err(GradingError::ManualResolutionRequired {
            pick_id: pick.id.clone(),
        }),
    }
}

fn sided(side: TeamSide, home: f64, away: f64) -> (f64, f64) {
    match side {
        TeamSide::Home => (home, away),
        TeamSide::Away => (away, home),
    }
}

fn compare(ours: f64, theirs: f64) -> Outcome {
    if ours > theirs {
        Outcome::Win
    } else if ours < theirs {
        Outcome::Loss
    } else {
        Outcome::Push
    }
}

fn resolve_line(pick: &Pick, stored: Option<f64>) -> Result<f64> {
    stored
        .or_else(|| parse_line(&pick.selection_text))
        .ok_or_else(|| GradingError::UnparseableLine {
            pick_id: pick.id.clone(),
            selection: pick.selection_text.clone(),
        })
}

/// Turn an outcome into a result with profit.
/// Also the entry point for manually settled picks (props, disputes).
pub fn settle(
    pick: &Pick,
    outcome: Outcome,
    convention: ProfitConvention,
) -> Result<GradedResult> {
    validate_wager(pick)?;
    let profit = match outcome {
        Outcome::Push => 0.0,
        Outcome::Win => pick.units,
        Outcome::Loss => match convention {
            ProfitConvention::ToWin => -pick.units,
            ProfitConvention::Risk => -risk_amount(pick.odds, pick.units),
        },
    };
    Ok(GradedResult {
        status: outcome.into(),
        profit,
    })
}
