use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Leagues we can pull final scores for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Nfl,
    Nba,
    Mlb,
    Nhl,
    Ncaaf,
    Ncaab,
    Mls,
}

impl Sport {
    pub const ALL: [Sport; 7] = [
        Sport::Nfl,
        Sport::Nba,
        Sport::Mlb,
        Sport::Nhl,
        Sport::Ncaaf,
        Sport::Ncaab,
        Sport::Mls,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Sport::Nfl => "nfl",
            Sport::Nba => "nba",
            Sport::Mlb => "mlb",
            Sport::Nhl => "nhl",
            Sport::Ncaaf => "ncaaf",
            Sport::Ncaab => "ncaab",
            Sport::Mls => "mls",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Home,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalSide {
    Over,
    Under,
}

/// The wager itself. Each variant carries only the fields it needs.
///
/// `line` is optional on spread and total bets: older picks only stored the
/// line inside the free-text selection (e.g. "Chiefs -7.5").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "bet_type", rename_all = "lowercase")]
pub enum Bet {
    Moneyline {
        pick_side: TeamSide,
    },
    Spread {
        pick_side: TeamSide,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line: Option<f64>,
    },
    Total {
        pick_side: TotalSide,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line: Option<f64>,
    },
    Prop {
        #[serde(default)]
        description: String,
    },
}

impl Bet {
    pub fn kind(&self) -> &'static str {
        match self {
            Bet::Moneyline { .. } => "moneyline",
            Bet::Spread { .. } => "spread",
            Bet::Total { .. } => "total",
            Bet::Prop { .. } => "prop",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickStatus {
    #[default]
    Pending,
    Win,
    Loss,
    Push,
}

impl PickStatus {
    pub fn is_graded(&self) -> bool {
        !matches!(self, PickStatus::Pending)
    }
}

impl fmt::Display for PickStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PickStatus::Pending => "pending",
            PickStatus::Win => "win",
            PickStatus::Loss => "loss",
            PickStatus::Push => "push",
        };
        f.write_str(s)
    }
}

/// Final result of a graded wager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Push,
}

impl From<Outcome> for PickStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Win => PickStatus::Win,
            Outcome::Loss => PickStatus::Loss,
            Outcome::Push => PickStatus::Push,
        }
    }
}

impl std::str::FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "win" | "w" => Ok(Outcome::Win),
            "loss" | "l" => Ok(Outcome::Loss),
            "push" | "p" => Ok(Outcome::Push),
            other => Err(format!("unknown outcome '{}'", other)),
        }
    }
}

/// A single prediction a user has logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pick {
    pub id: String,
    pub user_id: String,
    pub sport: Sport,
    pub game_id: String,
    #[serde(flatten)]
    pub bet: Bet,
    #[serde(default)]
    pub selection_text: String,
    pub odds: i32, // American odds format (e.g., -110, +150)
    pub units: f64,
    #[serde(default)]
    pub status: PickStatus,
    #[serde(default)]
    pub profit: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub graded_at: Option<DateTime<Utc>>,
}

impl Pick {
    /// Apply a grading result. Only a pending pick can move; anything else
    /// is left untouched and `false` is returned.
    pub fn apply_grade(&mut self, result: &GradedResult, graded_at: DateTime<Utc>) -> bool {
        if self.status.is_graded() {
            return false;
        }
        self.status = result.status;
        self.profit = result.profit;
        self.graded_at = Some(graded_at);
        true
    }
}

/// A game as reported by a score provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedGame {
    pub id: String,
    pub sport: Sport,
    pub home_team_name: String,
    pub away_team_name: String,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub completed: bool,
}

impl CompletedGame {
    /// Both final scores, if the game is over and they are known
    pub fn final_scores(&self) -> Option<(u32, u32)> {
        if !self.completed {
            return None;
        }
        Some((self.home_score?, self.away_score?))
    }
}

/// The result of grading one pick. `status` is never pending.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradedResult {
    pub status: PickStatus,
    pub profit: f64,
}

/// Aggregate performance over a sequence of picks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_picks: usize,
    pub wins: usize,
    pub losses: usize,
    pub pushes: usize,
    pub pending: usize,
    pub win_rate: f64,
    pub roi: f64,
    pub current_streak: i32,
    pub longest_win_streak: usize,
    pub total_units_wagered: f64,
    pub profit_units: f64,
}

impl UserStats {
    /// Format the stats as a readable string
    pub fn format(&self) -> String {
        let streak = match self.current_streak {
            0 => "-".to_string(),
            n if n > 0 => format!("W{}", n),
            n => format!("L{}", -n),
        };
        format!(
            "{}-{}-{} ({} pending) | Win rate: {:.1}% | Units: {:+.2} on {:.2} | ROI: {:+.1}% | Streak: {} | Best run: {}",
            self.wins,
            self.losses,
            self.pushes,
            self.pending,
            self.win_rate,
            self.profit_units,
            self.total_units_wagered,
            self.roi,
            streak,
            self.longest_win_streak
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPREAD_PICK: &str = r#"{
        "id": "p1",
        "user_id": "u1",
        "sport": "nfl",
        "game_id": "401",
        "bet_type": "spread",
        "pick_side": "home",
        "line": -7.5,
        "selection_text": "Chiefs -7.5",
        "odds": -110,
        "units": 1.0,
        "created_at": "2026-10-01T17:00:00Z"
    }"#;

    #[test]
    fn test_pick_deserializes_with_defaults() {
        let pick: Pick = serde_json::from_str(SPREAD_PICK).unwrap();
        assert_eq!(
            pick.bet,
            Bet::Spread {
                pick_side: TeamSide::Home,
                line: Some(-7.5)
            }
        );
        assert_eq!(pick.status, PickStatus::Pending);
        assert_eq!(pick.profit, 0.0);
        assert!(pick.graded_at.is_none());
    }

    #[test]
    fn test_total_without_line_deserializes() {
        let json = SPREAD_PICK
            .replace("\"spread\"", "\"total\"")
            .replace("\"home\"", "\"over\"")
            .replace("\"line\": -7.5,", "");
        let pick: Pick = serde_json::from_str(&json).unwrap();
        assert_eq!(
            pick.bet,
            Bet::Total {
                pick_side: TotalSide::Over,
                line: None
            }
        );
    }

    #[test]
    fn test_apply_grade_only_once() {
        let mut pick: Pick = serde_json::from_str(SPREAD_PICK).unwrap();
        let now = Utc::now();
        let win = GradedResult {
            status: PickStatus::Win,
            profit: 1.0,
        };
        assert!(pick.apply_grade(&win, now));

        let loss = GradedResult {
            status: PickStatus::Loss,
            profit: -1.0,
        };
        assert!(!pick.apply_grade(&loss, Utc::now()));
        assert_eq!(pick.status, PickStatus::Win);
        assert_eq!(pick.profit, 1.0);
        assert_eq!(pick.graded_at, Some(now));
    }

    #[test]
    fn test_final_scores_requires_completion() {
        let mut game = CompletedGame {
            id: "g".to_string(),
            sport: Sport::Nba,
            home_team_name: "Lakers".to_string(),
            away_team_name: "Celtics".to_string(),
            home_score: Some(101),
            away_score: Some(99),
            completed: false,
        };
        assert_eq!(game.final_scores(), None);
        game.completed = true;
        assert_eq!(game.final_scores(), Some((101, 99)));
        game.away_score = None;
        assert_eq!(game.final_scores(), None);
    }

    #[test]
    fn test_outcome_from_str() {
        assert_eq!("WIN".parse::<Outcome>().unwrap(), Outcome::Win);
        assert_eq!("push".parse::<Outcome>().unwrap(), Outcome::Push);
        assert!("void".parse::<Outcome>().is_err());
    }
}
