use crate::error::{GradingError, Result};
use crate::models::{CompletedGame, Sport};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://site.api.espn.com/apis/site/v2/sports";

/// Source of final scores. Results may be partial or empty; the grader
/// skips whatever it cannot match.
#[async_trait]
pub trait GameScoreProvider: Send + Sync {
    async fn fetch_completed_games(
        &self,
        sport: Sport,
        lookback_days: u32,
    ) -> Result<Vec<CompletedGame>>;
}

#[async_trait]
impl<T: GameScoreProvider + ?Sized> GameScoreProvider for Box<T> {
    async fn fetch_completed_games(
        &self,
        sport: Sport,
        lookback_days: u32,
    ) -> Result<Vec<CompletedGame>> {
        (**self).fetch_completed_games(sport, lookback_days).await
    }
}

fn sport_path(sport: Sport) -> &'static str {
    match sport {
        Sport::Nfl => "football/nfl",
        Sport::Nba => "basketball/nba",
        Sport::Mlb => "baseball/mlb",
        Sport::Nhl => "hockey/nhl",
        Sport::Ncaaf => "football/college-football",
        Sport::Ncaab => "basketball/mens-college-basketball",
        Sport::Mls => "soccer/usa.1",
    }
}

#[derive(Debug, Deserialize)]
struct Scoreboard {
    #[serde(default)]
    events: Vec<ScoreboardEvent>,
}

#[derive(Debug, Deserialize)]
struct ScoreboardEvent {
    id: String,
    #[serde(default)]
    competitions: Vec<Competition>,
    status: Option<EventStatus>,
}

#[derive(Debug, Deserialize)]
struct Competition {
    #[serde(default)]
    competitors: Vec<Competitor>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Competitor {
    home_away: String,
    score: Option<serde_json::Value>,
    team: CompetitorTeam,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompetitorTeam {
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct EventStatus {
    #[serde(rename = "type")]
    kind: StatusType,
}

#[derive(Debug, Deserialize)]
struct StatusType {
    #[serde(default)]
    completed: bool,
}

/// Scores come back as strings ("24"), occasionally numbers, sometimes
/// blank. Anything that isn't a whole non-negative number is unknown.
fn parse_score(value: Option<&serde_json::Value>) -> Option<u32> {
    match value? {
        serde_json::Value::String(s) => s.trim().parse().ok(),
        serde_json::Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        _ => None,
    }
}

impl ScoreboardEvent {
    fn into_game(self, sport: Sport) -> Option<CompletedGame> {
        let competition = self.competitions.into_iter().next()?;
        let home = competition
            .competitors
            .iter()
            .find(|c| c.home_away == "home")?;
        let away = competition
            .competitors
            .iter()
            .find(|c| c.home_away == "away")?;

        Some(CompletedGame {
            id: self.id,
            sport,
            home_team_name: home.team.display_name.clone(),
            away_team_name: away.team.display_name.clone(),
            home_score: parse_score(home.score.as_ref()),
            away_score: parse_score(away.score.as_ref()),
            completed: self.status.map(|s| s.kind.completed).unwrap_or(false),
        })
    }
}

/// Scoreboard client
pub struct ScoresApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ScoresApiClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn scoreboard_url(&self, sport: Sport) -> String {
        format!("{}/{}/scoreboard", self.base_url, sport_path(sport))
    }
}

#[async_trait]
impl GameScoreProvider for ScoresApiClient {
    async fn fetch_completed_games(
        &self,
        sport: Sport,
        lookback_days: u32,
    ) -> Result<Vec<CompletedGame>> {
        let today = Utc::now().date_naive();
        let start = today - Duration::days(lookback_days as i64);
        let dates = format!("{}-{}", start.format("%Y%m%d"), today.format("%Y%m%d"));

        let mut request = self
            .client
            .get(self.scoreboard_url(sport))
            .query(&[("dates", dates.as_str()), ("limit", "500")]);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(GradingError::ScoreProvider {
                sport,
                message: format!("scoreboard returned {}", response.status()),
            });
        }

        let scoreboard: Scoreboard = response.json().await?;
        Ok(scoreboard
            .events
            .into_iter()
            .filter_map(|event| event.into_game(sport))
            .filter(|game| game.completed)
            .collect())
    }
}

/// Reads games from a JSON file of `CompletedGame` records
pub struct CachedScores {
    path: PathBuf,
}

impl CachedScores {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl GameScoreProvider for CachedScores {
    async fn fetch_completed_games(
        &self,
        sport: Sport,
        _lookback_days: u32,
    ) -> Result<Vec<CompletedGame>> {
        let json = tokio::fs::read_to_string(&self.path).await?;
        let games: Vec<CompletedGame> = serde_json::from_str(&json)?;
        Ok(games.into_iter().filter(|g| g.sport == sport).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SCOREBOARD: &str = r#"{
        "events": [
            {
                "id": "401671",
                "status": { "type": { "completed": true } },
                "competitions": [{
                    "competitors": [
                        { "homeAway": "home", "score": "24", "team": { "displayName": "Kansas City Chiefs" } },
                        { "homeAway": "away", "score": "21", "team": { "displayName": "Denver Broncos" } }
                    ]
                }]
            },
            {
                "id": "401672",
                "status": { "type": { "completed": true } },
                "competitions": [{
                    "competitors": [
                        { "homeAway": "home", "score": "", "team": { "displayName": "Dallas Cowboys" } },
                        { "homeAway": "away", "score": 17, "team": { "displayName": "New York Giants" } }
                    ]
                }]
            },
            {
                "id": "401673",
                "status": { "type": { "completed": false } },
                "competitions": [{
                    "competitors": [
                        { "homeAway": "home", "score": "3", "team": { "displayName": "Miami Dolphins" } },
                        { "homeAway": "away", "score": "0", "team": { "displayName": "Buffalo Bills" } }
                    ]
                }]
            }
        ]
    }"#;

    #[test]
    fn test_scoreboard_parsing() {
        let scoreboard: Scoreboard = serde_json::from_str(SCOREBOARD).unwrap();
        let games: Vec<CompletedGame> = scoreboard
            .events
            .into_iter()
            .filter_map(|e| e.into_game(Sport::Nfl))
            .collect();

        assert_eq!(games.len(), 3);
        assert_eq!(games[0].home_team_name, "Kansas City Chiefs");
        assert_eq!(games[0].final_scores(), Some((24, 21)));

        // Blank score string is unknown, numeric score is accepted
        assert_eq!(games[1].home_score, None);
        assert_eq!(games[1].away_score, Some(17));
        assert_eq!(games[1].final_scores(), None);

        assert!(!games[2].completed);
    }

    #[test]
    fn test_parse_score() {
        let v = serde_json::json!("-3");
        assert_eq!(parse_score(Some(&v)), None);
        let v = serde_json::json!(" 7 ");
        assert_eq!(parse_score(Some(&v)), Some(7));
        assert_eq!(parse_score(Some(&serde_json::Value::Null)), None);
        assert_eq!(parse_score(None), None);
    }

    #[tokio::test]
    async fn test_cached_scores_filters_by_sport() {
        let games = vec![
            CompletedGame {
                id: "a".to_string(),
                sport: Sport::Nba,
                home_team_name: "Lakers".to_string(),
                away_team_name: "Celtics".to_string(),
                home_score: Some(110),
                away_score: Some(100),
                completed: true,
            },
            CompletedGame {
                id: "b".to_string(),
                sport: Sport::Nhl,
                home_team_name: "Bruins".to_string(),
                away_team_name: "Rangers".to_string(),
                home_score: Some(3),
                away_score: Some(2),
                completed: true,
            },
        ];
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&games).unwrap()).unwrap();

        let provider = CachedScores::new(file.path());
        let nba = provider.fetch_completed_games(Sport::Nba, 3).await.unwrap();
        assert_eq!(nba.len(), 1);
        assert_eq!(nba[0].id, "a");
        assert!(provider
            .fetch_completed_games(Sport::Mlb, 3)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    #[ignore]
    async fn test_fetch_live_scoreboard() {
        let client = ScoresApiClient::new(DEFAULT_BASE_URL.to_string(), None);
        let games = client
            .fetch_completed_games(Sport::Nfl, 7)
            .await
            .unwrap();
        assert!(games.iter().all(|g| g.completed));
    }
}
