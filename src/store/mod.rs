use crate::error::{GradingError, Result};
use crate::models::{GradedResult, Pick, PickStatus};
use crate::utils::stats::sort_most_recent_first;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Where picks live. The grading engine reads pending picks and writes
/// graded results back; it never owns the data.
#[async_trait]
pub trait PickStore: Send + Sync {
    async fn pending_picks(&self) -> Result<Vec<Pick>>;

    /// A user's picks, most recent first
    async fn user_picks(&self, user_id: &str) -> Result<Vec<Pick>>;

    async fn all_picks(&self) -> Result<Vec<Pick>>;

    async fn get_pick(&self, pick_id: &str) -> Result<Pick>;

    /// Persist a grade. Returns false when the pick was already graded,
    /// in which case nothing is written.
    async fn record_grade(
        &self,
        pick_id: &str,
        result: &GradedResult,
        graded_at: DateTime<Utc>,
    ) -> Result<bool>;
}

/// Picks held in memory and mirrored to a pretty-printed JSON file
pub struct JsonPickStore {
    path: Option<PathBuf>,
    picks: RwLock<Vec<Pick>>,
}

impl JsonPickStore {
    /// Load from a JSON file. A missing file is an empty store.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let picks = if tokio::fs::try_exists(&path).await? {
            let json = tokio::fs::read_to_string(&path).await?;
            serde_json::from_str(&json)?
        } else {
            Vec::new()
        };
        Ok(Self {
            path: Some(path),
            picks: RwLock::new(picks),
        })
    }

    /// In-memory only; nothing is written to disk
    pub fn from_picks(picks: Vec<Pick>) -> Self {
        Self {
            path: None,
            picks: RwLock::new(picks),
        }
    }

    async fn persist(&self, picks: &[Pick]) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(picks)?;

        // Write beside the target and rename over it, so a crash mid-write
        // leaves the previous file intact
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, json).await?;
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl PickStore for JsonPickStore {
    async fn pending_picks(&self) -> Result<Vec<Pick>> {
        let picks = self.picks.read().await;
        Ok(picks
            .iter()
            .filter(|p| p.status == PickStatus::Pending)
            .cloned()
            .collect())
    }

    async fn user_picks(&self, user_id: &str) -> Result<Vec<Pick>> {
        let picks = self.picks.read().await;
        let mut user_picks: Vec<Pick> = picks
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        sort_most_recent_first(&mut user_picks);
        Ok(user_picks)
    }

    async fn all_picks(&self) -> Result<Vec<Pick>> {
        Ok(self.picks.read().await.clone())
    }

    async fn get_pick(&self, pick_id: &str) -> Result<Pick> {
        self.picks
            .read()
            .await
            .iter()
            .find(|p| p.id == pick_id)
            .cloned()
            .ok_or_else(|| GradingError::PickNotFound(pick_id.to_string()))
    }

    async fn record_grade(
        &self,
        pick_id: &str,
        result: &GradedResult,
        graded_at: DateTime<Utc>,
    ) -> Result<bool> {
        // Hold the write lock across check and persist. The grade goes into a
        // copy that only replaces the live picks once it is on disk.
        let mut picks = self.picks.write().await;
        let mut updated = picks.clone();
        let pick = updated
            .iter_mut()
            .find(|p| p.id == pick_id)
            .ok_or_else(|| GradingError::PickNotFound(pick_id.to_string()))?;

        if !pick.apply_grade(result, graded_at) {
            return Ok(false);
        }
        self.persist(&updated).await?;
        *picks = updated;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bet, Sport, TeamSide};
    use chrono::{Duration, TimeZone};

    fn sample_picks() -> Vec<Pick> {
        let base = Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap();
        (0..3)
            .map(|i| Pick {
                id: format!("p{}", i),
                user_id: if i == 2 { "u2" } else { "u1" }.to_string(),
                sport: Sport::Nfl,
                game_id: format!("g{}", i),
                bet: Bet::Moneyline {
                    pick_side: TeamSide::Home,
                },
                selection_text: String::new(),
                odds: -110,
                units: 1.0,
                status: PickStatus::Pending,
                profit: 0.0,
                created_at: base + Duration::hours(i),
                graded_at: None,
            })
            .collect()
    }

    const WIN: GradedResult = GradedResult {
        status: PickStatus::Win,
        profit: 1.0,
    };

    #[tokio::test]
    async fn test_user_picks_most_recent_first() {
        let store = JsonPickStore::from_picks(sample_picks());
        let picks = store.user_picks("u1").await.unwrap();
        let ids: Vec<&str> = picks.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p0"]);
    }

    #[tokio::test]
    async fn test_record_grade_once() {
        let store = JsonPickStore::from_picks(sample_picks());
        assert!(store.record_grade("p0", &WIN, Utc::now()).await.unwrap());

        let loss = GradedResult {
            status: PickStatus::Loss,
            profit: -1.0,
        };
        assert!(!store.record_grade("p0", &loss, Utc::now()).await.unwrap());

        let pick = store.get_pick("p0").await.unwrap();
        assert_eq!(pick.status, PickStatus::Win);
        assert_eq!(pick.profit, 1.0);
        assert_eq!(store.pending_picks().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_record_grade_unknown_pick() {
        let store = JsonPickStore::from_picks(sample_picks());
        let err = store
            .record_grade("nope", &WIN, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, GradingError::PickNotFound(_)));
    }

    #[tokio::test]
    async fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("picks.json");

        let empty = JsonPickStore::open(&path).await.unwrap();
        assert!(empty.all_picks().await.unwrap().is_empty());

        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, serde_json::to_string(&sample_picks()).unwrap())
            .await
            .unwrap();

        let store = JsonPickStore::open(&path).await.unwrap();
        store.record_grade("p2", &WIN, Utc::now()).await.unwrap();

        let reopened = JsonPickStore::open(&path).await.unwrap();
        let pick = reopened.get_pick("p2").await.unwrap();
        assert_eq!(pick.status, PickStatus::Win);
        assert!(pick.graded_at.is_some());

        // Only the store file is left behind
        let mut entries = tokio::fs::read_dir(path.parent().unwrap()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        assert_eq!(names, vec!["picks.json".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_pick_pending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("picks.json");
        tokio::fs::write(&path, serde_json::to_string(&sample_picks()).unwrap())
            .await
            .unwrap();
        let store = JsonPickStore::open(&path).await.unwrap();

        // A directory in place of the file makes every write fail
        tokio::fs::remove_file(&path).await.unwrap();
        tokio::fs::create_dir(&path).await.unwrap();

        assert!(store.record_grade("p0", &WIN, Utc::now()).await.is_err());

        let pick = store.get_pick("p0").await.unwrap();
        assert_eq!(pick.status, PickStatus::Pending);
        assert_eq!(pick.profit, 0.0);
        assert!(pick.graded_at.is_none());
        assert_eq!(store.pending_picks().await.unwrap().len(), 3);
    }
}
