use crate::models::{Pick, PickStatus, Sport, UserStats};
use std::collections::{BTreeMap, HashMap};

/// Compute performance stats. `picks` must be ordered most recent first,
/// which is what the streak calculation walks.
pub fn compute_stats(picks: &[Pick]) -> UserStats {
    let mut stats = UserStats {
        total_picks: picks.len(),
        ..UserStats::default()
    };

    for pick in picks {
        match pick.status {
            PickStatus::Win => stats.wins += 1,
            PickStatus::Loss => stats.losses += 1,
            PickStatus::Push => stats.pushes += 1,
            PickStatus::Pending => stats.pending += 1,
        }
        stats.total_units_wagered += pick.units;
        if pick.status.is_graded() {
            stats.profit_units += pick.profit;
        }
    }

    let decided = stats.wins + stats.losses;
    if decided > 0 {
        stats.win_rate = stats.wins as f64 / decided as f64 * 100.0;
    }
    if stats.total_units_wagered > 0.0 {
        stats.roi = stats.profit_units / stats.total_units_wagered * 100.0;
    }

    stats.current_streak = current_streak(picks);
    stats.longest_win_streak = longest_win_streak(picks);
    stats
}

/// Positive for a win streak, negative for a loss streak. The most recent
/// pick sets the direction; the count freezes at the first pick that breaks
/// it. A push or pending pick at the head means no streak.
fn current_streak(picks: &[Pick]) -> i32 {
    let mut iter = picks.iter();
    let (direction, extends) = match iter.next().map(|p| p.status) {
        Some(PickStatus::Win) => (1, PickStatus::Win),
        Some(PickStatus::Loss) => (-1, PickStatus::Loss),
        _ => return 0,
    };

    let run = 1 + iter.take_while(|p| p.status == extends).count() as i32;
    direction * run
}

fn longest_win_streak(picks: &[Pick]) -> usize {
    let mut longest = 0;
    let mut run = 0;
    for pick in picks {
        if pick.status == PickStatus::Win {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    longest
}

/// Stats per sport. Input order is preserved inside each sport.
pub fn compute_stats_by_sport(picks: &[Pick]) -> BTreeMap<Sport, UserStats> {
    let mut grouped: BTreeMap<Sport, Vec<Pick>> = BTreeMap::new();
    for pick in picks {
        grouped.entry(pick.sport).or_default().push(pick.clone());
    }
    grouped
        .into_iter()
        .map(|(sport, picks)| (sport, compute_stats(&picks)))
        .collect()
}

/// Stats for every user in a mixed set of picks, best record first.
/// Sorted by profit, then win rate, then user id.
pub fn compute_leaderboard(picks: &[Pick]) -> Vec<(String, UserStats)> {
    let mut by_user: HashMap<&str, Vec<Pick>> = HashMap::new();
    for pick in picks {
        by_user
            .entry(pick.user_id.as_str())
            .or_default()
            .push(pick.clone());
    }

    let mut board: Vec<(String, UserStats)> = by_user
        .into_iter()
        .map(|(user, mut picks)| {
            sort_most_recent_first(&mut picks);
            (user.to_string(), compute_stats(&picks))
        })
        .collect();

    board.sort_by(|(a_user, a), (b_user, b)| {
        b.profit_units
            .partial_cmp(&a.profit_units)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                b.win_rate
                    .partial_cmp(&a.win_rate)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a_user.cmp(b_user))
    });
    board
}

/// Order picks newest first; ties broken by id so the order is stable
pub fn sort_most_recent_first(picks: &mut [Pick]) {
    picks.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
