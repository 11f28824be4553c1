use crate::error::{GradingError, Result};

/// Check that a price is usable American odds.
/// +100 and above is an underdog price, below -100 is a favorite price.
/// -100 is rejected: it is the same price as +100 and we store it one way.
pub fn validate_american_odds(odds: i32) -> Result<i32> {
    if odds >= 100 || odds < -100 {
        Ok(odds)
    } else {
        Err(GradingError::InvalidOdds(odds))
    }
}

/// Convert American odds to implied probability
/// Positive odds (+150) mean you win $150 on a $100 bet
/// Negative odds (-150) mean you need to bet $150 to win $100
pub fn american_odds_to_probability(odds: i32) -> f64 {
    if odds > 0 {
        100.0 / (odds as f64 + 100.0)
    } else {
        let abs_odds = odds.abs() as f64;
        abs_odds / (abs_odds + 100.0)
    }
}

/// Amount that has to be staked to win `to_win` units at these odds
pub fn risk_amount(odds: i32, to_win: f64) -> f64 {
    if odds > 0 {
        to_win * 100.0 / odds as f64
    } else {
        to_win * odds.abs() as f64 / 100.0
    }
}

/// Amount won by staking `risk` units at these odds
pub fn to_win_amount(odds: i32, risk: f64) -> f64 {
    if odds > 0 {
        risk * odds as f64 / 100.0
    } else {
        risk * 100.0 / odds.abs() as f64
    }
}
