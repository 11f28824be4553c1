use crate::error::Result;
use crate::models::{Pick, UserStats};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Serialize)]
struct PickRow<'a> {
    #[serde(rename = "Created")]
    created_at: String,
    #[serde(rename = "Sport")]
    sport: &'a str,
    #[serde(rename = "Bet Type")]
    bet_type: &'a str,
    #[serde(rename = "Selection")]
    selection: &'a str,
    #[serde(rename = "Odds")]
    odds: String,
    #[serde(rename = "Units")]
    units: f64,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "Profit")]
    profit: String,
}

impl<'a> From<&'a Pick> for PickRow<'a> {
    fn from(pick: &'a Pick) -> Self {
        Self {
            created_at: pick.created_at.format("%Y-%m-%d %H:%M").to_string(),
            sport: pick.sport.key(),
            bet_type: pick.bet.kind(),
            selection: &pick.selection_text,
            odds: format!("{:+}", pick.odds),
            units: pick.units,
            status: pick.status.to_string(),
            profit: if pick.status.is_graded() {
                format!("{:.2}", pick.profit)
            } else {
                String::new()
            },
        }
    }
}

/// Write a user's pick history as CSV
pub fn write_picks_csv<W: Write>(picks: &[Pick], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for pick in picks {
        csv.serialize(PickRow::from(pick))?;
    }
    csv.flush()?;
    Ok(())
}

/// Save a user's pick history to a CSV file, with a summary row last
pub fn save_picks_to_csv(picks: &[Pick], stats: &UserStats, filename: impl AsRef<Path>) -> Result<()> {
    let mut file = std::fs::File::create(filename)?;
    write_picks_csv(picks, &mut file)?;
    writeln!(
        file,
        "\nRecord,{}-{}-{},Win Rate,{:.1}%,Profit,{:.2},ROI,{:.1}%",
        stats.wins, stats.losses, stats.pushes, stats.win_rate, stats.profit_units, stats.roi
    )?;
    Ok(())
}
