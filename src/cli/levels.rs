//! Levels command implementation

use anyhow::{Result, bail};
use serde::Serialize;

use brigade::progression::levels::{rank_title, xp_required_for_level};

use super::print_json;

#[derive(Serialize)]
struct LevelRow {
    level: u32,
    xp_required: u64,
    title: &'static str,
}

/// Print the XP curve up to `up_to`
pub async fn levels_command(up_to: u32, json: bool) -> Result<()> {
    if up_to == 0 {
        bail!("--up-to must be at least 1");
    }

    let rows: Vec<LevelRow> = (1..=up_to)
        .map(|level| LevelRow {
            level,
            xp_required: xp_required_for_level(level),
            title: rank_title(level),
        })
        .collect();

    if json {
        return print_json(&rows);
    }

    println!("{:>5}  {:>10}  Title", "Level", "XP");
    for row in &rows {
        println!("{:>5}  {:>10}  {}", row.level, row.xp_required, row.title);
    }
    Ok(())
}
