//! Init command implementation

use anyhow::Result;
use std::path::Path;

use brigade::Config;

/// Default configuration written by `brigade init`
pub const DEFAULT_CONFIG: &str = r#"# Brigade Configuration
# =====================
#
# Progression data for the kitchen: XP, levels, achievements and tasks.

[store]
# Database file (default: ~/.brigade/progression.db)
# path = "/var/lib/brigade/progression.db"

# How long a write waits on a locked database, in milliseconds
busy_timeout_ms = 2000

[engine]
# Compare-and-set retries before a write conflict is reported
max_write_retries = 5

# Highest level shown to users; XP keeps accumulating past it
display_level_cap = 100

# Upper bound for a whole CLI operation, in milliseconds
operation_timeout_ms = 5000

# XP overrides per activity kind. Negative values are penalties.
[rewards]
# recipe_generation = 15
# campaign_dislike = -2
"#;

pub async fn init_command(config_path: &Path, force: bool) -> Result<()> {
    Config::write_config_text(config_path, DEFAULT_CONFIG, force)?;
    println!("Created: {}", config_path.display());

    Ok(())
}
