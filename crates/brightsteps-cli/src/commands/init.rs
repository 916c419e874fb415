//! The `brightsteps init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("brightsteps.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("instruments")?;
    write_if_missing(Path::new("instruments/mchat-r.toml"), MCHAT_R_INSTRUMENT)?;
    write_if_missing(Path::new("instruments/rewards.toml"), REWARD_CATALOG)?;

    println!("\nNext steps:");
    println!("  1. Edit brightsteps.toml to set your time zone");
    println!("  2. Run: brightsteps validate --instrument instruments/mchat-r.toml --rewards instruments/rewards.toml");
    println!("  3. Run: brightsteps screen --answers answers.json");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# brightsteps configuration

instrument = "instruments/mchat-r.toml"
rewards = "instruments/rewards.toml"
ledger = "${HOME}/.local/share/brightsteps/badges.json"

# Minutes east of UTC used for day/week/month boundaries.
timezone_offset_minutes = 0
"#;

const MCHAT_R_INSTRUMENT: &str = include_str!("../../../../instruments/mchat-r.toml");

const REWARD_CATALOG: &str = include_str!("../../../../instruments/rewards.toml");
