use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();

    println!("{} {}", "Config file:".bold(), path.display());
    if !path.exists() {
        println!("{}", "(not created yet, showing defaults)".dimmed());
    }
    println!();

    let search_mode = config.search_mode().unwrap_or("fts");
    let rows = [
        ("defaults.theme", config.theme().to_string()),
        (
            "defaults.sidebar_collapsed",
            config.sidebar_collapsed().to_string(),
        ),
        ("defaults.search_mode", search_mode.to_string()),
        ("defaults.language", config.language()),
        ("server.base_url", config.server_url().to_string()),
        ("server.languages", config.languages().join(", ")),
    ];
    for (key, value) in rows {
        println!("  {:<28} {}", key.cyan(), value);
    }
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!(
        "{} {key} = {value} ({})",
        "Saved".green().bold(),
        path.display()
    );
    Ok(())
}
