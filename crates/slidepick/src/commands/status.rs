use anyhow::Result;
use colored::Colorize;

use crate::config::Config;
use crate::status::{self, STATUS_PATH, StatusFeed, StatusMessage};

/// Follow the status stream in the terminal until the server closes it.
pub fn run(server: Option<&str>) -> Result<()> {
    let config = Config::load_or_default();
    let base_url = server.unwrap_or(config.server_url());
    let url = format!("{}{STATUS_PATH}", base_url.trim_end_matches('/'));

    println!("{} {url}", "Listening on".bold());
    let mut feed = StatusFeed::default();
    status::read_stream(&url, |message| {
        let line = describe(&message);
        let refresh = feed.accept(message);
        println!("{line}");
        if refresh {
            println!("{}", status::COMPLETED_NOTICE.green().bold());
        }
        true
    })?;
    println!("{}", "Stream closed.".yellow());
    Ok(())
}

fn describe(message: &StatusMessage) -> String {
    let mut line = if message.is_processing {
        message.status_text().yellow().to_string()
    } else {
        message.status_text().green().to_string()
    };
    if let Some(elapsed) = message.elapsed() {
        line.push_str(&format!(" [{elapsed}]"));
    }
    if !message.last_log.is_empty() {
        line.push_str(&format!(" {}", message.last_log.dimmed()));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_includes_log() {
        colored::control::set_override(false);
        let message = StatusMessage {
            is_processing: true,
            current_file: "deck.pptx".into(),
            total_queued: 2,
            last_log: "rendering slide 4".into(),
            ..Default::default()
        };
        assert_eq!(
            describe(&message),
            "Processing: deck.pptx (2 left) rendering slide 4"
        );
    }
}
