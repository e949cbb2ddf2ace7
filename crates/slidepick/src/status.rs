//! Live processing status pushed by the server as a `text/event-stream`.

use std::io::{BufRead, BufReader};
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;
use std::time::{SystemTime, UNIX_EPOCH};

use eframe::egui;
use serde::Deserialize;

pub const STATUS_PATH: &str = "/events/status";
pub const COMPLETED_NOTICE: &str = "Processing completed, list updated";

/// One status payload. Missing fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StatusMessage {
    pub is_processing: bool,
    pub current_file: String,
    pub total_queued: i64,
    /// Unix seconds; zero or negative means unknown.
    pub start_time: i64,
    pub last_log: String,
}

impl StatusMessage {
    pub fn parse(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    /// Badge text for the status bar.
    pub fn status_text(&self) -> String {
        if !self.is_processing {
            "Ready".to_string()
        } else if self.current_file.is_empty() {
            "Processing...".to_string()
        } else {
            format!(
                "Processing: {} ({} left)",
                self.current_file, self.total_queued
            )
        }
    }

    /// Elapsed processing time as `M:SS`, measured against `now_unix`.
    pub fn elapsed_at(&self, now_unix: i64) -> Option<String> {
        if !self.is_processing || self.start_time <= 0 {
            return None;
        }
        let elapsed = (now_unix - self.start_time).max(0);
        Some(format!("{}:{:02}", elapsed / 60, elapsed % 60))
    }

    /// Elapsed processing time against the wall clock.
    pub fn elapsed(&self) -> Option<String> {
        self.elapsed_at(unix_now())
    }
}

/// Folds messages into the latest status, remembering only whether the
/// previous one was processing.
#[derive(Debug, Default)]
pub struct StatusFeed {
    was_processing: bool,
    latest: Option<StatusMessage>,
    last_log: Option<String>,
}

impl StatusFeed {
    /// Accept a message; returns `true` exactly when processing just finished.
    pub fn accept(&mut self, message: StatusMessage) -> bool {
        let finished = self.was_processing && !message.is_processing;
        self.was_processing = message.is_processing;
        if finished {
            tracing::info!("processing finished, refreshing library");
        }
        if !message.last_log.is_empty() {
            self.last_log = Some(message.last_log.clone());
        }
        self.latest = Some(message);
        finished
    }

    pub fn latest(&self) -> Option<&StatusMessage> {
        self.latest.as_ref()
    }

    /// Most recent non-empty log line. Heartbeats without a log keep it.
    pub fn last_log(&self) -> Option<&str> {
        self.last_log.as_deref()
    }
}

/// Line-oriented event-stream decoder. Yields one `data` payload per event.
#[derive(Debug, Default)]
pub struct EventStreamDecoder {
    data: Vec<String>,
}

impl EventStreamDecoder {
    /// Feed one line (without its terminator). A blank line dispatches the
    /// event collected so far.
    pub fn push_line(&mut self, line: &str) -> Option<String> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            if self.data.is_empty() {
                return None;
            }
            return Some(std::mem::take(&mut self.data).join("\n"));
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data.push(value.to_string());
        }
        None
    }
}

pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Read the stream on a background thread, forwarding parsed messages.
///
/// The thread ends when the connection drops or the receiver goes away;
/// there is no reconnect.
pub fn spawn_reader(
    base_url: &str,
    tx: Sender<StatusMessage>,
    ctx: Option<egui::Context>,
) -> std::io::Result<JoinHandle<()>> {
    let url = format!("{}{STATUS_PATH}", base_url.trim_end_matches('/'));
    std::thread::Builder::new()
        .name("status-stream".into())
        .spawn(move || {
            if let Err(e) = read_stream(&url, |message| {
                let delivered = tx.send(message).is_ok();
                if let Some(ctx) = &ctx {
                    ctx.request_repaint();
                }
                delivered
            }) {
                tracing::warn!(%url, "status stream closed: {e:#}");
            }
        })
}

/// Connect to `url` and hand each well-formed message to `on_message` until
/// it returns `false` or the stream ends.
pub fn read_stream(
    url: &str,
    mut on_message: impl FnMut(StatusMessage) -> bool,
) -> anyhow::Result<()> {
    tracing::debug!(%url, "connecting to status stream");
    let mut response = ureq::get(url)
        .header("Accept", "text/event-stream")
        .call()?;
    forward_messages(
        BufReader::new(response.body_mut().as_reader()),
        &mut on_message,
    )
}

/// Decode events from `reader`, skipping malformed payloads.
fn forward_messages(
    reader: impl BufRead,
    on_message: &mut impl FnMut(StatusMessage) -> bool,
) -> anyhow::Result<()> {
    let mut decoder = EventStreamDecoder::default();
    for line in reader.lines() {
        let line = line?;
        let Some(data) = decoder.push_line(&line) else {
            continue;
        };
        match StatusMessage::parse(&data) {
            Ok(message) => {
                if !on_message(message) {
                    break;
                }
            }
            Err(e) => tracing::warn!("ignoring malformed status message: {e}"),
        }
    }
    Ok(())
}
