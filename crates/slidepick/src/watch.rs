//! Reload signal for the library document.

use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::Duration;

use anyhow::{Context, Result};
use eframe::egui;
use notify_debouncer_mini::notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};

const DEBOUNCE: Duration = Duration::from_millis(300);

/// Keeps the watcher alive; dropping it stops the reload signals.
pub struct LibraryWatcher {
    _debouncer: Debouncer<RecommendedWatcher>,
}

/// Watch `library` and send `()` on `tx` each time it changes.
///
/// The parent directory is watched so that editors replacing the file
/// through a rename are still noticed.
pub fn watch_library(
    library: &Path,
    tx: Sender<()>,
    ctx: egui::Context,
) -> Result<LibraryWatcher> {
    let target = absolute(library);
    let dir = target
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = target.file_name().map(|n| n.to_os_string());

    let mut debouncer = new_debouncer(DEBOUNCE, move |result: DebounceEventResult| {
        match result {
            Ok(events) => {
                let touched = events
                    .iter()
                    .any(|e| e.path.file_name().map(|n| n.to_os_string()) == file_name);
                if touched {
                    tracing::debug!("library document changed");
                    if tx.send(()).is_ok() {
                        ctx.request_repaint();
                    }
                }
            }
            Err(e) => tracing::warn!("library watch error: {e}"),
        }
    })
    .context("Failed to create file watcher")?;

    debouncer
        .watcher()
        .watch(&dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {}", dir.display()))?;

    tracing::debug!(path = %target.display(), "watching library document");
    Ok(LibraryWatcher {
        _debouncer: debouncer,
    })
}

fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_keeps_missing_path() {
        let missing = Path::new("/nonexistent/slidepick/library.json");
        assert_eq!(absolute(missing), missing);
    }

    #[test]
    fn test_watch_missing_directory_fails() {
        let (tx, _rx) = std::sync::mpsc::channel();
        let result = watch_library(
            Path::new("/nonexistent/slidepick/library.json"),
            tx,
            egui::Context::default(),
        );
        assert!(result.is_err());
    }
}
