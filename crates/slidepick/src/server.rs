//! Fire-and-forget actions against the library server.

use std::sync::mpsc::Sender;
use std::time::Duration;

use eframe::egui;
use thiserror::Error;
use ureq::Agent;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Above this many files, reprocessing everything gets the long warning.
pub const REPROCESS_WARNING_THRESHOLD: usize = 10;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{action} failed: {source}")]
    Request {
        action: &'static str,
        #[source]
        source: ureq::Error,
    },

    #[error("{action} rejected by server (HTTP {status})")]
    Status { action: &'static str, status: u16 },

    #[error("{0} needs a value")]
    MissingArgument(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerAction {
    ReprocessAll,
    ReprocessFile { file_id: String },
    CopyToStage { file_id: String },
    DeleteFile { file_id: String },
    SaveSetting { key: String, value: String },
    SetLanguage { lang: String },
}

impl ServerAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReprocessAll => "Reprocess all",
            Self::ReprocessFile { .. } => "Reprocess",
            Self::CopyToStage { .. } => "Copy to stage",
            Self::DeleteFile { .. } => "Delete",
            Self::SaveSetting { .. } => "Save setting",
            Self::SetLanguage { .. } => "Switch language",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::ReprocessAll => "/reprocess",
            Self::ReprocessFile { .. } => "/reprocess-file",
            Self::CopyToStage { .. } => "/copy-to-stage",
            Self::DeleteFile { .. } => "/delete-file",
            Self::SaveSetting { .. } => "/search-settings",
            Self::SetLanguage { .. } => "/set-language",
        }
    }

    pub fn success_message(&self) -> String {
        match self {
            Self::ReprocessAll => "All files queued for reprocessing".to_string(),
            Self::ReprocessFile { .. } => "File queued for reprocessing".to_string(),
            Self::CopyToStage { .. } => "File copied to stage".to_string(),
            Self::DeleteFile { .. } => "File deleted".to_string(),
            Self::SaveSetting { key, .. } => format!("Setting saved: {key}"),
            Self::SetLanguage { lang } => format!("Language: {lang}"),
        }
    }

    fn validate(&self) -> Result<(), ActionError> {
        let empty = match self {
            Self::ReprocessAll => false,
            Self::ReprocessFile { file_id }
            | Self::CopyToStage { file_id }
            | Self::DeleteFile { file_id } => file_id.is_empty(),
            Self::SaveSetting { key, .. } => key.is_empty(),
            Self::SetLanguage { lang } => lang.is_empty(),
        };
        if empty {
            Err(ActionError::MissingArgument(self.name()))
        } else {
            Ok(())
        }
    }
}

/// Confirmation text for reprocessing every file on the server.
pub fn reprocess_all_warning(count: usize) -> String {
    if count > REPROCESS_WARNING_THRESHOLD {
        format!(
            "You have {count} files. Reprocessing will:\n\
             1. Clear all current slide metadata and analysis.\n\
             2. Move files from the template folder back to stage.\n\
             3. Re-run the complete analysis for every file, which may take a long time.\n\n\
             Do you want to proceed?"
        )
    } else {
        "Reprocess all files? This will reset metadata and re-run the analysis.".to_string()
    }
}

/// Outcome of one dispatched action, as shown to the user.
#[derive(Debug)]
pub struct ActionOutcome {
    pub action: ServerAction,
    pub result: Result<(), ActionError>,
}

#[derive(Clone)]
pub struct ServerClient {
    base_url: String,
    agent: Agent,
}

impl ServerClient {
    pub fn new(base_url: &str) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: config.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, action: &ServerAction) -> String {
        format!("{}{}", self.base_url, action.path())
    }

    /// Perform the request on the calling thread.
    pub fn execute(&self, action: &ServerAction) -> Result<(), ActionError> {
        action.validate()?;
        let url = self.url(action);
        tracing::debug!(%url, action = action.name(), "sending server action");

        let result = match action {
            ServerAction::ReprocessAll => self.agent.post(&url).send_empty(),
            ServerAction::ReprocessFile { file_id }
            | ServerAction::CopyToStage { file_id }
            | ServerAction::DeleteFile { file_id } => self
                .agent
                .post(&url)
                .query("fileID", file_id)
                .send_empty(),
            ServerAction::SaveSetting { key, value } => self
                .agent
                .post(&url)
                .send_form([("key", key.as_str()), ("value", value.as_str())]),
            ServerAction::SetLanguage { lang } => self.agent.get(&url).query("lang", lang).call(),
        };

        let response = result.map_err(|source| match source {
            ureq::Error::StatusCode(status) => ActionError::Status {
                action: action.name(),
                status,
            },
            source => ActionError::Request {
                action: action.name(),
                source,
            },
        })?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(ActionError::Status {
                action: action.name(),
                status,
            });
        }
        Ok(())
    }

    /// Run the action on a background thread and report back over `tx`.
    pub fn dispatch(
        &self,
        action: ServerAction,
        tx: Sender<ActionOutcome>,
        ctx: egui::Context,
    ) {
        let client = self.clone();
        let spawned = std::thread::Builder::new()
            .name("server-action".into())
            .spawn(move || {
                let result = client.execute(&action);
                if let Err(e) = &result {
                    tracing::warn!("{e}");
                }
                let _ = tx.send(ActionOutcome { action, result });
                ctx.request_repaint();
            });
        if let Err(e) = spawned {
            tracing::error!("failed to start server action thread: {e}");
        }
    }
}
