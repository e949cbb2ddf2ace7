//! Modal views opened from a slide: metadata, image preview and raw data.

use serde::Serialize;

use crate::model::click::ClickAction;
use crate::model::SlideItem;

const NO_SUMMARY: &str = "No summary available.";
const NO_CONTENT: &str = "No raw content extracted.";

#[derive(Debug, Clone, PartialEq)]
pub enum Inspector {
    Metadata {
        title: String,
        summary: String,
        content: String,
    },
    Preview {
        title: String,
        path: String,
    },
    RawData {
        title: String,
        json: String,
    },
}

/// The fields shown by the raw-data inspector.
#[derive(Serialize)]
struct RawSlide<'a> {
    id: &'a str,
    path: &'a str,
    summary: Option<&'a str>,
    content: Option<&'a str>,
}

impl Inspector {
    /// Inspector for a click action, or `None` for selection actions.
    pub fn for_action(action: ClickAction, item: &SlideItem) -> Option<Self> {
        match action {
            ClickAction::ShowMetadata => Some(Self::metadata(item)),
            ClickAction::ShowPreview => Some(Self::preview(item)),
            ClickAction::ShowRawData => Some(Self::raw_data(item)),
            ClickAction::SelectExclusive | ClickAction::ToggleSelection => None,
        }
    }

    pub fn metadata(item: &SlideItem) -> Self {
        Self::Metadata {
            title: item.display_label.clone(),
            summary: non_empty(item.summary.as_deref()).unwrap_or(NO_SUMMARY).to_string(),
            content: non_empty(item.content.as_deref()).unwrap_or(NO_CONTENT).to_string(),
        }
    }

    pub fn preview(item: &SlideItem) -> Self {
        Self::Preview {
            title: item.display_label.clone(),
            path: item.source_path.clone(),
        }
    }

    pub fn raw_data(item: &SlideItem) -> Self {
        let raw = RawSlide {
            id: &item.id,
            path: &item.source_path,
            summary: item.summary.as_deref(),
            content: item.content.as_deref(),
        };
        let json = serde_json::to_string_pretty(&raw).unwrap_or_else(|e| {
            tracing::warn!("could not render slide data: {e}");
            String::from("{}")
        });
        Self::RawData {
            title: item.display_label.clone(),
            json,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Metadata { title, .. } | Self::Preview { title, .. } | Self::RawData { title, .. } => {
                title
            }
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
