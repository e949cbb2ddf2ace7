use std::sync::OnceLock;

use eframe::egui::{self, Color32, FontId, text::LayoutJob};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::theme::Theme;

fn syntax_set() -> &'static SyntaxSet {
    static SET: OnceLock<SyntaxSet> = OnceLock::new();
    SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
    static SET: OnceLock<ThemeSet> = OnceLock::new();
    SET.get_or_init(ThemeSet::load_defaults)
}

/// Colour JSON text for the raw-data inspector. Falls back to plain text
/// when the syntax or theme is unavailable.
pub fn highlight_json(json: &str, theme: &Theme, font_size: f32) -> LayoutJob {
    let font = FontId::monospace(font_size);
    let mut job = LayoutJob::default();

    let ss = syntax_set();
    let syntax = ss.find_syntax_by_extension("json");
    let highlight_theme = theme_set().themes.get(theme.syntect_theme_name());

    let (Some(syntax), Some(highlight_theme)) = (syntax, highlight_theme) else {
        tracing::debug!("json highlighting unavailable, rendering plain text");
        append(&mut job, json, &font, theme.foreground);
        return job;
    };

    let mut highlighter = HighlightLines::new(syntax, highlight_theme);
    for line in LinesWithEndings::from(json) {
        match highlighter.highlight_line(line, ss) {
            Ok(ranges) => {
                for (style, text) in ranges {
                    let fg = style.foreground;
                    append(&mut job, text, &font, Color32::from_rgb(fg.r, fg.g, fg.b));
                }
            }
            Err(e) => {
                tracing::debug!("highlight failed: {e}");
                append(&mut job, line, &font, theme.foreground);
            }
        }
    }
    job
}

fn append(job: &mut LayoutJob, text: &str, font: &FontId, color: Color32) {
    job.append(
        text,
        0.0,
        egui::TextFormat {
            font_id: font.clone(),
            color,
            ..Default::default()
        },
    );
}
