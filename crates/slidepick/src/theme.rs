use eframe::egui::{self, Color32};

use crate::notify::ToastKind;

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub background: Color32,
    pub panel: Color32,
    pub foreground: Color32,
    pub muted: Color32,
    pub accent: Color32,
    pub selection: Color32,
    pub drop_marker: Color32,
    pub success: Color32,
    pub warning: Color32,
    pub danger: Color32,
    pub code_background: Color32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: Color32::from_rgb(0x1E, 0x1E, 0x1E),
            panel: Color32::from_rgb(0x25, 0x25, 0x28),
            foreground: Color32::from_rgb(0xC8, 0xC8, 0xC8),
            muted: Color32::from_rgb(0x80, 0x80, 0x88),
            accent: Color32::from_rgb(0x52, 0x94, 0xE2),
            selection: Color32::from_rgb(0x26, 0x4F, 0x78),
            drop_marker: Color32::from_rgb(0x5C, 0xB8, 0xFF),
            success: Color32::from_rgb(0x5C, 0xDB, 0x95),
            warning: Color32::from_rgb(0xE8, 0xA8, 0x38),
            danger: Color32::from_rgb(0xFF, 0x7E, 0x67),
            code_background: Color32::from_rgb(0x2D, 0x2D, 0x2D),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: Color32::WHITE,
            panel: Color32::from_rgb(0xF5, 0xF6, 0xF8),
            foreground: Color32::from_rgb(0x1A, 0x1A, 0x2E),
            muted: Color32::from_rgb(0x6B, 0x6B, 0x7B),
            accent: Color32::from_rgb(0x0F, 0x34, 0x60),
            selection: Color32::from_rgb(0xCF, 0xE2, 0xF7),
            drop_marker: Color32::from_rgb(0x1A, 0x6B, 0xB5),
            success: Color32::from_rgb(0x1E, 0x8A, 0x5A),
            warning: Color32::from_rgb(0xB8, 0x7B, 0x0A),
            danger: Color32::from_rgb(0xC7, 0x3E, 0x1D),
            code_background: Color32::from_rgb(0xF5, 0xF5, 0xF5),
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "dark" => Self::dark(),
            _ => Self::light(),
        }
    }

    pub fn is_dark(&self) -> bool {
        self.name == "dark"
    }

    pub fn toggled(&self) -> Self {
        if self.is_dark() {
            Self::light()
        } else {
            Self::dark()
        }
    }

    /// Icon for the toggle button: the theme you would switch to.
    pub fn toggle_icon(&self) -> &'static str {
        if self.is_dark() { "\u{2600}" } else { "\u{263E}" }
    }

    /// Apply opacity to a color
    pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
        Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), (opacity * 255.0) as u8)
    }

    pub fn toast_color(&self, kind: ToastKind) -> Color32 {
        match kind {
            ToastKind::Info => self.accent,
            ToastKind::Success => self.success,
            ToastKind::Error => self.danger,
        }
    }

    /// Return the syntect theme name that matches this theme.
    pub fn syntect_theme_name(&self) -> &str {
        if self.is_dark() {
            "base16-ocean.dark"
        } else {
            "InspiredGitHub"
        }
    }

    /// Install matching egui visuals.
    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = if self.is_dark() {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        visuals.panel_fill = self.panel;
        visuals.window_fill = self.background;
        visuals.extreme_bg_color = self.code_background;
        visuals.selection.bg_fill = self.selection;
        visuals.hyperlink_color = self.accent;
        ctx.set_visuals(visuals);
    }
}
