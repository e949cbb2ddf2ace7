use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use eframe::egui;

use crate::config::Config;
use crate::context_menu::{ContextMenu, MENU_SIZE, MenuEffect, MenuState};
use crate::inspector::Inspector;
use crate::model::click::{self, ClickAction, DoubleClickAction};
use crate::model::search::{self, SearchModes};
use crate::model::drag::DragTracker;
use crate::model::{ItemKey, ItemStore, Library, RowId, SlideItem, SourceRef, Workspace, selection};
use crate::notify::Notifications;
use crate::render::image_cache::{ImageCache, ImageState};
use crate::render::syntax;
use crate::server::{self, ActionOutcome, ServerAction, ServerClient};
use crate::status::{self, COMPLETED_NOTICE, StatusFeed, StatusMessage};
use crate::theme::Theme;
use crate::watch::{self, LibraryWatcher};

const ROW_HEIGHT: f32 = 24.0;
const DEFAULT_THRESHOLD: f32 = 0.3;
const PLACEHOLDER: &str = "Drag slides here to build your deck";
const EMPTY_GENERATE_NOTICE: &str = "Please collect at least one slide first.";

/// What is being carried by an egui drag.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DragPayload {
    /// The library slides captured in the workspace's drag session.
    Slides,
    Presentation(String),
    Row(RowId),
}

/// Gestures seen on slide rows, applied once the row list is no longer borrowed.
#[derive(Debug, Clone, Copy)]
enum RowEvent {
    Click(ItemKey, ClickAction),
    DoubleClick(ItemKey),
    ContextMenu(ItemKey, egui::Pos2),
    DragStart(ItemKey),
}

/// Presentation awaiting delete confirmation.
#[derive(Debug, Clone)]
struct PendingDelete {
    id: String,
    name: String,
}

struct SlidePickApp {
    library_path: PathBuf,
    config: Config,
    config_path: Option<PathBuf>,
    workspace: Workspace,
    theme: Theme,
    search_modes: SearchModes,
    thresholds: HashMap<String, f32>,
    filter: String,
    sidebar_collapsed: bool,
    languages: Vec<String>,
    language: usize,
    expanded: HashSet<String>,

    context_menu: ContextMenu,
    menu_opened_this_frame: bool,
    viewport: egui::Rect,
    inspector: Option<Inspector>,
    pending_delete: Option<PendingDelete>,
    confirm_reprocess_all: bool,
    notifications: Notifications,
    images: ImageCache,

    client: ServerClient,
    status: StatusFeed,
    status_rx: Receiver<StatusMessage>,
    outcome_tx: Sender<ActionOutcome>,
    outcome_rx: Receiver<ActionOutcome>,
    reload_rx: Receiver<()>,
    _watcher: Option<LibraryWatcher>,
}

impl SlidePickApp {
    fn new(
        ctx: &egui::Context,
        library_path: PathBuf,
        library: Library,
        base_url: String,
        config: &Config,
    ) -> Self {
        let theme = Theme::from_name(config.theme());
        theme.apply(ctx);

        let (status_tx, status_rx) = mpsc::channel();
        if let Err(e) = status::spawn_reader(&base_url, status_tx, Some(ctx.clone())) {
            tracing::warn!("could not start status stream: {e}");
        }

        let (reload_tx, reload_rx) = mpsc::channel();
        let watcher = match watch::watch_library(&library_path, reload_tx, ctx.clone()) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                tracing::warn!("library changes will not be picked up: {e:#}");
                None
            }
        };

        let (outcome_tx, outcome_rx) = mpsc::channel();
        let client = ServerClient::new(&base_url);
        let base_dir = library_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        let languages = config.languages();
        let start_language = config.language();
        let language = languages
            .iter()
            .position(|l| *l == start_language)
            .unwrap_or(0);

        let config_path = match Config::path() {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("settings will not be remembered: {e}");
                None
            }
        };

        Self {
            library_path,
            config: config.clone(),
            config_path,
            workspace: Workspace::new(library),
            theme,
            search_modes: SearchModes::restored(config.search_mode()),
            thresholds: HashMap::new(),
            filter: String::new(),
            sidebar_collapsed: config.sidebar_collapsed(),
            languages,
            language,
            expanded: HashSet::new(),
            context_menu: ContextMenu::default(),
            menu_opened_this_frame: false,
            viewport: egui::Rect::NOTHING,
            inspector: None,
            pending_delete: None,
            confirm_reprocess_all: false,
            notifications: Notifications::default(),
            images: ImageCache::new(base_dir, client.base_url()),
            client,
            status: StatusFeed::default(),
            status_rx,
            outcome_tx,
            outcome_rx,
            reload_rx,
            _watcher: watcher,
        }
    }

    fn reload_library(&mut self) {
        let library = Library::load_or_empty(&self.library_path);
        tracing::info!(
            presentations = library.presentations().len(),
            slides = library.slide_count(),
            "library reloaded"
        );
        if self.context_menu.target().is_some_and(|t| t.is_source()) {
            self.context_menu.dismiss();
        }
        self.workspace.replace_library(library);
    }

    fn dispatch(&self, ctx: &egui::Context, action: ServerAction) {
        self.client
            .dispatch(action, self.outcome_tx.clone(), ctx.clone());
    }

    /// Fold in everything the background threads sent since the last frame.
    fn drain_channels(&mut self) {
        let mut refresh = false;
        while let Ok(message) = self.status_rx.try_recv() {
            if self.status.accept(message) {
                refresh = true;
                self.notifications.success(COMPLETED_NOTICE);
            }
        }
        while self.reload_rx.try_recv().is_ok() {
            refresh = true;
        }
        if refresh {
            self.reload_library();
        }

        while let Ok(outcome) = self.outcome_rx.try_recv() {
            match outcome.result {
                Ok(()) => self
                    .notifications
                    .success(outcome.action.success_message()),
                Err(e) => self.notifications.error(e.to_string()),
            }
        }
    }

    fn handle_row_event(&mut self, event: RowEvent) {
        match event {
            RowEvent::Click(key, action) => self.apply_click(key, action),
            RowEvent::DoubleClick(key) => match click::double_click_action(key) {
                DoubleClickAction::AddToCollection => {
                    if let ItemKey::Source(source) = key {
                        self.workspace.add_to_collection(source);
                    }
                }
                DoubleClickAction::RemoveFromCollection => {
                    if let ItemKey::Collected(row) = key {
                        self.workspace.collection.remove(row);
                    }
                }
            },
            RowEvent::ContextMenu(key, pos) => {
                self.context_menu.open(key, pos, self.viewport);
                self.menu_opened_this_frame = true;
            }
            RowEvent::DragStart(key) => {
                // Collected rows are reordered through their own payload.
                if key.is_source() {
                    let session = self.workspace.begin_drag(key);
                    tracing::debug!(
                        origin = ?session.origin(),
                        members = session.len(),
                        "drag started"
                    );
                }
            }
        }
    }

    fn apply_click(&mut self, key: ItemKey, action: ClickAction) {
        match action {
            ClickAction::SelectExclusive => selection::set_exclusive(&mut self.workspace, key),
            ClickAction::ToggleSelection => selection::toggle(&mut self.workspace, key),
            ClickAction::ShowMetadata | ClickAction::ShowPreview | ClickAction::ShowRawData => {
                if let Some(item) = self.workspace.item(key) {
                    self.inspector = Inspector::for_action(action, item);
                }
            }
        }
    }

    fn apply_menu_effect(&mut self, effect: MenuEffect) {
        match effect {
            MenuEffect::Inspect(key, action) => self.apply_click(key, action),
            MenuEffect::AddToCollection(source) => {
                self.workspace.add_to_collection(source);
            }
            MenuEffect::RemoveFromCollection(row) => {
                self.workspace.collection.remove(row);
            }
            MenuEffect::Rejected(notice) => self.notifications.error(notice),
        }
    }

    fn generate(&mut self) {
        if self.workspace.collection.is_empty() {
            self.notifications.error(EMPTY_GENERATE_NOTICE);
            return;
        }
        let ids = self.workspace.collection.slide_ids();
        tracing::info!(?ids, "deck generation requested");
        self.notifications
            .success(format!("Deck generation started for {} slides.", ids.len()));
    }

    /// Store the current search mode so the next start restores it.
    fn remember_search_mode(&mut self) {
        let mode = self.search_modes.current().value.clone();
        if let Err(e) = self.config.set("defaults.search_mode", &mode) {
            tracing::warn!("{e:#}");
            return;
        }
        let Some(path) = &self.config_path else {
            return;
        };
        if let Err(e) = self.config.save_to(path) {
            tracing::warn!(path = %path.display(), "could not save search mode: {e:#}");
        }
    }

    /// Drop the workspace session once egui no longer carries a payload,
    /// which happens on Escape or a release outside any drop target.
    fn end_stale_drag(&mut self, has_payload: bool) {
        if self.workspace.drag.is_active() && !has_payload {
            if let Some(session) = self.workspace.drag.end() {
                tracing::debug!(members = session.len(), "drag cancelled");
            }
        }
    }

    /// Escape undoes the innermost thing in progress: a drag, then the menu,
    /// then the inspector, and only then the selection.
    fn handle_escape(&mut self, drag_in_flight: bool) {
        if drag_in_flight {
            self.workspace.drag.end();
        } else if self.context_menu.is_shown() {
            self.context_menu.dismiss();
        } else if self.inspector.is_some() {
            self.inspector = None;
        } else {
            selection::clear(&mut self.workspace);
        }
    }

    fn toggle_theme(&mut self, ctx: &egui::Context) {
        self.theme = self.theme.toggled();
        self.theme.apply(ctx);
    }

    fn cycle_language(&mut self, ctx: &egui::Context) {
        if self.languages.is_empty() {
            return;
        }
        self.language = (self.language + 1) % self.languages.len();
        let lang = self.languages[self.language].clone();
        self.dispatch(ctx, ServerAction::SetLanguage { lang });
    }

    fn toolbar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let mut cycle_mode = false;
        let mut save_setting = None;
        let mut toggle_sidebar = false;
        let mut toggle_theme = false;
        let mut cycle_language = false;

        ui.horizontal(|ui| {
            let mode = self.search_modes.current();
            cycle_mode = ui.button(&mode.label).on_hover_text(&mode.title).clicked();

            if let Some(key) = mode.threshold_key() {
                let value = self.thresholds.entry(key.clone()).or_insert(DEFAULT_THRESHOLD);
                let response = ui.add(
                    egui::Slider::new(value, 0.0..=1.0)
                        .step_by(0.05)
                        .text("Threshold"),
                );
                if response.drag_stopped() || (response.changed() && !response.dragged()) {
                    let value = format!("{:.2}", *value);
                    save_setting = Some(ServerAction::SaveSetting { key, value });
                }
            }

            ui.add(
                egui::TextEdit::singleline(&mut self.filter)
                    .hint_text("Filter presentations")
                    .desired_width(220.0),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                toggle_sidebar = ui
                    .button("\u{2630}")
                    .on_hover_text("Toggle library panel")
                    .clicked();
                toggle_theme = ui
                    .button(self.theme.toggle_icon())
                    .on_hover_text("Toggle theme")
                    .clicked();
                if let Some(lang) = self.languages.get(self.language) {
                    cycle_language = ui
                        .button(lang.to_uppercase())
                        .on_hover_text("Switch language")
                        .clicked();
                }
            });
        });

        if cycle_mode {
            let next = self.search_modes.cycle();
            tracing::debug!(mode = %next.value, "search mode");
            self.remember_search_mode();
        }
        if let Some(action) = save_setting {
            self.dispatch(ctx, action);
        }
        if toggle_sidebar {
            self.sidebar_collapsed = !self.sidebar_collapsed;
        }
        if toggle_theme {
            self.toggle_theme(ctx);
        }
        if cycle_language {
            self.cycle_language(ctx);
        }
    }

    fn library_panel(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let counts = search::visible_counts(&self.workspace.library, &self.filter);
        ui.horizontal(|ui| {
            ui.heading("Library");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    egui::RichText::new(counts.badge())
                        .small()
                        .color(self.theme.muted),
                );
            });
        });
        ui.separator();

        let modifiers = ui.input(|i| i.modifiers);
        let mut events = Vec::new();
        let mut toggles = Vec::new();
        let mut actions = Vec::new();
        let mut delete = None;

        egui::ScrollArea::vertical()
            .id_salt("library")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if self.workspace.library.is_empty() {
                    ui.label(egui::RichText::new("No presentations").color(self.theme.muted));
                }
                let presentations = self.workspace.library.presentations();
                for (p_index, presentation) in presentations.iter().enumerate() {
                    if !search::matches(presentation, &self.filter) {
                        continue;
                    }
                    let expanded = self.expanded.contains(&presentation.id);
                    ui.horizontal(|ui| {
                        let arrow = if expanded { "\u{25BE}" } else { "\u{25B8}" };
                        if ui.small_button(arrow).clicked() {
                            toggles.push(presentation.id.clone());
                        }
                        let header = ui
                            .add(
                                egui::Label::new(
                                    egui::RichText::new(&presentation.display_name).strong(),
                                )
                                .selectable(false)
                                .sense(egui::Sense::click_and_drag()),
                            )
                            .on_hover_text(format!(
                                "{} ({} slides)",
                                presentation.filename,
                                presentation.slides.len()
                            ));
                        header.dnd_set_drag_payload(DragPayload::Presentation(
                            presentation.id.clone(),
                        ));
                        if header.double_clicked() {
                            toggles.push(presentation.id.clone());
                        }
                        header.context_menu(|ui| {
                            let file_id = presentation.id.clone();
                            if ui.button("Reprocess").clicked() {
                                actions.push(ServerAction::ReprocessFile {
                                    file_id: file_id.clone(),
                                });
                                ui.close();
                            }
                            if ui.button("Copy to stage").clicked() {
                                actions.push(ServerAction::CopyToStage {
                                    file_id: file_id.clone(),
                                });
                                ui.close();
                            }
                            ui.separator();
                            if ui.button("Delete\u{2026}").clicked() {
                                delete = Some(PendingDelete {
                                    id: file_id,
                                    name: presentation.display_name.clone(),
                                });
                                ui.close();
                            }
                        });
                    });

                    if !expanded {
                        continue;
                    }
                    for (s_index, item) in presentation.slides.iter().enumerate() {
                        let key = ItemKey::Source(SourceRef {
                            presentation: p_index,
                            slide: s_index,
                        });
                        let dragging = self.workspace.drag.is_dragging(key);
                        let response = slide_row(ui, &self.theme, item, dragging, 28.0);
                        response.dnd_set_drag_payload(DragPayload::Slides);
                        events.extend(row_event(&response, key, modifiers));
                    }
                }
            });

        for id in toggles {
            if !self.expanded.remove(&id) {
                self.expanded.insert(id);
            }
        }
        for action in actions {
            self.dispatch(ctx, action);
        }
        if delete.is_some() {
            self.pending_delete = delete;
        }
        for event in events {
            self.handle_row_event(event);
        }
    }

    fn collection_panel(&mut self, ui: &mut egui::Ui) {
        let zone_rect = ui.max_rect();
        let collection = &self.workspace.collection;
        let any_selected = collection.rows().iter().any(|r| r.item.selected);
        let is_empty = collection.is_empty();

        let mut clear = false;
        let mut remove_selected = false;
        let mut generate = false;
        ui.horizontal(|ui| {
            ui.heading("Collection");
            ui.label(
                egui::RichText::new(format!("{} slides", collection.len()))
                    .small()
                    .color(self.theme.muted),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                generate = ui.button("Generate deck").clicked();
                remove_selected = ui
                    .add_enabled(any_selected, egui::Button::new("Remove selected"))
                    .clicked();
                clear = ui.add_enabled(!is_empty, egui::Button::new("Clear")).clicked();
            });
        });
        ui.separator();

        let modifiers = ui.input(|i| i.modifiers);
        let mut events = Vec::new();
        let mut row_rects = Vec::new();

        egui::ScrollArea::vertical()
            .id_salt("collection")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if self.workspace.collection.shows_placeholder() {
                    ui.add_space(48.0);
                    ui.vertical_centered(|ui| {
                        ui.label(egui::RichText::new(PLACEHOLDER).color(self.theme.muted));
                    });
                }
                for entry in self.workspace.collection.rows() {
                    let key = ItemKey::Collected(entry.row);
                    let payload = DragPayload::Row(entry.row);
                    let carried = egui::DragAndDrop::payload::<DragPayload>(ui.ctx());
                    let dragging =
                        shows_drag_marker(&self.workspace.drag, entry.row, carried.as_deref());
                    let response = slide_row(ui, &self.theme, &entry.item, dragging, 8.0);
                    response.dnd_set_drag_payload(payload);
                    row_rects.push(response.rect);
                    events.extend(row_event(&response, key, modifiers));
                }
            });

        for event in events {
            self.handle_row_event(event);
        }

        let zone = ui.interact(
            zone_rect,
            ui.id().with("collection-drop"),
            egui::Sense::hover(),
        );
        let pointer_y = ui.ctx().pointer_latest_pos().map(|p| p.y);
        let centers: Vec<f32> = row_rects.iter().map(|r| r.center().y).collect();
        let gap = pointer_y.map_or(centers.len(), |y| drop_gap(&centers, y));

        if let Some(hovered) = zone.dnd_hover_payload::<DragPayload>() {
            let y = match (row_rects.get(gap), row_rects.last()) {
                (Some(rect), _) => rect.top() - 1.0,
                (None, Some(last)) => last.bottom() + 1.0,
                (None, None) => zone_rect.top() + 48.0,
            };
            let painter = ui.painter();
            painter.hline(
                zone_rect.x_range(),
                y,
                egui::Stroke::new(2.0, self.theme.drop_marker),
            );
            if let (DragPayload::Slides, Some(session)) = (&*hovered, self.workspace.drag.session()) {
                painter.text(
                    egui::pos2(zone_rect.right() - 8.0, y - 2.0),
                    egui::Align2::RIGHT_BOTTOM,
                    format!("+{}", session.len()),
                    egui::FontId::proportional(12.0),
                    self.theme.drop_marker,
                );
            }
        }

        if let Some(payload) = zone.dnd_release_payload::<DragPayload>() {
            match &*payload {
                DragPayload::Slides => {
                    let rows = self.workspace.drop_session(gap);
                    tracing::debug!(inserted = rows.len(), gap, "slides dropped");
                }
                DragPayload::Presentation(id) => {
                    self.workspace.drop_presentation(id);
                }
                DragPayload::Row(row) => {
                    self.workspace.collection.move_row_to_gap(*row, gap);
                }
            }
        }

        if clear {
            self.workspace.collection.clear();
        }
        if remove_selected {
            let removed = self.workspace.collection.remove_selected();
            tracing::debug!(removed, "removed selected rows");
        }
        if generate {
            self.generate();
        }
    }

    fn status_bar(&mut self, ui: &mut egui::Ui) {
        let mut reprocess_all = false;
        ui.horizontal(|ui| {
            let (text, color, elapsed) = match self.status.latest() {
                Some(message) if message.is_processing => {
                    (message.status_text(), self.theme.warning, message.elapsed())
                }
                Some(message) => (message.status_text(), self.theme.success, None),
                None => ("Ready".to_string(), self.theme.muted, None),
            };
            ui.colored_label(color, "\u{25CF}");
            ui.label(text);
            if let Some(elapsed) = elapsed {
                ui.label(egui::RichText::new(elapsed).monospace());
            }
            let processing = self.status.latest().is_some_and(|m| m.is_processing);
            if !processing {
                let count = self.workspace.library.presentations().len();
                let color = if count > server::REPROCESS_WARNING_THRESHOLD {
                    self.theme.danger
                } else {
                    self.theme.muted
                };
                reprocess_all = ui
                    .button(egui::RichText::new("\u{21BB}").color(color))
                    .on_hover_text("Reprocess all files")
                    .clicked();
            }
            if let Some(log) = self.status.last_log() {
                ui.separator();
                ui.label(egui::RichText::new(log).small().color(self.theme.muted));
            }
        });
        if reprocess_all {
            self.confirm_reprocess_all = true;
        }
    }

    fn reprocess_confirmation(&mut self, ctx: &egui::Context) {
        if !self.confirm_reprocess_all {
            return;
        }
        let count = self.workspace.library.presentations().len();
        let danger = count > server::REPROCESS_WARNING_THRESHOLD;
        let mut confirmed = false;
        let mut cancelled = false;
        egui::Window::new("Reprocess all files")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                let warning = server::reprocess_all_warning(count);
                if danger {
                    ui.label(egui::RichText::new(warning).color(self.theme.danger));
                } else {
                    ui.label(warning);
                }
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    confirmed = ui.button("Reprocess").clicked();
                    cancelled = ui.button("Cancel").clicked();
                });
            });
        if confirmed {
            self.confirm_reprocess_all = false;
            tracing::info!(count, "reprocessing all files");
            self.dispatch(ctx, ServerAction::ReprocessAll);
        } else if cancelled {
            self.confirm_reprocess_all = false;
        }
    }

    fn context_menu_overlay(&mut self, ctx: &egui::Context) {
        let MenuState::Shown { pos, .. } = self.context_menu.state() else {
            return;
        };
        let mut chosen = None;
        let area = egui::Area::new(egui::Id::new("slide-context-menu"))
            .order(egui::Order::Foreground)
            .fixed_pos(pos)
            .show(ctx, |ui| {
                egui::Frame::menu(ui.style()).show(ui, |ui| {
                    ui.set_min_width(MENU_SIZE.x - 16.0);
                    for action in self.context_menu.entries() {
                        if ui.button(action.label()).clicked() {
                            chosen = Some(action);
                        }
                    }
                });
            });

        self.context_menu.set_measured_size(area.response.rect.size());

        if let Some(action) = chosen {
            if let Some(effect) = self.context_menu.choose(action) {
                self.apply_menu_effect(effect);
            }
        } else if !self.menu_opened_this_frame && area.response.clicked_elsewhere() {
            self.context_menu.dismiss();
        }
    }

    fn inspector_window(&mut self, ctx: &egui::Context) {
        let Some(inspector) = self.inspector.clone() else {
            return;
        };
        let mut open = true;
        egui::Window::new(inspector.title())
            .id(egui::Id::new("inspector"))
            .open(&mut open)
            .collapsible(false)
            .default_size([560.0, 420.0])
            .show(ctx, |ui| match &inspector {
                Inspector::Metadata {
                    summary, content, ..
                } => {
                    ui.label(egui::RichText::new("Summary").strong());
                    ui.label(summary);
                    ui.separator();
                    ui.label(egui::RichText::new("Content").strong());
                    egui::ScrollArea::vertical()
                        .max_height(280.0)
                        .show(ui, |ui| ui.label(content));
                }
                Inspector::Preview { path, .. } => match self.images.get(ctx, path) {
                    ImageState::Ready(texture) => {
                        ui.add(
                            egui::Image::from_texture(egui::load::SizedTexture::from_handle(
                                texture,
                            ))
                            .max_size(ui.available_size())
                            .maintain_aspect_ratio(true),
                        );
                    }
                    ImageState::Loading => {
                        ui.spinner();
                    }
                    ImageState::Failed => {
                        ui.label(
                            egui::RichText::new("Preview unavailable").color(self.theme.danger),
                        );
                    }
                },
                Inspector::RawData { json, .. } => {
                    egui::ScrollArea::both()
                        .max_height(340.0)
                        .show(ui, |ui| ui.label(syntax::highlight_json(json, &self.theme, 13.0)));
                    if ui.button("Copy").clicked() {
                        ui.ctx().copy_text(json.clone());
                        self.notifications.info("Copied to clipboard");
                    }
                }
            });
        if !open {
            self.inspector = None;
        }
    }

    fn delete_confirmation(&mut self, ctx: &egui::Context) {
        let Some(pending) = self.pending_delete.clone() else {
            return;
        };
        let mut confirmed = false;
        let mut cancelled = false;
        egui::Window::new("Delete presentation")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!(
                    "Delete \"{}\" from the server? This cannot be undone.",
                    pending.name
                ));
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    confirmed = ui
                        .button(egui::RichText::new("Delete").color(self.theme.danger))
                        .clicked();
                    cancelled = ui.button("Cancel").clicked();
                });
            });
        if confirmed {
            self.pending_delete = None;
            self.dispatch(ctx, ServerAction::DeleteFile { file_id: pending.id });
        } else if cancelled {
            self.pending_delete = None;
        }
    }

    fn draw_toasts(&self, ctx: &egui::Context) {
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Tooltip,
            egui::Id::new("toasts"),
        ));
        let now = Instant::now();
        let padding = 12.0;
        let mut bottom = self.viewport.bottom() - 40.0;

        for toast in self.notifications.iter().rev() {
            let opacity = toast.opacity_at(now);
            if opacity <= 0.0 {
                continue;
            }
            let text_color = Theme::with_opacity(self.theme.foreground, opacity);
            let galley = painter.layout_no_wrap(
                toast.message.clone(),
                egui::FontId::proportional(14.0),
                text_color,
            );
            let size = galley.size() + egui::vec2(padding * 2.0 + 6.0, padding * 2.0);
            let rect = egui::Rect::from_min_size(
                egui::pos2(self.viewport.right() - size.x - 16.0, bottom - size.y),
                size,
            );
            painter.rect_filled(
                rect,
                6.0,
                Theme::with_opacity(self.theme.code_background, opacity * 0.95),
            );
            painter.rect_filled(
                egui::Rect::from_min_size(rect.min, egui::vec2(4.0, rect.height())),
                2.0,
                Theme::with_opacity(self.theme.toast_color(toast.kind), opacity),
            );
            painter.galley(rect.min + egui::vec2(padding + 6.0, padding), galley, text_color);
            bottom = rect.top() - 8.0;
        }
    }
}

impl eframe::App for SlidePickApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.viewport = ctx.available_rect();
        self.menu_opened_this_frame = false;
        self.drain_channels();

        let has_payload = egui::DragAndDrop::has_any_payload(ctx);
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            let drag_in_flight = has_payload || self.workspace.drag.is_active();
            if has_payload {
                egui::DragAndDrop::clear_payload(ctx);
            }
            self.handle_escape(drag_in_flight);
        } else {
            self.end_stale_drag(has_payload);
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_space(4.0);
            self.toolbar(ctx, ui);
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            self.status_bar(ui);
        });

        if !self.sidebar_collapsed {
            egui::SidePanel::left("library")
                .resizable(true)
                .default_width(320.0)
                .show(ctx, |ui| {
                    self.library_panel(ctx, ui);
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.collection_panel(ui);
        });

        self.context_menu_overlay(ctx);
        self.inspector_window(ctx);
        self.delete_confirmation(ctx);
        self.reprocess_confirmation(ctx);

        self.notifications.expire(Instant::now());
        self.draw_toasts(ctx);
        if let Some(after) = self.notifications.next_repaint() {
            ctx.request_repaint_after(after);
        }
        if self.status.latest().is_some_and(|m| m.is_processing) {
            ctx.request_repaint_after(Duration::from_secs(1));
        }
    }
}

/// Paint one slide row and return its response.
fn slide_row(
    ui: &mut egui::Ui,
    theme: &Theme,
    item: &SlideItem,
    dragging: bool,
    indent: f32,
) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), ROW_HEIGHT),
        egui::Sense::click_and_drag(),
    );
    let opacity = if dragging { 0.4 } else { 1.0 };
    let painter = ui.painter();
    if item.selected {
        painter.rect_filled(rect, 4.0, Theme::with_opacity(theme.selection, opacity));
    } else if response.hovered() {
        painter.rect_filled(rect, 4.0, Theme::with_opacity(theme.muted, 0.15));
    }
    painter.text(
        rect.left_center() + egui::vec2(indent, 0.0),
        egui::Align2::LEFT_CENTER,
        &item.display_label,
        egui::FontId::proportional(14.0),
        Theme::with_opacity(theme.foreground, opacity),
    );
    response
}

fn row_event(response: &egui::Response, key: ItemKey, modifiers: egui::Modifiers) -> Option<RowEvent> {
    if response.drag_started() {
        Some(RowEvent::DragStart(key))
    } else if response.double_clicked() {
        Some(RowEvent::DoubleClick(key))
    } else if response.clicked() {
        Some(RowEvent::Click(key, click::click_action(modifiers)))
    } else if response.secondary_clicked() {
        let pos = response
            .interact_pointer_pos()
            .unwrap_or_else(|| response.rect.left_bottom());
        Some(RowEvent::ContextMenu(key, pos))
    } else {
        None
    }
}

/// A collected row is faded while egui carries it or while it belongs to the
/// workspace's drag session.
fn shows_drag_marker(drag: &DragTracker, row: RowId, carried: Option<&DragPayload>) -> bool {
    carried.is_some_and(|p| *p == DragPayload::Row(row))
        || drag.is_dragging(ItemKey::Collected(row))
}

/// Insertion index for a drop at height `y`, given the row centres top to bottom.
fn drop_gap(centers: &[f32], y: f32) -> usize {
    centers.iter().take_while(|c| **c < y).count()
}

pub fn run(library_path: PathBuf, server: Option<String>, windowed: bool) -> anyhow::Result<()> {
    let config = Config::load_or_default();
    let base_url = server.unwrap_or_else(|| config.server_url().to_string());
    let library = Library::load_or_empty(&library_path);
    tracing::info!(
        path = %library_path.display(),
        presentations = library.presentations().len(),
        %base_url,
        "starting"
    );

    let title = format!(
        "slidepick \u{00b7} {}",
        library_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
    );

    let viewport = if windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title(&title)
    } else {
        egui::ViewportBuilder::default()
            .with_maximized(true)
            .with_title(&title)
    };

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            let app = SlidePickApp::new(&cc.egui_ctx, library_path, library, base_url, &config);
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context_menu::REMOVE_FROM_SOURCE_NOTICE;
    use crate::model::fixtures::{library, src};

    /// An app over the fixture library. Nothing listens on port 9, so the
    /// status reader gives up at once.
    fn app(name: &str) -> SlidePickApp {
        let dir = std::env::temp_dir().join(format!("slidepick-app-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut app = SlidePickApp::new(
            &egui::Context::default(),
            dir.join("library.json"),
            library(),
            "http://127.0.0.1:9".to_string(),
            &Config::default(),
        );
        app.config_path = Some(dir.join("config.yaml"));
        app
    }

    fn cleanup(app: &SlidePickApp) {
        if let Some(dir) = app.library_path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_release_outside_target_clears_marker() {
        let mut app = app("release");
        app.workspace.begin_drag(src(0, 1));
        app.end_stale_drag(true);
        assert!(app.workspace.drag.is_dragging(src(0, 1)));

        app.end_stale_drag(false);
        assert!(!app.workspace.drag.is_active());
        assert!(!app.workspace.drag.is_dragging(src(0, 1)));
        assert!(app.workspace.collection.is_empty());
        cleanup(&app);
    }

    #[test]
    fn test_escape_cancels_drag_but_keeps_selection() {
        let mut app = app("escape");
        selection::toggle(&mut app.workspace, src(0, 0));
        selection::toggle(&mut app.workspace, src(0, 2));
        app.workspace.begin_drag(src(0, 0));

        app.handle_escape(true);
        assert!(!app.workspace.drag.is_active());
        assert_eq!(selection::current(&app.workspace), vec![src(0, 0), src(0, 2)]);

        // With nothing in flight, Escape clears the selection.
        app.handle_escape(false);
        assert!(selection::current(&app.workspace).is_empty());
        cleanup(&app);
    }

    #[test]
    fn test_escape_closes_menu_before_selection() {
        let mut app = app("escape-menu");
        selection::toggle(&mut app.workspace, src(1, 0));
        app.context_menu.open(
            src(1, 0),
            egui::pos2(10.0, 10.0),
            egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(800.0, 600.0)),
        );
        app.handle_escape(false);
        assert!(!app.context_menu.is_shown());
        assert!(selection::is_selected(&app.workspace, src(1, 0)));
        cleanup(&app);
    }

    #[test]
    fn test_rejected_remove_shows_notice() {
        let mut app = app("rejected");
        app.apply_menu_effect(MenuEffect::Rejected(REMOVE_FROM_SOURCE_NOTICE));
        assert_eq!(app.notifications.len(), 1);
        assert_eq!(
            app.notifications.iter().next().unwrap().message,
            REMOVE_FROM_SOURCE_NOTICE
        );
        assert!(app.workspace.collection.is_empty());
        cleanup(&app);
    }

    #[test]
    fn test_selected_collected_rows_carry_marker() {
        let mut app = app("marker");
        let row = app
            .workspace
            .add_to_collection(SourceRef {
                presentation: 0,
                slide: 0,
            })
            .unwrap();
        selection::toggle(&mut app.workspace, ItemKey::Collected(row));
        selection::toggle(&mut app.workspace, src(1, 1));

        assert!(!shows_drag_marker(&app.workspace.drag, row, None));
        app.workspace.begin_drag(src(1, 1));
        assert!(shows_drag_marker(&app.workspace.drag, row, None));

        app.workspace.drag.end();
        assert!(!shows_drag_marker(&app.workspace.drag, row, None));
        assert!(shows_drag_marker(
            &app.workspace.drag,
            row,
            Some(&DragPayload::Row(row))
        ));
        assert!(!shows_drag_marker(
            &app.workspace.drag,
            row,
            Some(&DragPayload::Slides)
        ));
        cleanup(&app);
    }

    #[test]
    fn test_cycled_search_mode_is_saved() {
        let mut app = app("search-mode");
        app.search_modes.cycle();
        app.remember_search_mode();

        let path = app.config_path.clone().unwrap();
        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.search_mode(), Some("similarity"));
        assert_eq!(
            SearchModes::restored(saved.search_mode()).current().value,
            "similarity"
        );
        cleanup(&app);
    }

    #[test]
    fn test_drop_gap() {
        let centers = [10.0, 34.0, 58.0];
        assert_eq!(drop_gap(&centers, 0.0), 0);
        assert_eq!(drop_gap(&centers, 20.0), 1);
        assert_eq!(drop_gap(&centers, 40.0), 2);
        assert_eq!(drop_gap(&centers, 500.0), 3);
        assert_eq!(drop_gap(&[], 12.0), 0);
    }
}
