//! Main application UI.
//! Selection screen for sets and options, and the study screen that renders
//! whatever the session controller pushes to it.

use eframe::egui;
use flashcard_tool::catalog::{self, csv_store};
use flashcard_tool::config::{AppConfig, CatalogSource};
use flashcard_tool::models::{CardSet, SessionOptions};
use flashcard_tool::session::{
    CardPosition, MonotonicClock, SessionController, SessionEvent, build_deck_default,
};
use flashcard_tool::speech::speaker_from_config;
use flashcard_tool::{CatalogError, SessionError};
use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver};

/// Application screen states
#[derive(Default)]
enum AppScreen {
    #[default]
    Selection,
    Study,
}

/// User intents forwarded to the session controller
#[derive(Clone, Copy, Debug)]
enum Intent {
    Flip,
    Next,
    Back,
    TogglePause,
    Quit,
}

pub struct FlashcardApp {
    config: AppConfig,
    catalog: Vec<CardSet>,
    enabled: HashSet<String>,
    options: SessionOptions,
    interval_text: String,
    interval_error: Option<String>,
    status_message: Option<String>,

    current_screen: AppScreen,
    session: Option<SessionController>,
    events: Option<Receiver<SessionEvent>>,
    shown_face: String,
    shown_position: Option<CardPosition>,
    timer_paused: bool,

    show_export_dialog: bool,
    show_result_dialog: bool,
    result_message: String,
}

impl eframe::App for FlashcardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pump_session(ctx);

        match self.current_screen {
            AppScreen::Selection => self.render_selection_screen(ctx),
            AppScreen::Study => self.render_study_screen(ctx),
        }

        if self.show_export_dialog {
            let mut export_index: Option<usize> = None;
            let mut should_cancel = false;

            egui::Window::new("Export Set")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label("Select a set to export:");
                    ui.separator();

                    for (i, set) in self.catalog.iter().enumerate() {
                        if ui
                            .button(format!("{} ({} cards)", set.name, set.cards.len()))
                            .clicked()
                        {
                            export_index = Some(i);
                        }
                    }

                    ui.separator();

                    if ui.button("Cancel").clicked() {
                        should_cancel = true;
                    }
                });

            if let Some(i) = export_index {
                self.handle_export(i);
            }
            if should_cancel {
                self.show_export_dialog = false;
            }
        }

        if self.show_result_dialog {
            egui::Window::new("Import/Export Result")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(&self.result_message);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.show_result_dialog = false;
                    }
                });
        }
    }
}

impl FlashcardApp {
    pub fn new(config: AppConfig, catalog: Vec<CardSet>) -> Self {
        let options = config.session.clone();
        let interval_text = options.autoflip_interval_seconds.to_string();
        Self {
            config,
            catalog,
            enabled: HashSet::new(),
            options,
            interval_text,
            interval_error: None,
            status_message: None,
            current_screen: AppScreen::Selection,
            session: None,
            events: None,
            shown_face: String::new(),
            shown_position: None,
            timer_paused: false,
            show_export_dialog: false,
            show_result_dialog: false,
            result_message: String::new(),
        }
    }

    /// Fires a due autoflip, applies pushed events and schedules the next repaint
    fn pump_session(&mut self, ctx: &egui::Context) {
        if let Some(session) = &mut self.session {
            if let Err(e) = session.poll() {
                tracing::warn!("Autoflip failed: {}", e);
            }
            if let Some(wait) = session.time_until_timer() {
                ctx.request_repaint_after(wait);
            }
        }
        self.drain_events();
    }

    fn drain_events(&mut self) {
        let events: Vec<SessionEvent> = self
            .events
            .as_ref()
            .map(|rx| rx.try_iter().collect())
            .unwrap_or_default();

        for event in events {
            match event {
                SessionEvent::CardShown { face, position } => {
                    self.shown_face = face;
                    self.shown_position = Some(position);
                }
                SessionEvent::PauseStateChanged(paused) => self.timer_paused = paused,
                SessionEvent::SessionEnded => self.end_session(),
            }
        }
    }

    fn end_session(&mut self) {
        self.session = None;
        self.events = None;
        self.shown_face.clear();
        self.shown_position = None;
        self.timer_paused = false;
        self.current_screen = AppScreen::Selection;
    }

    /// Renders the set list and session options
    fn render_selection_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("RELOAD").clicked() {
                    self.reload_catalog();
                }
                if ui.button("Import CSV").clicked() {
                    self.handle_import();
                }
                if ui.button("Export Set").clicked() {
                    self.show_export_dialog = true;
                }
            });

            ui.separator();

            ui.heading(format!("Flashcard Sets ({})", self.catalog.len()));

            // Toggles are applied after rendering to avoid borrowing conflicts
            let mut toggles: Vec<(String, bool)> = Vec::new();

            egui::ScrollArea::vertical()
                .id_salt("sets_list")
                .max_height(300.0)
                .show(ui, |ui| {
                    if self.catalog.is_empty() {
                        ui.label("No flashcard sets found");
                    }
                    for set in &self.catalog {
                        let mut checked = self.enabled.contains(&set.name);
                        let studyable = set.studyable().count();
                        if ui
                            .checkbox(&mut checked, format!("{} ({} cards)", set.name, studyable))
                            .changed()
                        {
                            toggles.push((set.name.clone(), checked));
                        }
                    }
                });

            for (name, checked) in toggles {
                if checked {
                    self.enabled.insert(name);
                } else {
                    self.enabled.remove(&name);
                }
            }

            ui.separator();

            ui.checkbox(&mut self.options.read_aloud, "Read Text Aloud");
            ui.checkbox(&mut self.options.definition_first, "Show Definition First");
            ui.checkbox(&mut self.options.randomize, "Random Order");

            ui.horizontal(|ui| {
                ui.checkbox(&mut self.options.autoflip, "Autoflip After");
                let stroke = if self.interval_error.is_some() {
                    egui::Stroke::new(2.0, egui::Color32::RED)
                } else {
                    egui::Stroke::NONE
                };
                egui::Frame::none().stroke(stroke).show(ui, |ui| {
                    ui.add(egui::TextEdit::singleline(&mut self.interval_text).desired_width(50.0));
                });
                ui.label("seconds");
            });

            if let Some(error) = &self.interval_error {
                ui.colored_label(egui::Color32::LIGHT_RED, error);
            }

            ui.add_space(10.0);

            if ui.button("START").clicked() {
                self.start_session();
            }

            if let Some(message) = &self.status_message {
                ui.colored_label(egui::Color32::LIGHT_RED, message);
            }
        });
    }

    /// Renders the current card and the session controls
    fn render_study_screen(&mut self, ctx: &egui::Context) {
        let mut intent: Option<Intent> = None;

        let (flipped, showing_term, autoflip, can_go_back) = match &self.session {
            Some(session) => (
                session.is_flipped(),
                session.is_flipped() == session.options().definition_first,
                session.options().autoflip,
                session.cursor().is_some_and(|c| c > 0),
            ),
            None => (false, true, false, false),
        };

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("QUIT").clicked() {
                    intent = Some(Intent::Quit);
                }
                if autoflip {
                    let label = if self.timer_paused { "RESUME" } else { "PAUSE" };
                    if ui.button(label).clicked() {
                        intent = Some(Intent::TogglePause);
                    }
                }
                if let Some(position) = self.shown_position {
                    ui.label(position.to_string());
                }
            });

            ui.add_space(40.0);

            ui.group(|ui| {
                ui.set_min_height(250.0);
                ui.vertical_centered(|ui| {
                    ui.add_space(80.0);
                    let mut text = egui::RichText::new(&self.shown_face).size(28.0);
                    if showing_term {
                        text = text.strong();
                    }
                    ui.label(text);
                });
            });

            ui.add_space(20.0);

            ui.horizontal(|ui| {
                if ui.add_enabled(can_go_back, egui::Button::new("BACK")).clicked() {
                    intent = Some(Intent::Back);
                }
                if ui.button("FLIP").clicked() {
                    intent = Some(Intent::Flip);
                }
                if flipped && ui.button("NEXT").clicked() {
                    intent = Some(Intent::Next);
                }
            });
        });

        ctx.input(|i| {
            if i.key_pressed(egui::Key::Space) {
                intent = Some(Intent::Flip);
            } else if i.key_pressed(egui::Key::ArrowRight) {
                intent = Some(Intent::Next);
            } else if i.key_pressed(egui::Key::ArrowLeft) {
                intent = Some(Intent::Back);
            } else if i.key_pressed(egui::Key::Escape) {
                intent = Some(Intent::Quit);
            }
        });

        if let Some(intent) = intent {
            self.apply_intent(intent);
        }
    }

    fn apply_intent(&mut self, intent: Intent) {
        let Some(session) = &mut self.session else {
            return;
        };
        let result = match intent {
            Intent::Flip => session.flip(),
            Intent::Next => session.next(),
            Intent::Back => session.back(),
            Intent::TogglePause => session.toggle_pause_timer(),
            Intent::Quit => session.quit(),
        };
        if let Err(e) = result {
            tracing::warn!("Ignoring {:?}: {}", intent, e);
        }
        self.drain_events();
    }

    /// Builds the deck from the checked sets and starts a session
    fn start_session(&mut self) {
        self.status_message = None;
        self.interval_error = None;

        if self.options.autoflip {
            match SessionOptions::parse_interval(&self.interval_text) {
                Ok(secs) => self.options.autoflip_interval_seconds = secs,
                Err(e) => {
                    self.interval_error = Some(e.to_string());
                    return;
                }
            }
        }

        let deck = build_deck_default(&self.catalog, &self.enabled, &self.options);
        tracing::info!("Number of cards selected: {}", deck.len());

        let (tx, rx) = mpsc::channel();
        let speaker = speaker_from_config(&self.config.speech, self.options.read_aloud);
        let mut controller = SessionController::new(
            self.options.clone(),
            Box::new(MonotonicClock::new()),
            Box::new(tx),
            speaker,
        );

        match controller.start(deck) {
            Ok(()) => {
                self.session = Some(controller);
                self.events = Some(rx);
                self.timer_paused = false;
                self.current_screen = AppScreen::Study;
                self.drain_events();
            }
            Err(SessionError::EmptyDeck) => {
                self.status_message = Some("Nothing selected".to_string());
            }
            Err(SessionError::Configuration(message)) => {
                self.interval_error = Some(message);
            }
            Err(e) => {
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Refreshes from Notion (if configured) and reloads the local sets
    fn reload_catalog(&mut self) {
        self.catalog = catalog::load_catalog(&self.config);
        self.forget_missing_sets();
    }

    fn reload_local(&mut self) {
        match catalog::load_local(&self.config) {
            Ok(sets) => self.catalog = sets,
            Err(e) => tracing::warn!("Failed to reload local flashcard sets: {}", e),
        }
        self.forget_missing_sets();
    }

    fn forget_missing_sets(&mut self) {
        let names: HashSet<&str> = self.catalog.iter().map(|s| s.name.as_str()).collect();
        self.enabled.retain(|name| names.contains(name.as_str()));
    }

    /// Handles set export to a CSV file
    fn handle_export(&mut self, set_index: usize) {
        if let Some(set) = self.catalog.get(set_index) {
            // Open file save dialog
            if let Some(path) = rfd::FileDialog::new()
                .set_file_name(format!("{}.csv", set.name))
                .add_filter("CSV files", &["csv"])
                .save_file()
            {
                self.result_message = match csv_store::write_set_to(&path, set) {
                    Ok(()) => format!("Set '{}' exported successfully!", set.name),
                    Err(e) => format!("Export failed: {}", e),
                };
                self.show_result_dialog = true;
            }
        }
        self.show_export_dialog = false;
    }

    /// Handles set import from a CSV file
    fn handle_import(&mut self) {
        // Open file selection dialog
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV files", &["csv"])
            .pick_file()
        else {
            return;
        };

        let result: Result<CardSet, CatalogError> = match self.config.catalog.source {
            CatalogSource::Csv => csv_store::import_file(&path, &self.config.catalog.csv_dir),
            CatalogSource::Sqlite => csv_store::read_set(&path).and_then(|set| {
                catalog::persist_sets(&self.config, std::slice::from_ref(&set))?;
                Ok(set)
            }),
        };

        self.result_message = match result {
            Ok(set) => format!(
                "Set '{}' imported successfully with {} cards!",
                set.name,
                set.cards.len()
            ),
            Err(e) => format!(
                "Import failed: {}\n\nPlease check the file has a Term,Definition,Exclude header.",
                e
            ),
        };
        self.show_result_dialog = true;
        self.reload_local();
    }
}
