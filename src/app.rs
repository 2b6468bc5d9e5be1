use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Instant;

use eframe::egui;
use zimcare::config::AppConfig;
use zimcare::data::geo::GeoPoint;
use zimcare::data::loader::{self, LoadOutcome};
use zimcare::error::LocationError;
use zimcare::location;
use zimcare::state::{AppState, ViewMode};

use crate::ui::{map, panels, results};

/// Requests from the panels that need the worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Reload,
    Locate,
}

/// Results sent back by worker threads.
enum Message {
    Loaded { generation: u64, outcome: LoadOutcome },
    Located(Result<GeoPoint, LocationError>),
}

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ZimcareApp {
    pub state: AppState,
    tx: Sender<Message>,
    rx: Receiver<Message>,
}

impl ZimcareApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut app = Self {
            state: AppState::new(config),
            tx,
            rx,
        };
        app.reload(&cc.egui_ctx);
        app
    }

    /// Walk the configured sources on a worker thread.
    fn reload(&mut self, ctx: &egui::Context) {
        let generation = self.state.begin_load();
        let sources = self.state.config.sources.clone();
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        thread::spawn(move || {
            let outcome = loader::load(&sources);
            if tx.send(Message::Loaded { generation, outcome }).is_err() {
                log::debug!("UI closed before load {generation} finished");
            }
            ctx.request_repaint();
        });
    }

    fn locate(&mut self, ctx: &egui::Context) {
        if self.state.locating {
            return;
        }
        self.state.locating = true;
        let endpoint = self.state.config.location_endpoint.clone();
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        thread::spawn(move || {
            let result = location::locate_by_ip(&endpoint);
            if tx.send(Message::Located(result)).is_err() {
                log::debug!("UI closed before location lookup finished");
            }
            ctx.request_repaint();
        });
    }

    fn drain_messages(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            match message {
                Message::Loaded { generation, outcome } => {
                    self.state.finish_load(generation, outcome);
                }
                Message::Located(Ok(point)) => self.state.set_location(point),
                Message::Located(Err(e)) => self.state.location_failed(&e),
            }
        }
    }
}

impl eframe::App for ZimcareApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_messages();
        self.state.poll_search(Instant::now());

        let mut actions: Vec<Action> = Vec::new();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            actions.extend(panels::top_bar(ui, &mut self.state));
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                actions.extend(panels::side_panel(ui, &mut self.state));
            });

        // At most one re-query per frame, however many widgets changed.
        self.state.refresh_if_dirty();

        // ---- Central panel: cards or map ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.view {
            ViewMode::Cards => results::result_cards(ui, &self.state),
            ViewMode::Map => map::facility_map(ui, &self.state),
        });

        for action in actions {
            match action {
                Action::Reload => self.reload(ctx),
                Action::Locate => self.locate(ctx),
            }
        }

        if let Some(wait) = self.state.debounce.remaining(Instant::now()) {
            ctx.request_repaint_after(wait);
        }
    }
}
