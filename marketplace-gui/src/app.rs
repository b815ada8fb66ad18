//! Application struct — the eframe::App implementation.
//!
//! Thin wrapper: drains service events, dispatches to view modules.
//! No async, no network, no wallet logic.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::events::{ServiceEvent, UiEvent};
use crate::state::AppState;
use crate::view;

/// The marketplace application.
pub struct App {
    pub state: AppState,
    pub ui_tx: mpsc::UnboundedSender<UiEvent>,
    svc_rx: mpsc::UnboundedReceiver<ServiceEvent>,
    shutdown_token: CancellationToken,
}

impl App {
    /// Create a new App, spawning the background service task.
    /// `config_error` is shown in the error banner until the next action.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: Config,
        config_error: Option<String>,
    ) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let (svc_tx, svc_rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();

        // Spawn the single background service task
        let svc_token = token.clone();
        tokio::spawn(crate::service::run(svc_token, ui_rx, svc_tx, config));

        Self {
            state: AppState {
                error: config_error,
                ..AppState::default()
            },
            ui_tx,
            svc_rx,
            shutdown_token: token,
        }
    }

    /// Apply every pending service event. Returns whether anything changed.
    pub fn drain_events(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.svc_rx.try_recv() {
            self.state.apply(event);
            changed = true;
        }
        changed
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.ui_tx.send(UiEvent::Shutdown);
        self.shutdown_token.cancel();
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Keep repainting so service events are picked up while idle
        ctx.request_repaint_after(std::time::Duration::from_millis(250));

        if self.drain_events() {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(8.0);
            view::header::show(ui, &mut self.state, &self.ui_tx);
            ui.add_space(8.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            view::banner::show(ui, &self.state);
            view::list_form::show(ui, &mut self.state, &self.ui_tx);
            ui.add_space(16.0);
            view::gallery::show(ui, &mut self.state, &self.ui_tx);
        });
    }
}
