//! Header bar — title and wallet connection.

use egui::Ui;
use tokio::sync::mpsc;

use crate::events::UiEvent;
use crate::marketplace::short_address;
use crate::state::AppState;

/// Render the header.
pub fn show(ui: &mut Ui, state: &mut AppState, ui_tx: &mpsc::UnboundedSender<UiEvent>) {
    ui.horizontal(|ui| {
        ui.heading(
            egui::RichText::new("NFT Marketplace")
                .size(26.0)
                .strong()
                .color(egui::Color32::from_rgb(96, 165, 250)),
        );

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if state.is_connected() {
                ui.label(
                    egui::RichText::new(format!(
                        "Connected: {}",
                        short_address(&state.wallet_address)
                    ))
                    .color(egui::Color32::LIGHT_GRAY),
                )
                .on_hover_text(state.wallet_address.as_str());
            } else {
                let label = if state.connecting {
                    "Connecting..."
                } else {
                    "Connect Wallet"
                };
                if ui
                    .add_enabled(
                        !state.connecting,
                        egui::Button::new(egui::RichText::new(label).size(15.0))
                            .min_size(egui::vec2(140.0, 30.0)),
                    )
                    .clicked()
                {
                    state.begin_connect();
                    let _ = ui_tx.send(UiEvent::ConnectWallet);
                }
            }
        });
    });
}
