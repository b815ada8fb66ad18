//! Listing gallery — one card per listing, with a buy control where allowed.

use egui::Ui;
use tokio::sync::mpsc;

use crate::events::UiEvent;
use crate::marketplace::short_address;
use crate::state::AppState;

const CARD_WIDTH: f32 = 240.0;

/// Render the gallery.
pub fn show(ui: &mut Ui, state: &mut AppState, ui_tx: &mpsc::UnboundedSender<UiEvent>) {
    if state.is_connected() {
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!state.loading, egui::Button::new("Refresh"))
                .clicked()
            {
                state.begin_refresh();
                let _ = ui_tx.send(UiEvent::RefreshListings);
            }
            if let Some(at) = state.last_refreshed {
                ui.label(
                    egui::RichText::new(format!("Updated {}", at.format("%H:%M:%S")))
                        .color(egui::Color32::GRAY),
                );
            }
        });
        ui.add_space(8.0);
    }

    let mut buy: Option<String> = None;

    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.horizontal_wrapped(|ui| {
            for nft in &state.nfts {
                ui.group(|ui| {
                    ui.set_width(CARD_WIDTH);
                    ui.vertical(|ui| {
                        ui.label(
                            egui::RichText::new(nft.name.as_str())
                                .size(18.0)
                                .strong()
                                .color(egui::Color32::from_rgb(96, 165, 250)),
                        );
                        ui.label(format!("Price: {}", nft.format_price()));
                        ui.label(format!("Creator: {}", short_address(&nft.creator)))
                            .on_hover_text(nft.creator.as_str());
                        ui.label(format!("Status: {}", nft.status_label()));

                        if state.can_buy(nft) {
                            ui.add_space(6.0);
                            if ui
                                .add_enabled(
                                    !state.loading,
                                    egui::Button::new("Buy NFT")
                                        .fill(egui::Color32::from_rgb(34, 197, 94))
                                        .min_size(egui::vec2(CARD_WIDTH, 28.0)),
                                )
                                .clicked()
                            {
                                buy = Some(nft.creator.clone());
                            }
                        }
                    });
                });
            }
        });
    });

    if let Some(creator) = buy {
        state.begin_action();
        let _ = ui_tx.send(UiEvent::BuyNft { creator });
    }

    if state.nfts.is_empty() && state.is_connected() {
        ui.add_space(16.0);
        ui.vertical_centered(|ui| {
            ui.label(
                egui::RichText::new("No NFTs listed yet. List your first NFT above!")
                    .color(egui::Color32::GRAY),
            );
        });
    }
}
