//! "List New NFT" form. Only rendered for a connected wallet.

use egui::Ui;
use tokio::sync::mpsc;

use crate::events::UiEvent;
use crate::state::AppState;

/// Render the listing form.
pub fn show(ui: &mut Ui, state: &mut AppState, ui_tx: &mpsc::UnboundedSender<UiEvent>) {
    if !state.can_list() {
        return;
    }

    ui.group(|ui| {
        ui.set_min_width(ui.available_width());
        ui.label(
            egui::RichText::new("List New NFT")
                .size(18.0)
                .strong()
                .color(egui::Color32::from_rgb(96, 165, 250)),
        );
        ui.add_space(8.0);

        ui.label("NFT Name");
        ui.add(
            egui::TextEdit::singleline(&mut state.draft.name)
                .hint_text("My artwork")
                .desired_width(ui.available_width()),
        );

        ui.add_space(8.0);

        // Negative prices are unreachable from this control.
        ui.label("Price (APT)");
        ui.add(
            egui::DragValue::new(&mut state.draft.price)
                .range(0.0..=f64::MAX)
                .speed(0.01)
                .fixed_decimals(2),
        );

        ui.add_space(12.0);

        let label = if state.loading { "Listing..." } else { "List NFT" };
        if ui
            .add_enabled(
                state.can_submit_listing(),
                egui::Button::new(egui::RichText::new(label).size(16.0))
                    .min_size(egui::vec2(ui.available_width(), 32.0)),
            )
            .clicked()
        {
            state.begin_action();
            let _ = ui_tx.send(UiEvent::ListNft {
                name: state.draft.name.clone(),
                price: state.draft.price,
            });
        }
    });
}
