//! Status banners: the most recent error, and the last success notice.

use egui::Ui;

use crate::state::AppState;

pub fn show(ui: &mut Ui, state: &AppState) {
    if let Some(ref err) = state.error {
        strip(ui, egui::Color32::from_rgb(220, 38, 38), err);
    }
    if let Some(ref msg) = state.success {
        strip(ui, egui::Color32::from_rgb(22, 163, 74), msg);
    }
}

fn strip(ui: &mut Ui, fill: egui::Color32, text: &str) {
    egui::Frame::none()
        .fill(fill)
        .rounding(6.0)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.label(egui::RichText::new(text).color(egui::Color32::WHITE));
        });
    ui.add_space(8.0);
}
