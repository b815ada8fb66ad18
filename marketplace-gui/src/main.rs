use eframe::egui;

use marketplace_gui::{app, config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    let (config, config_error) = config::Config::load();
    let config_error = config_error.map(|e| format!("Configuration problem: {}", e));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 720.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        "NFT Marketplace",
        options,
        Box::new(move |cc| Ok(Box::new(app::App::new(cc, config, config_error)))),
    );

    drop(_guard);
    rt.shutdown_timeout(std::time::Duration::from_secs(2));

    result.map_err(|e| e.to_string().into())
}
