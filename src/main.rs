use anyhow::{anyhow, Context};
use aurora_canvas::agent::Session;
use aurora_canvas::gui::AuroraApp;
use aurora_canvas::hearing::AmbientListener;
use aurora_canvas::settings::Settings;
use aurora_canvas::sound::RodioSink;
use aurora_canvas::{logging, model};
use chrono::Utc;
use eframe::egui;

const SETTINGS_FILE: &str = "settings.json";

fn main() -> anyhow::Result<()> {
    let (settings, load_error) = match Settings::load(SETTINGS_FILE) {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };
    logging::init(settings.debug_logging);
    if let Some(e) = load_error {
        tracing::warn!("using default settings, {SETTINGS_FILE} is unreadable: {e:#}");
    }

    let model = model::connect(&settings.model).context("language model unavailable")?;

    let mut session = Session::load(&settings, model, Utc::now());
    if settings.sound_enabled {
        if let Some(sink) = RodioSink::try_default() {
            session = session.with_sound(Box::new(sink));
        }
    }

    let (width, height) = settings.screen();
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Aurora")
            .with_inner_size([width as f32, height as f32])
            .with_fullscreen(settings.fullscreen),
        ..Default::default()
    };

    let listener = AmbientListener::new();
    eframe::run_native(
        "Aurora",
        native_options,
        Box::new(move |_cc| Box::new(AuroraApp::new(session, listener))),
    )
    .map_err(|e| anyhow!("window closed with an error: {e}"))
}
