use crate::agent::scheduler::Mode;
use crate::agent::session::{Session, TickEvent};
use crate::draw::render::{self, RenderSettings, Viewport};
use crate::hearing::AmbientListener;
use chrono::Utc;
use eframe::egui;
use std::time::{Duration, Instant};

/// Fullscreen window that ticks the session and shows the canvas.
pub struct AuroraApp {
    session: Session,
    listener: AmbientListener,
    texture: Option<egui::TextureHandle>,
    next_tick: Instant,
    centered: bool,
    screen: (u32, u32),
    dirty: bool,
    status: String,
}

impl AuroraApp {
    pub fn new(session: Session, listener: AmbientListener) -> Self {
        let screen = session.canvas().screen();
        Self {
            session,
            listener,
            texture: None,
            next_tick: Instant::now(),
            centered: false,
            screen,
            dirty: true,
            status: String::new(),
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::S)) {
            match self.session.snapshot(Utc::now()) {
                Ok(targets) => self.status = format!("snapshot {}", targets.image.display()),
                Err(e) => tracing::error!("snapshot failed: {e:#}"),
            }
        }
        if ctx.input(|i| i.key_pressed(egui::Key::T)) {
            let turbo = self.session.toggle_turbo();
            self.status = format!("turbo {}", if turbo { "on" } else { "off" });
        }
        if ctx.input(|i| i.key_pressed(egui::Key::H)) {
            self.listener.toggle();
            self.status = self.listener.status();
        }
        if ctx.input(|i| i.key_pressed(egui::Key::C)) {
            self.centered = true;
            self.dirty = true;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::B)) {
            self.centered = false;
            self.dirty = true;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Q) || i.key_pressed(egui::Key::Escape)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    fn tick_if_due(&mut self) {
        let now = Instant::now();
        if now < self.next_tick {
            return;
        }
        match self.session.tick(Utc::now()) {
            TickEvent::Drew(_) | TickEvent::Chat(_) | TickEvent::Dreamed(_) => self.dirty = true,
            TickEvent::Choice(_) | TickEvent::Idle | TickEvent::GenerationFailed => {}
        }
        self.next_tick = Instant::now() + self.session.next_delay();
    }

    fn refresh_texture(&mut self, ctx: &egui::Context) {
        if !self.dirty && self.texture.is_some() {
            return;
        }
        let settings = RenderSettings {
            display_scale: self.session.canvas().scale(),
            viewport: if self.centered {
                Viewport::Centered {
                    width: self.screen.0,
                    height: self.screen.1,
                }
            } else {
                Viewport::Full
            },
        };
        let frame = render::frame(self.session.canvas(), settings);
        let size = [frame.width() as usize, frame.height() as usize];
        let image = egui::ColorImage::from_rgba_unmultiplied(size, frame.as_raw());
        match &mut self.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
            None => {
                self.texture =
                    Some(ctx.load_texture("aurora_canvas", image, egui::TextureOptions::NEAREST))
            }
        }
        self.dirty = false;
    }

    fn mode_label(&self) -> String {
        match self.session.mode() {
            Mode::Drawing => "drawing".into(),
            Mode::AwaitingChoice => "choosing".into(),
            Mode::Chatting => "chatting".into(),
            Mode::Resting(phase) => format!("resting ({})", phase.name()),
        }
    }
}

impl eframe::App for AuroraApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keys(ctx);
        self.tick_if_due();
        self.refresh_texture(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                if let Some(texture) = &self.texture {
                    ui.centered_and_justified(|ui| {
                        ui.add(egui::Image::new(texture).fit_to_original_size(1.0));
                    });
                }
            });

        egui::Area::new(egui::Id::new("aurora_status"))
            .anchor(egui::Align2::LEFT_BOTTOM, [12.0, -12.0])
            .show(ctx, |ui| {
                let cursor = self.session.canvas().cursor();
                ui.colored_label(
                    egui::Color32::LIGHT_GRAY,
                    format!(
                        "{} | {} | step {} | {} {} | {}",
                        self.mode_label(),
                        self.session.emotion().word(),
                        self.session.steps(),
                        cursor.color,
                        cursor.tool,
                        self.status
                    ),
                );
                if let Some(message) = self.session.last_message() {
                    ui.colored_label(egui::Color32::WHITE, message);
                }
            });

        let wait = self
            .next_tick
            .saturating_duration_since(Instant::now())
            .max(Duration::from_millis(1));
        ctx.request_repaint_after(wait);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.session.save_or_log(Utc::now());
    }
}
