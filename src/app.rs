use eframe::egui;

use crate::canvas::PatchCanvas;
use crate::controller::{InputEvent, KeyCommand, Outcome};
use crate::error::SessionError;
use crate::session::{Response, Session};

/// Keys the app listens for, in the order they are checked each frame.
const KEY_BINDINGS: &[(egui::Key, KeyCommand)] = &[
    (egui::Key::S, KeyCommand::Save),
    (egui::Key::D, KeyCommand::Next),
    (egui::Key::A, KeyCommand::Previous),
    (egui::Key::Q, KeyCommand::Quit),
];

/// Last message shown in the status bar.
enum Status {
    Info(String),
    Error(String),
}

pub struct PatchCropApp {
    session: Session,
    canvas: PatchCanvas,
    status: Status,
    quitting: bool,
}

impl PatchCropApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, mut session: Session) -> Self {
        let status = match session.load_current() {
            Ok(()) => Status::Info(String::new()),
            Err(e) => Status::Error(e.to_string()),
        };
        Self {
            session,
            canvas: PatchCanvas::new(),
            status,
            quitting: false,
        }
    }

    /// Feed one event to the session. Runtime errors end up in the status
    /// bar; the loop carries on.
    fn dispatch(&mut self, event: InputEvent) {
        match self.session.handle(event) {
            Ok(response) => self.on_response(response),
            Err(e) => self.on_error(e),
        }
    }

    fn on_response(&mut self, response: Response) {
        match response {
            Response::Saved(count) => {
                self.status = Status::Info(format!(
                    "Saved {} patch(es) for {} to {}",
                    count,
                    self.session.current_image().file_name(),
                    self.session.config().output_path.display()
                ));
            }
            Response::ImageChanged => {
                self.status = Status::Info(String::new());
            }
            Response::Edit(Outcome::Added(_) | Outcome::Removed(_)) => {
                // Stale "saved" messages would suggest the new patch is on disk.
                if matches!(self.status, Status::Info(_)) {
                    self.status = Status::Info(String::new());
                }
            }
            Response::Quit => self.quitting = true,
            Response::Edit(_) | Response::StayedPut => {}
        }
    }

    fn on_error(&mut self, error: SessionError) {
        crate::log_err!("{}", error);
        self.status = Status::Error(error.to_string());
    }

    fn status_bar(&self, ui: &mut egui::Ui) {
        let session = &self.session;
        ui.horizontal(|ui| {
            ui.label(format!(
                "{} ({})",
                session.current_image().file_name(),
                session.navigator().position_label()
            ));
            ui.separator();
            ui.label(format!("{} patch(es)", session.selection().len()));
            ui.separator();
            ui.label(format!("{}px", session.config().patch_size));
            ui.separator();
            match &self.status {
                Status::Info(msg) => {
                    ui.label(msg);
                }
                Status::Error(msg) => {
                    ui.colored_label(egui::Color32::from_rgb(230, 80, 80), format!("error: {}", msg));
                }
            }
        });
    }
}

impl eframe::App for PatchCropApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.send_viewport_cmd(egui::ViewportCommand::Title(format!(
            "patchcrop - {}",
            self.session.current_image().file_name()
        )));

        // The OS close button ends the session just like `q`.
        if ctx.input(|i| i.viewport().close_requested()) {
            self.dispatch(InputEvent::CloseRequested);
            return;
        }

        egui::TopBottomPanel::top("help").show(ctx, |ui| {
            ui.label(
                "left click: add   middle click: remove   s: save   d: next   a: previous   q: quit",
            );
        });
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| self.status_bar(ui));

        let pointer_events = egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::from_gray(24)))
            .show(ctx, |ui| self.canvas.show(ui, &self.session))
            .inner;
        for event in pointer_events {
            self.dispatch(event);
        }

        for (key, command) in KEY_BINDINGS {
            if self.quitting {
                break;
            }
            if ctx.input(|i| i.key_pressed(*key)) {
                self.dispatch(InputEvent::Key(*command));
            }
        }

        if self.quitting {
            crate::log_info!("Quit requested");
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}
