use eframe::egui::{self, Color32, Id, RichText, Visuals};

use crate::{ErrorType, UiView, ViewEvent, ViewRequest};

/// Modal for failed requests. Warnings (nothing was attempted) and errors
/// (something failed) differ in icon and heading colour.
#[derive(Default)]
pub(super) struct ErrorWindow {
    error_type: ErrorType,
    error_message: String,
    request: Option<ViewRequest>,
}

impl ErrorWindow {
    pub fn new() -> Self {
        Self {
            ..Default::default()
        }
    }

    fn heading(&self, visuals: &Visuals) -> (String, Color32) {
        if self.error_type.is_warning() {
            (format!("⚠ {}", self.error_type.title()), visuals.warn_fg_color)
        } else {
            (format!("❌ {}", self.error_type.title()), visuals.error_fg_color)
        }
    }
}

impl UiView for ErrorWindow {
    fn show(&mut self, ui: &mut eframe::egui::Ui) {
        if self.error_type == ErrorType::None {
            return;
        }

        let (title, color) = self.heading(ui.visuals());
        egui::Modal::new(Id::new("Error")).show(ui.ctx(), |ui| {
            ui.heading(RichText::new(title).color(color));
            ui.label(&self.error_message);

            egui::Sides::new().show(
                ui,
                |_ui| {},
                |ui| {
                    if ui.button("Ok").clicked() {
                        self.request = Some(ViewRequest::ErrorDismiss(self.error_type));
                        self.error_type = ErrorType::None;
                        self.error_message.clear();
                    }
                },
            );
        });
    }

    fn take_request(&mut self) -> Option<ViewRequest> {
        self.request.take()
    }

    fn handle_event(&mut self, event: ViewEvent) {
        if let ViewEvent::ErrorOccurred(err, msg) = event {
            self.error_type = err;
            self.error_message = msg;
        }
    }
}
