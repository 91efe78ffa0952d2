use eframe::egui::{Align, Color32, Frame, Label, RichText, ScrollArea, Ui};

use crate::{LogEntry, UiView, ViewEvent, ViewRequest};

const LOG_BACKGROUND: Color32 = Color32::from_rgb(0x1e, 0x1e, 0x1e);

/// Session output. Entries are kept for the whole process lifetime, there is
/// no eviction.
#[derive(Default)]
pub(super) struct LogWindow {
    entries: Vec<LogEntry>,
    scroll_to_bottom: bool,
    request: Option<ViewRequest>,
}

impl LogWindow {
    pub fn new() -> Self {
        Self {
            ..Default::default()
        }
    }
}

impl UiView for LogWindow {
    fn show(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.label("Serial Monitor Output:");
            ui.with_layout(eframe::egui::Layout::right_to_left(Align::Center), |ui| {
                if ui.button("Clear Output").clicked() {
                    self.request = Some(ViewRequest::ClearLog);
                }
            });
        });

        Frame::default()
            .fill(LOG_BACKGROUND)
            .inner_margin(6.0)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for entry in &self.entries {
                            let text = RichText::new(entry.to_string())
                                .monospace()
                                .color(Color32::WHITE);
                            ui.add(Label::new(text).wrap());
                        }

                        if self.scroll_to_bottom {
                            ui.scroll_to_cursor(Some(Align::BOTTOM));
                            self.scroll_to_bottom = false;
                        }
                    });
            });
    }

    fn take_request(&mut self) -> Option<ViewRequest> {
        self.request.take()
    }

    fn handle_event(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::LogAppended(entry) => {
                self.entries.push(entry);
                self.scroll_to_bottom = true;
            }
            ViewEvent::LogCleared => self.entries.clear(),
            _ => (),
        }
    }
}
