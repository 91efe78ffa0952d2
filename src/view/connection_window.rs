use eframe::egui::{Button, ComboBox, TextEdit, Ui};
use strum::IntoEnumIterator;

use crate::{BaudRate, ConnectionConfig, UiView, ViewEvent, ViewRequest};

#[derive(Default)]
pub(super) struct ConnectionWindow {
    // Editable, so a port that is not enumerated can still be typed in
    selected_port: String,
    selected_baud: BaudRate,
    port_names: Vec<String>,
    curr: bool,
    request: Option<ViewRequest>,
}

impl ConnectionWindow {
    pub fn new(default_baud: BaudRate) -> Self {
        Self {
            selected_baud: default_baud,
            ..Default::default()
        }
    }
}

impl UiView for ConnectionWindow {
    fn show(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            // Port and baud rate are fixed for the lifetime of a session
            ui.add_enabled_ui(!self.curr, |ui| {
                ui.label("Port:");
                ui.add(TextEdit::singleline(&mut self.selected_port).desired_width(120.0));
                ComboBox::new("ports", "")
                    .selected_text("▼")
                    .width(24.0)
                    .show_ui(ui, |ui| {
                        for port in &self.port_names {
                            ui.selectable_value(
                                &mut self.selected_port,
                                port.clone(),
                                port.as_str(),
                            );
                        }
                    });

                if ui.button("Refresh").clicked() {
                    self.request = Some(ViewRequest::RefreshPorts);
                }

                ui.label("Baud rate:");
                ComboBox::new("baud", "")
                    .selected_text(self.selected_baud.to_string())
                    .show_ui(ui, |ui| {
                        for baud in BaudRate::iter() {
                            ui.selectable_value(&mut self.selected_baud, baud, baud.to_string());
                        }
                    });
            });

            let text_in_button = if self.curr { "Disconnect" } else { "Connect" };
            if ui.add(Button::new(text_in_button)).clicked() {
                self.request = if self.curr {
                    Some(ViewRequest::ConnectionStop)
                } else {
                    Some(ViewRequest::ConnectionStart(ConnectionConfig {
                        port: self.selected_port.trim().to_string(),
                        baud_rate: Some(self.selected_baud),
                    }))
                };
            }
        });
    }

    fn take_request(&mut self) -> Option<ViewRequest> {
        self.request.take()
    }

    fn handle_event(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::ConnectionStatusUpdate(x) => self.curr = x,
            ViewEvent::PortListUpdate(ports) => {
                if self.selected_port.is_empty() {
                    if let Some(first) = ports.first() {
                        self.selected_port = first.clone();
                    }
                }
                self.port_names = ports;
            }
            _ => (),
        }
    }
}
