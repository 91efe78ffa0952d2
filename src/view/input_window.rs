use eframe::egui::{Button, Key, TextEdit, Ui};

use crate::{UiView, ViewEvent, ViewRequest};

#[derive(Default)]
pub(super) struct InputWindow {
    message: String,
    request: Option<ViewRequest>,
}

impl InputWindow {
    pub fn new() -> Self {
        Self {
            ..Default::default()
        }
    }
}

impl UiView for InputWindow {
    fn show(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            let button_width = 64.0;
            let entry = ui.add(
                TextEdit::singleline(&mut self.message)
                    .desired_width(ui.available_width() - button_width),
            );

            // Enter in the entry behaves like the button
            let enter_pressed = entry.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
            let clicked = ui.add_sized([button_width, 20.0], Button::new("Send")).clicked();

            if enter_pressed || clicked {
                self.request = Some(ViewRequest::Send(self.message.clone()));
                if enter_pressed {
                    entry.request_focus();
                }
            }
        });
    }

    fn take_request(&mut self) -> Option<ViewRequest> {
        self.request.take()
    }

    fn handle_event(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::MessageSent => self.message.clear(),
            _ => (),
        }
    }
}
