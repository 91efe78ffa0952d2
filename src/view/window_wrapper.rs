use std::collections::HashMap;

use strum_macros::EnumIter;

use crate::UiView;
use crate::settings::Settings;
use crate::view::{
    connection_window::ConnectionWindow, error_window::ErrorWindow, input_window::InputWindow,
    log_window::LogWindow,
};

#[derive(PartialEq, Hash, Eq, Clone, Copy, EnumIter)]
pub enum WindowType {
    ConnectionWindow,
    LogWindow,
    InputWindow,
    ErrorWindow,
}

pub struct WindowWrapper {
    window_map: HashMap<WindowType, Box<dyn UiView>>,
}

impl WindowWrapper {
    pub fn new(settings: &Settings) -> Self {
        let mut window_map = HashMap::<WindowType, Box<dyn UiView>>::new();
        window_map.insert(
            WindowType::ConnectionWindow,
            Box::new(ConnectionWindow::new(settings.default_baud_rate)),
        );
        window_map.insert(WindowType::LogWindow, Box::new(LogWindow::new()));
        window_map.insert(WindowType::InputWindow, Box::new(InputWindow::new()));
        window_map.insert(WindowType::ErrorWindow, Box::new(ErrorWindow::new()));

        Self { window_map }
    }

    pub fn get_window(&mut self, window_type: WindowType) -> &mut Box<dyn UiView> {
        // Every `WindowType` is inserted in `new`
        self.window_map
            .get_mut(&window_type)
            .unwrap_or_else(|| unreachable!("window is always registered"))
    }
}
