use eframe::{
    App, CreationContext,
    egui::{self, Visuals},
};

use log::{debug, warn};
use strum::IntoEnumIterator;

use crate::{
    AppContext, ViewEvent, ViewRequest,
    controller::session_controller::SessionController,
    error::SessionError,
    settings::Settings,
    view::window_wrapper::{WindowType, WindowWrapper},
};

pub struct SerialMonitor {
    // Serial session state machine, the only owner of the port handle
    controller: SessionController,
    settings: Settings,

    // UI
    window_wrapper: WindowWrapper,
    view_events: Vec<ViewEvent>,
}

impl App for SerialMonitor {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("connection_panel").show(ctx, |ui| {
            ui.add_space(4.0);
            self.window_wrapper
                .get_window(WindowType::ConnectionWindow)
                .show(ui);
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("input_panel").show(ctx, |ui| {
            ui.add_space(4.0);
            self.window_wrapper
                .get_window(WindowType::InputWindow)
                .show(ui);
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.window_wrapper
                .get_window(WindowType::LogWindow)
                .show(ui);
            self.window_wrapper
                .get_window(WindowType::ErrorWindow)
                .show(ui);
        });

        // Pick up lines and read errors from the background task first, so a
        // request in this frame sees the latest connection state
        self.controller.poll();
        self.handle_close_event(ctx);
        self.handle_ui_request();

        let log_entries = self.controller.take_log_entries();
        self.view_events
            .extend(log_entries.into_iter().map(ViewEvent::LogAppended));
        self.view_events.push(ViewEvent::ConnectionStatusUpdate(
            self.controller.is_connected(),
        ));
        self.send_ui_event();

        ctx.request_repaint_after(self.settings.repaint_interval);
    }
}

impl SerialMonitor {
    pub fn new(cc: &CreationContext<'_>, context: AppContext) -> Self {
        cc.egui_ctx.set_visuals(Visuals::dark());

        let AppContext { settings, driver } = context;
        let controller = SessionController::new(driver, settings.clone());
        let view_events = vec![ViewEvent::PortListUpdate(controller.list_ports())];

        Self {
            controller,
            window_wrapper: WindowWrapper::new(&settings),
            settings,
            view_events,
        }
    }

    fn handle_ui_request(&mut self) {
        for window_type in WindowType::iter() {
            if let Some(request) = self.window_wrapper.get_window(window_type).take_request() {
                let events = handle_request(&mut self.controller, request);
                self.view_events.extend(events);
            }
        }
    }

    fn send_ui_event(&mut self) {
        for event in self.view_events.drain(..) {
            for window_type in WindowType::iter() {
                self.window_wrapper
                    .get_window(window_type)
                    .handle_event(event.clone());
            }
        }
    }

    fn handle_close_event(&mut self, ctx: &egui::Context) {
        // Handle close event when user clicks 'x' button
        if ctx.input(|i| i.viewport().close_requested()) && self.controller.is_connected() {
            debug!("handle_close_event(), closing port before exit");
            self.controller.disconnect();
        }
    }
}

fn error_event(error: SessionError) -> ViewEvent {
    let error_type = error.error_type();
    warn!("{error_type:?}: {error}");
    ViewEvent::ErrorOccurred(error_type, error.to_string())
}

/// Run one window request against the controller and return the events the
/// windows need to see. Pre-condition failures become modal errors; I/O
/// failures are already in the session log, so they produce no event.
fn handle_request(controller: &mut SessionController, request: ViewRequest) -> Vec<ViewEvent> {
    debug!("handle_request(), {request:?}");

    match request {
        ViewRequest::ConnectionStart(config) => match controller.connect(&config) {
            Ok(()) => Vec::new(),
            Err(e) => vec![error_event(e)],
        },
        ViewRequest::ConnectionStop => {
            controller.disconnect();
            Vec::new()
        }
        ViewRequest::RefreshPorts => vec![ViewEvent::PortListUpdate(controller.list_ports())],
        ViewRequest::Send(message) => match controller.send(&message) {
            Ok(()) => vec![ViewEvent::MessageSent],
            // Already logged inline and disconnected by the controller
            Err(SessionError::Io(_)) => Vec::new(),
            Err(e) => vec![error_event(e)],
        },
        ViewRequest::ClearLog => {
            controller.clear_log();
            vec![ViewEvent::LogCleared]
        }
        // The modal clears itself, nothing else depends on it
        ViewRequest::ErrorDismiss(error_type) => {
            debug!("handle_request(), {error_type:?} dismissed");
            Vec::new()
        }
    }
}
