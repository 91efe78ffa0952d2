use std::sync::Arc;
use std::time::Duration;

use eframe::egui;
use tokio::runtime::Builder;

use serial_monitor::AppContext;
use serial_monitor::port::SystemDriver;
use serial_monitor::settings::Settings;
use serial_monitor::view::main_window::SerialMonitor;

fn main() -> eframe::Result {
    env_logger::init();

    let rt = Builder::new_multi_thread().enable_all().build().unwrap();

    // Serial read tasks are spawned from the UI thread
    let _enter = rt.enter();

    // Execute the runtime in its own thread.
    std::thread::spawn(move || {
        rt.block_on(async {
            loop {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
        })
    });

    let settings = Settings::default();
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(settings.window_title.as_str())
            .with_inner_size(settings.window_size),
        centered: true,
        ..Default::default()
    };

    let context = AppContext::new(settings, Arc::new(SystemDriver));
    let title = context.settings.window_title.clone();
    eframe::run_native(
        &title,
        native_options,
        Box::new(|cc| Ok(Box::new(SerialMonitor::new(cc, context)))),
    )
}
