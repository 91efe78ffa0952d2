mod connection_window;
mod error_window;
mod input_window;
mod log_window;
pub mod main_window;
mod window_wrapper;
