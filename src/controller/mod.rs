pub mod communication;
pub mod session_controller;
