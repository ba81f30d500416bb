//! IPC module for tray menu commands

mod protocol;
mod server;

pub use server::Server;
