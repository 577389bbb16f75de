//! IPC module for daemon-collaborator communication

mod protocol;
mod server;

pub use server::Server;
