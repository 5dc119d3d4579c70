// Adapters layer: concrete implementations of the domain ports.

pub mod local_storage;
pub mod memory;
pub mod state_file;
pub mod webhook;
