pub mod chat;
pub mod memory;
pub mod plugins;
pub mod send;
pub mod settings;
