pub mod admins;
pub mod memory;
pub mod message;
pub mod plugins;
pub mod settings;
