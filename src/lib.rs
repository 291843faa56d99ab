// src/lib.rs

pub mod assembler;
pub mod catalog;
pub mod client;
pub mod config;
pub mod drag;
pub mod error;
pub mod events;
pub mod models;
pub mod registry;
pub mod script;
pub mod session;
pub mod submit;
pub mod utils;
pub mod view;

// Re-export specific items for convenience if needed
pub use client::{HttpBackend, ScheduleBackend};
pub use events::FormEvent;
pub use session::FormSession;
