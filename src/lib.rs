pub mod config;
pub mod content;
pub mod domain;
pub mod engine;
pub mod handlers;
pub mod session;
pub mod state;
