pub mod app;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod gate;
pub mod notify;
pub mod nutrition;
pub mod session;
pub mod state;
