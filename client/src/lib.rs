// Public modules for testing and external use
pub mod config;
pub mod session;
