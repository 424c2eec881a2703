pub mod commands;
pub mod event;
pub mod history;
pub mod level;
pub mod session;
pub mod world;
