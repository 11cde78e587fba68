pub mod app;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod env;
pub mod output;
pub mod policy;
pub mod runtime;
pub mod simulate;

pub use app::run;
