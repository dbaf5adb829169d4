pub mod actors;
pub mod analytics;
pub mod args;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod job;
pub mod logging;
pub mod protocol;
pub mod runner;
pub mod tls;
