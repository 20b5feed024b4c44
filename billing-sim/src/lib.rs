pub mod clock;
pub mod commands;
pub mod config;
pub mod models;
pub mod report;
pub mod services;
pub mod simulation;
