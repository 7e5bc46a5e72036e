//! Shared configuration for the taskdeck workspace.

pub mod config;

pub use config::Config;
