//! Core engine module
//!
//! Contains the main Engine struct, frame timing and configuration

pub mod config;
mod engine;
mod time;

pub use config::{AppConfig, ColliderFit, ConfigError, SceneConfig, ViewConfig, WindowConfig};
pub use engine::{Engine, EngineConfig, EngineContext, Game};
pub use time::Time;
