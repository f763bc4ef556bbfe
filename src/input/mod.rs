//! Input handling module
//!
//! Tracks raw keyboard and pointer state from winit events.

mod state;

pub use state::Input;
