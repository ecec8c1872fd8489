//! Utility Module
//!
//! - [`time`]: frame delta sources for driving the engine

pub mod time;

pub use time::FrameTimer;
