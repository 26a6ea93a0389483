//! Utilities shared by the Flexin server binary and its tests.

pub mod logger;
pub mod time;
