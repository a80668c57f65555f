pub mod geometry;
pub mod tree;
pub mod surface;
pub mod layout;
pub mod detection;
pub mod keys;
pub mod elements;
pub mod focus;
pub mod navigator;
pub mod carousel;
pub mod dropdown;
pub mod controller;
pub mod runtime;
pub mod config;
pub mod error;
pub mod commands;
pub mod tui;

#[cfg(test)]
pub mod testing;


pub use controller::{Effect, Event, KeyDisposition, NavigationController};
pub use error::{NavError, NavResult};
pub use runtime::Runtime;
pub use surface::{MemorySurface, Surface};
