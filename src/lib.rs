#![cfg_attr(not(feature = "std"), no_std)]

//! Control kernel for a single-player hidden-board Battleship game.
//!
//! [`core`] holds the game logic and peripheral protocols and builds
//! without `std`. With the `std` feature, [`runtime`] runs the foreground
//! loop and the interrupt contexts as tokio tasks, and [`serial`] supplies
//! byte sources for the map loader.

pub mod core;
#[cfg(feature = "std")]
mod config;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod prelude;
#[cfg(feature = "std")]
pub mod runtime;
#[cfg(feature = "std")]
pub mod serial;

pub use crate::core::*;
#[cfg(feature = "std")]
pub use config::{KernelConfig, MIN_PERIOD};
#[cfg(feature = "std")]
pub use logging::init_logging;
#[cfg(feature = "std")]
pub use runtime::{spawn_kernel, KernelHandle, KernelReport, Peripherals, TurnReport};
