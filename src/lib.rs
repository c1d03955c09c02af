//! SmartHome PI1 controller library.
//!
//! Exposes every module for integration testing.  GPIO access is
//! behind the `rpi` feature; without it every device must be simulated.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod sensors;
pub mod shell;
pub mod supervisor;
