//! Actuator drivers and the GPIO capability they are built on.

pub mod buzzer;
pub mod gpio;
pub mod light;
