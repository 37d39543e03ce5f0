#![allow(non_snake_case)]

use types::Float;
pub extern crate nalgebra as na;

pub mod double_pendulum;
pub mod energy;
pub mod integrators;
pub mod params;
pub mod pendulum;
pub mod plot;
pub mod rail;
pub mod simulate;
pub mod single_pendulum;
pub mod types;
pub mod util;

// Wasm bindings
pub mod interface;

pub const GRAVITY: Float = 9.81;
pub const DEFAULT_DAMPING: Float = 0.1;

pub const PI: Float = std::f64::consts::PI;
pub const TWO_PI: Float = 2.0 * PI;
