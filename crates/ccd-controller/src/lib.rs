#![doc = "Controller context and timing parameter applicators."]

pub mod controller;

pub use controller::*;
