#![doc = "Common types shared across the CCD readout workspace."]

pub mod config;
pub mod error;

pub use config::*;
pub use error::*;
