//! Headless driver components for the `formwork` binary.

pub mod logging;
pub mod phrases;
pub mod script;
