//! Attribute Editor controls
//!
//! Schema-driven control specs for the light panel. Layout and styling are
//! left to whatever front end renders them.

mod controls;

pub use controls::{ControlSpec, build_control, nice_name, panel_for};
