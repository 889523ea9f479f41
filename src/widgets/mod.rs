//! UI-facing building blocks
//!
//! Pure data for front ends; nothing here touches the store except through
//! the proxy.

pub mod ae;
