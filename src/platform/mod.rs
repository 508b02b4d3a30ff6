//! Platform layer
//!
//! Handles browser/native differences for:
//! - Input events
//! - Storage (LocalStorage on web)
//! - Mounting a game on a canvas (web only)

pub mod input;
pub mod storage;
#[cfg(target_arch = "wasm32")]
pub mod web;
