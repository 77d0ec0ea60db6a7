#![forbid(unsafe_code)]

//! Core: canonical input events, viewport geometry, and build mode.
//!
//! Nothing in this crate knows about the DOM. Hosts translate their native
//! input into [`event::Event`] values and measure element positions as
//! [`geometry::Bounds`]; the reading-position and search components consume
//! only these types.

pub mod config;
pub mod event;
pub mod geometry;
