//! Edgehop - multi-monitor cursor edge jumping and window fill.
//!
//! When the cursor reaches the edge of a display, Edgehop warps it onto the
//! neighbouring display that best matches its position and direction of
//! travel, smoothing over displays that are offset, differently sized or
//! set apart. Optionally, windows moved onto another display are resized to
//! fill it.
//!
//! The library is split into:
//!
//! - [`jump`] - topology, zone compilation, scoring and the cursor controller
//! - [`window_fill`] - window display tracking and fill requests
//! - [`service`] - the background task driving both from a poll timer and
//!   host notifications
//! - [`host`] - the operating system interfaces, with a CoreGraphics
//!   implementation and an in-memory one
//! - [`config`], [`logging`], [`cli`] - the ambient pieces of the binary

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod host;
pub mod jump;
pub mod logging;
pub mod service;
pub mod window_fill;
