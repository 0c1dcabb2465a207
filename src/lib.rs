//! Widget compositor for small grayscale dashboard panels.
//!
//! Widgets draw into 8-bit gray canvases; the compositor stacks them by z
//! order into one framebuffer per frame and hands it to an output sink.
//!
//! - [`canvas`], [`bitmap`], [`fonts`], [`icons`]: drawing primitives
//! - [`ring_buffer`]: fixed-capacity sample history
//! - [`tokens`], [`composite`]: `{token}` templates and mixed text/shape lines
//! - [`widget`], [`widgets`], [`metric`]: the widget contract and concrete kinds
//! - [`animation`], [`transition`]: scroll, blink and sprite animators; frame transitions
//! - [`compositor`], [`sink`], [`profiling`]: frame loop, frame consumers, frame metrics
//! - [`config`], [`readers`], [`error`]: configuration, data sources, error kinds

// Crate-level lints
#![allow(clippy::cast_possible_truncation)] // Pixel math narrows f64 -> i32 and u32 -> u8 on purpose
#![allow(clippy::cast_precision_loss)] // u32/i32 -> f64 in geometry
#![allow(clippy::cast_possible_wrap)] // Canvas sizes fit in i32
#![allow(clippy::cast_sign_loss)] // Clamped non-negative values to u32/usize
#![allow(clippy::similar_names)] // rx/tx, w/h pairs read clearly

pub mod animation;
pub mod bitmap;
pub mod canvas;
pub mod composite;
pub mod compositor;
pub mod config;
pub mod error;
pub mod fonts;
pub mod icons;
pub mod metric;
pub mod profiling;
pub mod readers;
pub mod ring_buffer;
pub mod sink;
pub mod tokens;
pub mod transition;
pub mod widget;
pub mod widgets;

pub use compositor::Compositor;
pub use config::DashboardConfig;
pub use error::DashboardError;
