//! Metric display pipeline.
//!
//! Single-value widgets go through [`strategy`] with settings built by
//! [`builder`]; two-value I/O widgets go through [`dual`]. Numeric text uses
//! the printf-style [`format`] and rate [`units`].

pub mod builder;
pub mod dual;
pub mod format;
pub mod strategy;
pub mod units;

pub use builder::ConfigHelper;
pub use dual::{DualMetricData, DualMetricRenderer, dual_strategy_for};
pub use format::{format_values, format_values_with_suffixes};
pub use strategy::{DisplayMode, MetricData, MetricRenderer, TextSettings, strategy_for};
pub use units::RateUnit;
