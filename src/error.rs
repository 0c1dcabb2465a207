//! Error types for the dashboard.

use thiserror::Error;

/// Problems found while loading or validating a dashboard configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// YAML did not parse into the config schema.
    #[error("malformed config: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Display block is unusable.
    #[error("invalid display: {0}")]
    Display(String),

    /// Transition block is unusable.
    #[error("invalid transition: {0}")]
    Transition(String),

    #[error("duplicate widget id `{0}`")]
    DuplicateId(String),

    #[error("widget `{id}` has zero-sized position {w}x{h}")]
    ZeroSize { id: String, w: i32, h: i32 },

    #[error("widget `{id}`: background {value} outside -1..=255")]
    Background { id: String, value: i32 },

    #[error("widget `{id}`: unknown widget type `{kind}`")]
    UnknownType { id: String, kind: String },

    #[error("widget `{id}`: unknown display mode `{mode}`")]
    UnknownMode { id: String, mode: String },

    /// Any other per-widget parameter problem.
    #[error("widget `{id}`: {message}")]
    Invalid { id: String, message: String },
}

/// Errors reported by a widget's `update` or `render`, or by its constructor.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WidgetError {
    /// Data source unreachable or produced nothing usable.
    #[error("data unavailable: {0}")]
    Unavailable(String),

    /// Source answered but the sample is degraded (non-2xx, no data yet).
    #[error("degraded source: {0}")]
    Degraded(String),

    /// Unsupported or missing parameter at construction time.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("render failed: {0}")]
    Render(String),
}

/// Errors from an output sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("frame is {actual_w}x{actual_h}, sink expects {expected_w}x{expected_h}")]
    SizeMismatch {
        expected_w: u32,
        expected_h: u32,
        actual_w: u32,
        actual_h: u32,
    },

    #[error("output device unavailable: {0}")]
    Unavailable(String),
}

/// Top-level error for the compositor and the driver binary.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("widget `{id}`: {source}")]
    Widget {
        id: String,
        #[source]
        source: WidgetError,
    },

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Operation not valid in the compositor's current state.
    #[error("compositor {0}")]
    State(&'static str),
}
