//! Services shared by every widget: canvas allocation, border, content area,
//! auto-hide and idempotent stop.

use std::sync::{Mutex, Once, PoisonError};
use std::time::{Duration, Instant};

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

use crate::bitmap::draw_border;
use crate::canvas::{GrayCanvas, color_opt};
use crate::config::{Position, WidgetConfig};

/// Resolved widget style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Style {
    /// Background gray level; `None` is transparent.
    pub background: Option<u8>,
    pub border: Option<u8>,
    pub padding: i32,
}

impl Style {
    #[inline]
    pub const fn is_transparent(&self) -> bool { self.background.is_none() }
}

/// Inner rectangle of a widget in canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentArea {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl ContentArea {
    pub fn rect(&self) -> Rectangle {
        Rectangle::new(
            Point::new(self.x, self.y),
            Size::new(self.w.max(0) as u32, self.h.max(0) as u32),
        )
    }
}

/// State and helpers embedded in every concrete widget.
#[derive(Debug)]
pub struct BaseWidget {
    id: String,
    kind: String,
    position: Position,
    style: Style,
    auto_hide: Option<Duration>,
    /// Latest instant the widget stays visible; only ever moves forward.
    visible_until: Mutex<Option<Instant>>,
    stopped: Once,
}

impl BaseWidget {
    pub fn new(config: &WidgetConfig) -> Self {
        let style = Style {
            background: color_opt(config.style.background),
            border: config.style.border.and_then(color_opt),
            padding: config.style.padding.max(0),
        };
        let auto_hide = config
            .auto_hide
            .enabled
            .then(|| Duration::from_secs_f64(config.auto_hide.timeout_s.max(0.0)));
        Self {
            id: config.id.clone(),
            kind: config.kind.clone(),
            position: config.position,
            style,
            auto_hide,
            visible_until: Mutex::new(None),
            stopped: Once::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> &str { &self.id }

    #[inline]
    pub fn kind(&self) -> &str { &self.kind }

    #[inline]
    pub const fn position(&self) -> Position { self.position }

    #[inline]
    pub const fn style(&self) -> Style { self.style }

    /// Widget-sized canvas filled with the background (0 when transparent).
    pub fn create_canvas(&self) -> GrayCanvas {
        GrayCanvas::filled(
            self.position.w.max(1) as u32,
            self.position.h.max(1) as u32,
            self.style.background.unwrap_or(0),
        )
    }

    /// Draw the configured border on the canvas perimeter.
    pub fn apply_border(
        &self,
        canvas: &mut GrayCanvas,
    ) {
        if let Some(color) = self.style.border {
            draw_border(canvas, color);
        }
    }

    /// Rectangle inside padding and, when drawn, the border.
    pub fn content_area(&self) -> ContentArea {
        let inset = self.style.padding + i32::from(self.style.border.is_some());
        ContentArea {
            x: inset,
            y: inset,
            w: (self.position.w - 2 * inset).max(0),
            h: (self.position.h - 2 * inset).max(0),
        }
    }

    /// Whole widget rect minus the border, ignoring padding.
    pub fn gauge_area(&self) -> ContentArea {
        let inset = i32::from(self.style.border.is_some());
        ContentArea {
            x: inset,
            y: inset,
            w: (self.position.w - 2 * inset).max(0),
            h: (self.position.h - 2 * inset).max(0),
        }
    }

    #[inline]
    pub const fn auto_hide_enabled(&self) -> bool { self.auto_hide.is_some() }

    /// Keep the widget visible for another timeout from now.
    pub fn trigger_auto_hide(&self) { self.trigger_auto_hide_at(Instant::now()); }

    pub fn trigger_auto_hide_at(
        &self,
        now: Instant,
    ) {
        let Some(timeout) = self.auto_hide else {
            return;
        };
        let until = now + timeout;
        let mut visible_until = self.visible_until.lock().unwrap_or_else(PoisonError::into_inner);
        if visible_until.is_none_or(|current| until > current) {
            *visible_until = Some(until);
        }
    }

    /// True when auto-hide is on and the visibility window has passed.
    pub fn should_hide(&self) -> bool { self.should_hide_at(Instant::now()) }

    pub fn should_hide_at(
        &self,
        now: Instant,
    ) -> bool {
        if self.auto_hide.is_none() {
            return false;
        }
        let visible_until = self.visible_until.lock().unwrap_or_else(PoisonError::into_inner);
        visible_until.is_none_or(|until| now > until)
    }

    /// Run `cleanup` the first time only.
    pub fn stop_once<F: FnOnce()>(
        &self,
        cleanup: F,
    ) {
        self.stopped.call_once(cleanup);
    }

    #[inline]
    pub fn is_stopped(&self) -> bool { self.stopped.is_completed() }
}
