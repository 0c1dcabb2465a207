//! Local time rendered with a strftime pattern.

use std::fmt::Write as _;
use std::sync::{Mutex, RwLock};
use std::time::Instant;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeZone};

use crate::animation::ScrollAnimator;
use crate::canvas::GrayCanvas;
use crate::config::WidgetConfig;
use crate::config::constants::CLOCK_FORMAT;
use crate::error::WidgetError;
use crate::metric::{ConfigHelper, TextSettings};
use crate::widget::{BaseWidget, Widget, lock_state, read_state, write_state};
use crate::widgets::draw_scrolling_text;

pub struct ClockWidget {
    base: BaseWidget,
    format: String,
    text: TextSettings,
    scroll: Option<Mutex<ScrollAnimator>>,
    /// Text produced by the last `update`.
    current: RwLock<String>,
}

impl ClockWidget {
    pub fn new(config: &WidgetConfig) -> Result<Self, WidgetError> {
        let format = config.text.format.clone().unwrap_or_else(|| CLOCK_FORMAT.to_string());
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(WidgetError::Config(format!("{}: invalid time format `{format}`", config.id)));
        }
        Ok(Self {
            base: BaseWidget::new(config),
            format,
            text: ConfigHelper::new(config).text(),
            scroll: config
                .scroll
                .enabled
                .then(|| Mutex::new(ScrollAnimator::from_config(&config.scroll))),
            current: RwLock::new(String::new()),
        })
    }

    /// Clock text for `time`.
    pub fn text_at<Tz: TimeZone>(
        &self,
        time: &DateTime<Tz>,
    ) -> Result<String, WidgetError>
    where
        Tz::Offset: std::fmt::Display,
    {
        let mut out = String::new();
        write!(out, "{}", time.format(&self.format))
            .map_err(|_| WidgetError::Render(format!("cannot format time with `{}`", self.format)))?;
        Ok(out)
    }
}

impl Widget for ClockWidget {
    fn base(&self) -> &BaseWidget { &self.base }

    fn update(&self) -> Result<(), WidgetError> {
        let text = self.text_at(&Local::now())?;
        let mut current = write_state(&self.current);
        if *current != text {
            self.base.trigger_auto_hide();
            *current = text;
        }
        Ok(())
    }

    fn render(&self) -> Result<Option<GrayCanvas>, WidgetError> {
        if self.base.should_hide() {
            return Ok(None);
        }
        let text = read_state(&self.current).clone();
        let mut canvas = self.base.create_canvas();
        let mut scroll = self.scroll.as_ref().map(lock_state);
        draw_scrolling_text(
            &mut canvas,
            &text,
            &self.text,
            self.base.content_area(),
            scroll.as_deref_mut(),
            Instant::now(),
        );
        self.base.apply_border(&mut canvas);
        Ok(Some(canvas))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};

    use super::*;
    use crate::config::Position;
    use crate::widgets::test_support::render_checked;

    fn config(format: Option<&str>) -> WidgetConfig {
        let mut cfg = WidgetConfig::new("clock", "clock", Position::new(0, 0, 64, 12, 0));
        cfg.text.format = format.map(str::to_string);
        cfg
    }

    fn noon() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("valid offset")
            .with_ymd_and_hms(2024, 3, 9, 12, 5, 7)
            .single()
            .expect("unambiguous")
    }

    #[test]
    fn test_default_format() {
        let w = ClockWidget::new(&config(None)).expect("valid");
        assert_eq!(w.text_at(&noon()).expect("formats"), "12:05:07");
    }

    #[test]
    fn test_custom_format() {
        let w = ClockWidget::new(&config(Some("%a %d.%m"))).expect("valid");
        assert_eq!(w.text_at(&noon()).expect("formats"), "Sat 09.03");
    }

    #[test]
    fn test_invalid_format_rejected() {
        assert!(matches!(ClockWidget::new(&config(Some("%H:%Q"))), Err(WidgetError::Config(_))));
    }

    #[test]
    fn test_update_then_render() {
        let w = ClockWidget::new(&config(None)).expect("valid");
        w.update().expect("local time formats");
        assert!(!read_state(&w.current).is_empty());
        let c = render_checked(&w).expect("visible");
        assert!(c.count_value(255) > 0);
    }

    #[test]
    fn test_scrolling_clock_stays_in_bounds() {
        let mut cfg = config(Some("%A, %d %B %Y %H:%M:%S"));
        cfg.position.w = 20;
        cfg.scroll.enabled = true;
        let w = ClockWidget::new(&cfg).expect("valid");
        w.update().expect("formats");
        render_checked(&w);
        render_checked(&w);
    }
}
