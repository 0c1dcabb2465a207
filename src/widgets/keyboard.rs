//! Caps/Num/Scroll lock indicators.
//!
//! Format tokens `{caps}`, `{num}` and `{scroll}` expand to the configured
//! label while the lock is on and to the `off` text otherwise.

use std::sync::{Arc, RwLock};
use std::time::Instant;

use crate::canvas::GrayCanvas;
use crate::composite::{CompositeRenderer, ShapeKind, TokenSource, classify_with};
use crate::config::{KeyboardConfig, WidgetConfig};
use crate::error::WidgetError;
use crate::icons::IconKind;
use crate::readers::{KeyboardReader, LockState};
use crate::tokens::{Token, parse_format_tokens};
use crate::widget::{BaseWidget, Widget, snapshot, write_state};
use crate::widgets::{composite_renderer, draw_composite_line};

const TEXT_TOKENS: [&str; 3] = ["caps", "num", "scroll"];
const DEFAULT_FORMAT: &str = "{caps} {num} {scroll}";

pub struct KeyboardWidget {
    base: BaseWidget,
    reader: Arc<dyn KeyboardReader>,
    labels: KeyboardConfig,
    tokens: Vec<Token>,
    renderer: CompositeRenderer,
    locks: RwLock<Option<LockState>>,
}

impl KeyboardWidget {
    pub fn new(
        config: &WidgetConfig,
        reader: Arc<dyn KeyboardReader>,
    ) -> Self {
        let format = config.text.format.as_deref().unwrap_or(DEFAULT_FORMAT);
        Self {
            base: BaseWidget::new(config),
            reader,
            labels: config.keyboard.clone(),
            tokens: parse_format_tokens(format, classify_with(&TEXT_TOKENS)),
            renderer: composite_renderer(config),
            locks: RwLock::new(None),
        }
    }
}

struct LockTokens<'a> {
    locks: LockState,
    labels: &'a KeyboardConfig,
}

impl TokenSource for LockTokens<'_> {
    fn text(
        &self,
        name: &str,
        _param: Option<&str>,
    ) -> String {
        let (on, label) = match name {
            "caps" => (self.locks.caps, &self.labels.caps),
            "num" => (self.locks.num, &self.labels.num),
            "scroll" => (self.locks.scroll, &self.labels.scroll),
            _ => return String::new(),
        };
        if on { label.clone() } else { self.labels.off.clone() }
    }

    fn icon(
        &self,
        _name: &str,
    ) -> Option<IconKind> {
        None
    }

    fn level(
        &self,
        _shape: ShapeKind,
    ) -> Option<f64> {
        None
    }
}

impl Widget for KeyboardWidget {
    fn base(&self) -> &BaseWidget { &self.base }

    fn update(&self) -> Result<(), WidgetError> {
        let locks = self.reader.locks()?;
        let mut current = write_state(&self.locks);
        if *current != Some(locks) {
            self.base.trigger_auto_hide();
            *current = Some(locks);
        }
        Ok(())
    }

    fn render(&self) -> Result<Option<GrayCanvas>, WidgetError> {
        if self.base.should_hide() {
            return Ok(None);
        }
        let mut canvas = self.base.create_canvas();
        if let Some(locks) = snapshot(&self.locks) {
            let area = self.base.content_area();
            let source = LockTokens {
                locks,
                labels: &self.labels,
            };
            let layout = self.renderer.layout(&self.tokens, &source, area);
            draw_composite_line(&mut canvas, &self.renderer, &layout, area, None, None, Instant::now());
        }
        self.base.apply_border(&mut canvas);
        Ok(Some(canvas))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::config::Position;
    use crate::widgets::test_support::render_checked;

    struct Locks(Mutex<LockState>);

    impl KeyboardReader for Locks {
        fn locks(&self) -> Result<LockState, WidgetError> { Ok(*self.0.lock().expect("test lock")) }
    }

    fn labels() -> KeyboardConfig { KeyboardConfig::default() }

    #[test]
    fn test_token_text_follows_lock_state() {
        let labels = labels();
        let source = LockTokens {
            locks: LockState {
                caps: true,
                num: false,
                scroll: true,
            },
            labels: &labels,
        };
        assert_eq!(source.text("caps", None), "CAPS");
        assert_eq!(source.text("num", None), "", "Off locks show the off text");
        assert_eq!(source.text("scroll", None), "SCRL");
        assert_eq!(source.text("kana", None), "");
    }

    #[test]
    fn test_change_triggers_auto_hide() {
        let mut cfg = WidgetConfig::new("kb", "keyboard", Position::new(0, 0, 80, 12, 0));
        cfg.auto_hide.enabled = true;
        cfg.auto_hide.timeout_s = 30.0;
        let reader = Arc::new(Locks(Mutex::new(LockState::default())));
        let w = KeyboardWidget::new(&cfg, Arc::clone(&reader) as Arc<dyn KeyboardReader>);

        assert!(render_checked(&w).is_none(), "Hidden until the first reading");
        w.update().expect("read ok");
        assert!(render_checked(&w).is_some());
    }

    #[test]
    fn test_renders_labels() {
        let cfg = WidgetConfig::new("kb", "keyboard", Position::new(0, 0, 80, 12, 0));
        let reader = Arc::new(Locks(Mutex::new(LockState {
            caps: true,
            num: true,
            scroll: false,
        })));
        let w = KeyboardWidget::new(&cfg, reader);
        w.update().expect("read ok");
        let c = render_checked(&w).expect("visible");
        assert!(c.count_value(255) > 0);
    }
}
