//! Clipboard preview.
//!
//! The poller only reads the clipboard when the reader reports a change.
//! The template (default `{content}`) is filled by a [`TokenFormatter`]
//! with `{content}` (first line, whitespace collapsed, truncated) and
//! `{type}`.

use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::animation::ScrollAnimator;
use crate::canvas::GrayCanvas;
use crate::config::WidgetConfig;
use crate::config::constants::CLIPBOARD_POLL_INTERVAL;
use crate::error::WidgetError;
use crate::metric::{ConfigHelper, TextSettings};
use crate::readers::{ClipboardReader, ContentType};
use crate::tokens::TokenFormatter;
use crate::widget::{BaseWidget, Widget, lock_state, read_state, snapshot, spawn_poller, write_state};
use crate::widgets::{draw_scrolling_text, poll_period};

const DEFAULT_FORMAT: &str = "{content}";
const MAX_PREVIEW_CHARS: usize = 64;

#[derive(Clone, Debug, Default)]
struct ClipboardState {
    /// `None` until the first read.
    content: Option<(String, ContentType)>,
    error: Option<WidgetError>,
}

pub struct ClipboardWidget {
    base: Arc<BaseWidget>,
    reader: Arc<dyn ClipboardReader>,
    format: String,
    text: TextSettings,
    scroll: Mutex<ScrollAnimator>,
    placeholder: String,
    period: Duration,
    state: Arc<RwLock<ClipboardState>>,
}

impl ClipboardWidget {
    pub fn new(
        config: &WidgetConfig,
        reader: Arc<dyn ClipboardReader>,
    ) -> Self {
        Self {
            base: Arc::new(BaseWidget::new(config)),
            reader,
            format: config.text.format.clone().unwrap_or_else(|| DEFAULT_FORMAT.to_string()),
            text: ConfigHelper::new(config).text(),
            scroll: Mutex::new(ScrollAnimator::from_config(&config.scroll)),
            placeholder: config.placeholder.clone().unwrap_or_else(|| "(empty)".to_string()),
            period: poll_period(config, CLIPBOARD_POLL_INTERVAL),
            state: Arc::new(RwLock::new(ClipboardState::default())),
        }
    }

    /// Display line for the current content.
    fn line(
        &self,
        content: &str,
        kind: ContentType,
    ) -> String {
        let mut fields = TokenFormatter::new();
        match kind {
            ContentType::Text => {
                fields.set("content", preview(content));
                fields.set("type", "text");
            }
            ContentType::Image => {
                fields.set("content", "[image]");
                fields.set("type", "image");
            }
            ContentType::Empty => return self.placeholder.clone(),
        }
        fields.format_strict(&self.format)
    }
}

/// First non-blank line with runs of whitespace collapsed, cut to
/// [`MAX_PREVIEW_CHARS`] with a trailing `...`.
fn preview(content: &str) -> String {
    let line = content.lines().find(|l| !l.trim().is_empty()).unwrap_or_default();
    let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_PREVIEW_CHARS {
        return collapsed;
    }
    let mut cut: String = collapsed.chars().take(MAX_PREVIEW_CHARS - 3).collect();
    cut.push_str("...");
    cut
}

/// Read the clipboard when it changed (or was never read).
fn poll_once(
    state: &RwLock<ClipboardState>,
    base: &BaseWidget,
    reader: &dyn ClipboardReader,
) {
    let first = read_state(state).content.is_none();
    if !reader.has_changed() && !first {
        return;
    }
    let result = reader.read();
    let mut s = write_state(state);
    match result {
        Ok(content) => {
            if s.content.as_ref() != Some(&content) {
                base.trigger_auto_hide();
            }
            s.content = Some(content);
            s.error = None;
        }
        Err(err) => s.error = Some(err),
    }
}

impl Widget for ClipboardWidget {
    fn base(&self) -> &BaseWidget { &self.base }

    fn update(&self) -> Result<(), WidgetError> { read_state(&self.state).error.clone().map_or(Ok(()), Err) }

    fn render(&self) -> Result<Option<GrayCanvas>, WidgetError> {
        if self.base.should_hide() {
            return Ok(None);
        }
        let state = snapshot(&self.state);
        let line = match &state.content {
            Some((content, kind)) => self.line(content, *kind),
            None => self.placeholder.clone(),
        };

        let mut canvas = self.base.create_canvas();
        let mut scroll = lock_state(&self.scroll);
        draw_scrolling_text(
            &mut canvas,
            &line,
            &self.text,
            self.base.content_area(),
            Some(&mut *scroll),
            Instant::now(),
        );
        self.base.apply_border(&mut canvas);
        Ok(Some(canvas))
    }

    fn start_pollers(
        &self,
        shutdown: &watch::Receiver<bool>,
    ) -> Vec<JoinHandle<()>> {
        let state = Arc::clone(&self.state);
        let base = Arc::clone(&self.base);
        let reader = Arc::clone(&self.reader);
        vec![spawn_poller(self.base.id(), self.period, shutdown, move || {
            poll_once(&state, &base, reader.as_ref());
        })]
    }

    fn stop(&self) { self.base.stop_once(|| self.reader.close()); }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;
    use crate::config::Position;
    use crate::widgets::test_support::render_checked;

    struct Clip {
        content: Mutex<(String, ContentType)>,
        changed: AtomicBool,
        reads: AtomicUsize,
    }

    impl Clip {
        fn new(text: &str) -> Arc<Self> {
            Arc::new(Self {
                content: Mutex::new((text.to_string(), ContentType::Text)),
                changed: AtomicBool::new(true),
                reads: AtomicUsize::new(0),
            })
        }

        fn set(
            &self,
            text: &str,
            kind: ContentType,
        ) {
            *self.content.lock().expect("test lock") = (text.to_string(), kind);
            self.changed.store(true, Ordering::SeqCst);
        }
    }

    impl ClipboardReader for Clip {
        fn read(&self) -> Result<(String, ContentType), WidgetError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.content.lock().expect("test lock").clone())
        }

        fn has_changed(&self) -> bool { self.changed.swap(false, Ordering::SeqCst) }
    }

    fn config() -> WidgetConfig {
        let mut cfg = WidgetConfig::new("clip", "clipboard", Position::new(0, 0, 60, 12, 0));
        cfg.auto_hide.enabled = true;
        cfg.auto_hide.timeout_s = 30.0;
        cfg
    }

    #[test]
    fn test_preview_collapses_and_truncates() {
        assert_eq!(preview("\n   cargo   build\t--release\nsecond"), "cargo build --release");
        let long = "x".repeat(100);
        let p = preview(&long);
        assert_eq!(p.chars().count(), MAX_PREVIEW_CHARS);
        assert!(p.ends_with("..."));
        assert_eq!(preview(""), "");
    }

    #[test]
    fn test_reads_only_on_change() {
        let clip = Clip::new("hello");
        let w = ClipboardWidget::new(&config(), Arc::clone(&clip) as Arc<dyn ClipboardReader>);
        poll_once(&w.state, &w.base, clip.as_ref());
        poll_once(&w.state, &w.base, clip.as_ref());
        assert_eq!(clip.reads.load(Ordering::SeqCst), 1, "Unchanged clipboard is not re-read");

        clip.set("world", ContentType::Text);
        poll_once(&w.state, &w.base, clip.as_ref());
        assert_eq!(clip.reads.load(Ordering::SeqCst), 2);
        assert_eq!(snapshot(&w.state).content.map(|c| c.0), Some("world".to_string()));
    }

    #[test]
    fn test_change_shows_widget() {
        let clip = Clip::new("hello");
        let w = ClipboardWidget::new(&config(), Arc::clone(&clip) as Arc<dyn ClipboardReader>);
        assert!(render_checked(&w).is_none());
        poll_once(&w.state, &w.base, clip.as_ref());
        assert!(render_checked(&w).is_some());
    }

    #[test]
    fn test_line_per_content_type() {
        let mut cfg = config();
        cfg.text.format = Some("{type}: {content}".to_string());
        let w = ClipboardWidget::new(&cfg, Clip::new(""));
        assert_eq!(w.line("a  b", ContentType::Text), "text: a b");
        assert_eq!(w.line("", ContentType::Image), "image: [image]");
        assert_eq!(w.line("", ContentType::Empty), "(empty)");
    }

    #[test]
    fn test_long_content_scrolls() {
        let clip = Clip::new("a fairly long line that cannot fit in sixty pixels");
        let w = ClipboardWidget::new(&config(), Arc::clone(&clip) as Arc<dyn ClipboardReader>);
        poll_once(&w.state, &w.base, clip.as_ref());
        render_checked(&w);
        assert!(lock_state(&w.scroll).needs_scroll());
    }
}
