//! Now-playing line for a media player.
//!
//! Track fields go through a [`TokenFormatter`] and are laid out with the
//! composite renderer: `{icon}` shows play/pause/stop, `{artist}`,
//! `{title}`, `{album}` and `{state}` expand to text. Overflowing lines
//! scroll horizontally.

use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::animation::ScrollAnimator;
use crate::canvas::GrayCanvas;
use crate::composite::{CompositeRenderer, ShapeKind, TokenSource, classify_with};
use crate::config::WidgetConfig;
use crate::config::constants::MEDIA_POLL_INTERVAL;
use crate::error::WidgetError;
use crate::icons::IconKind;
use crate::metric::strategy::draw_placeholder;
use crate::metric::{ConfigHelper, TextSettings};
use crate::readers::{MediaReader, PlaybackState, TrackInfo};
use crate::tokens::{Token, TokenFormatter, parse_format_tokens};
use crate::widget::{BaseWidget, Widget, lock_state, read_state, snapshot, spawn_poller, write_state};
use crate::widgets::{composite_renderer, draw_composite_line, poll_period};

const TEXT_TOKENS: [&str; 4] = ["artist", "title", "album", "state"];
const DEFAULT_FORMAT: &str = "{icon}{artist} - {title}";
const NOT_RUNNING: &str = "[Not running]";

#[derive(Clone, Debug, Default)]
struct MediaState {
    track: Option<TrackInfo>,
    error: Option<WidgetError>,
}

pub struct MediaWidget {
    base: Arc<BaseWidget>,
    reader: Arc<dyn MediaReader>,
    tokens: Vec<Token>,
    renderer: CompositeRenderer,
    text: TextSettings,
    scroll: Mutex<ScrollAnimator>,
    placeholder: String,
    period: Duration,
    state: Arc<RwLock<MediaState>>,
}

impl MediaWidget {
    pub fn new(
        config: &WidgetConfig,
        reader: Arc<dyn MediaReader>,
    ) -> Self {
        let format = config.text.format.as_deref().unwrap_or(DEFAULT_FORMAT);
        Self {
            base: Arc::new(BaseWidget::new(config)),
            reader,
            tokens: parse_format_tokens(format, classify_with(&TEXT_TOKENS)),
            renderer: composite_renderer(config),
            text: ConfigHelper::new(config).text(),
            scroll: Mutex::new(ScrollAnimator::from_config(&config.scroll)),
            placeholder: config.placeholder.clone().unwrap_or_else(|| NOT_RUNNING.to_string()),
            period: poll_period(config, MEDIA_POLL_INTERVAL),
            state: Arc::new(RwLock::new(MediaState::default())),
        }
    }
}

/// Same track in the same playback state.
fn same_track(
    a: Option<&TrackInfo>,
    b: Option<&TrackInfo>,
) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.state == b.state && a.artist == b.artist && a.title == b.title,
        _ => false,
    }
}

fn record(
    state: &RwLock<MediaState>,
    base: &BaseWidget,
    result: Result<Option<TrackInfo>, WidgetError>,
) {
    let mut s = write_state(state);
    match result {
        Ok(track) => {
            if !same_track(s.track.as_ref(), track.as_ref()) {
                base.trigger_auto_hide();
            }
            s.track = track;
            s.error = None;
        }
        Err(err) => s.error = Some(err),
    }
}

struct TrackTokens {
    fields: TokenFormatter,
    state: PlaybackState,
}

impl TrackTokens {
    fn new(track: &TrackInfo) -> Self {
        let mut fields = TokenFormatter::new();
        fields.set("artist", track.artist.as_str());
        fields.set("title", track.title.as_str());
        fields.set("album", track.album.as_str());
        fields.set(
            "state",
            match track.state {
                PlaybackState::Playing => "playing",
                PlaybackState::Paused => "paused",
                PlaybackState::Stopped => "stopped",
            },
        );
        Self {
            fields,
            state: track.state,
        }
    }
}

impl TokenSource for TrackTokens {
    fn text(
        &self,
        name: &str,
        _param: Option<&str>,
    ) -> String {
        self.fields.get(name).unwrap_or_default().to_string()
    }

    fn icon(
        &self,
        _name: &str,
    ) -> Option<IconKind> {
        Some(match self.state {
            PlaybackState::Playing => IconKind::Play,
            PlaybackState::Paused => IconKind::Pause,
            PlaybackState::Stopped => IconKind::Stop,
        })
    }

    fn level(
        &self,
        _shape: ShapeKind,
    ) -> Option<f64> {
        None
    }
}

impl Widget for MediaWidget {
    fn base(&self) -> &BaseWidget { &self.base }

    fn update(&self) -> Result<(), WidgetError> { read_state(&self.state).error.clone().map_or(Ok(()), Err) }

    fn render(&self) -> Result<Option<GrayCanvas>, WidgetError> {
        if self.base.should_hide() {
            return Ok(None);
        }
        let state = snapshot(&self.state);
        let mut canvas = self.base.create_canvas();
        let area = self.base.content_area();

        match &state.track {
            Some(track) => {
                let layout = self.renderer.layout(&self.tokens, &TrackTokens::new(track), area);
                let mut scroll = lock_state(&self.scroll);
                draw_composite_line(&mut canvas, &self.renderer, &layout, area, Some(&mut *scroll), None, Instant::now());
            }
            None => draw_placeholder(&mut canvas, &self.placeholder, &self.text, area.x),
        }

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
            record(&state, &base, reader.now_playing());
        })]
    }
}
