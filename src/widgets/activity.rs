//! Sleepy face that dozes off when the user goes idle.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::animation::{SleepySprite, SpriteFrame};
use crate::bitmap::{HAlign, VAlign};
use crate::canvas::GrayCanvas;
use crate::config::WidgetConfig;
use crate::config::constants::{FOREGROUND, IDLE_TIMEOUT_S};
use crate::error::WidgetError;
use crate::metric::{ConfigHelper, TextSettings};
use crate::readers::ActivityReader;
use crate::widget::{BaseWidget, ContentArea, Widget, lock_state};

pub struct ActivityWidget {
    base: BaseWidget,
    reader: Arc<dyn ActivityReader>,
    idle_timeout: Duration,
    sprite: Mutex<SleepySprite>,
    /// Corner label drawn while asleep.
    label: TextSettings,
    placeholder: String,
}

impl ActivityWidget {
    pub fn new(
        config: &WidgetConfig,
        reader: Arc<dyn ActivityReader>,
    ) -> Self {
        let timeout = config.idle_timeout_s.unwrap_or(IDLE_TIMEOUT_S);
        let label = TextSettings {
            h_align: HAlign::Right,
            v_align: VAlign::Top,
            ..ConfigHelper::new(config).text()
        };
        Self {
            base: BaseWidget::new(config),
            reader,
            idle_timeout: Duration::from_secs_f64(if timeout.is_finite() { timeout.max(0.0) } else { IDLE_TIMEOUT_S }),
            sprite: Mutex::new(SleepySprite::new(Instant::now())),
            label,
            placeholder: config.placeholder.clone().unwrap_or_else(|| "Zzz...".to_string()),
        }
    }

    fn update_at(
        &self,
        now: Instant,
    ) -> Result<(), WidgetError> {
        let asleep = self.reader.idle_for()? >= self.idle_timeout;
        let mut sprite = lock_state(&self.sprite);
        if sprite.is_asleep() != asleep {
            self.base.trigger_auto_hide_at(now);
        }
        sprite.set_asleep(asleep, now);
        Ok(())
    }

    fn render_at(
        &self,
        now: Instant,
    ) -> Option<GrayCanvas> {
        if self.base.should_hide_at(now) {
            return None;
        }
        let (frame, asleep) = {
            let mut sprite = lock_state(&self.sprite);
            (sprite.frame(now), sprite.is_asleep())
        };
        let mut canvas = self.base.create_canvas();
        let area = self.base.content_area();
        draw_eyes(&mut canvas, area, frame, FOREGROUND);
        if asleep {
            self.label.draw_in(&mut canvas, &self.placeholder, area);
        }
        self.base.apply_border(&mut canvas);
        Some(canvas)
    }
}

/// Two eyes centred in `area`; a closed eye is a one-pixel line.
fn draw_eyes(
    canvas: &mut GrayCanvas,
    area: ContentArea,
    frame: SpriteFrame,
    color: u8,
) {
    if area.w <= 0 || area.h <= 0 {
        return;
    }
    let eye_w = (area.w / 6).max(1);
    let full_h = (area.h / 3).max(1);
    let h = (full_h * frame.eye_open() / 3).max(1);
    let y = area.y + area.h / 2 - h / 2;
    for cx in [area.x + area.w / 3, area.x + 2 * area.w / 3] {
        canvas.fill_rect(cx - eye_w / 2, y, eye_w, h, color);
    }
}

impl Widget for ActivityWidget {
    fn base(&self) -> &BaseWidget { &self.base }

    fn update(&self) -> Result<(), WidgetError> { self.update_at(Instant::now()) }

    fn render(&self) -> Result<Option<GrayCanvas>, WidgetError> { Ok(self.render_at(Instant::now())) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Position;

    struct Idle(Duration);

    impl ActivityReader for Idle {
        fn idle_for(&self) -> Result<Duration, WidgetError> { Ok(self.0) }
    }

    fn widget(idle_s: u64) -> ActivityWidget {
        let mut cfg = WidgetConfig::new("act", "activity", Position::new(0, 0, 60, 24, 0));
        cfg.idle_timeout_s = Some(30.0);
        ActivityWidget::new(&cfg, Arc::new(Idle(Duration::from_secs(idle_s))))
    }

    fn eye_rows(canvas: &GrayCanvas) -> usize {
        let x = 20;
        (0..canvas.height() as i32).filter(|&y| canvas.get(x, y) == Some(255)).count()
    }

    #[test]
    fn test_active_user_keeps_eyes_open() {
        let w = widget(5);
        let t0 = Instant::now();
        w.update_at(t0).expect("idle read ok");
        assert!(!lock_state(&w.sprite).is_asleep());
        let c = w.render_at(t0).expect("visible");
        assert!(eye_rows(&c) >= 1);
    }

    #[test]
    fn test_idle_user_falls_asleep_with_label() {
        let w = widget(120);
        let t0 = Instant::now();
        w.update_at(t0).expect("idle read ok");
        assert!(lock_state(&w.sprite).is_asleep());

        let later = t0 + Duration::from_secs(10);
        let c = w.render_at(later).expect("visible");
        assert_eq!(eye_rows(&c), 1, "Closed eyes are a single line");
        let top_right = (40..60).any(|x| (0..8).any(|y| c.get(x, y) == Some(255)));
        assert!(top_right, "Label sits in the top-right corner");
    }

    #[test]
    fn test_eye_height_follows_frame() {
        let area = ContentArea { x: 0, y: 0, w: 60, h: 24 };
        let mut open = GrayCanvas::new(60, 24);
        draw_eyes(&mut open, area, SpriteFrame::Awake, 255);
        let mut drowsy = GrayCanvas::new(60, 24);
        draw_eyes(&mut drowsy, area, SpriteFrame::Drowsy, 255);
        assert_eq!(eye_rows(&open), 8);
        assert!(eye_rows(&drowsy) < eye_rows(&open));
    }

    #[test]
    fn test_tiny_area_does_not_panic() {
        let mut c = GrayCanvas::new(1, 1);
        draw_eyes(&mut c, ContentArea { x: 0, y: 0, w: 1, h: 1 }, SpriteFrame::Awake, 255);
        draw_eyes(&mut c, ContentArea { x: 0, y: 0, w: 0, h: 0 }, SpriteFrame::Awake, 255);
    }
}
