//! Clock and status view redrawn on every refresh
//!
//! Text needs a font; without one the view falls back to bar gauges so the
//! refresh loop still has something that changes every second.

use chrono::{NaiveDateTime, Timelike};
use smart_display::{Canvas, Color, FontRenderer, Framebuffer};

const BACKGROUND: Color = Color::BLACK;
const HEADER: Color = Color::rgb(24, 40, 72);
const ACCENT: Color = Color::rgb(0, 170, 255);
const TRACK: Color = Color::rgb(40, 40, 40);

const MARGIN: u16 = 16;
const HEADER_HEIGHT: u16 = 48;
const BAR_HEIGHT: u16 = 16;
const BAR_STEP: u16 = BAR_HEIGHT + MARGIN / 2;

pub struct StatusView {
    font: Option<FontRenderer>,
    title: String,
}

impl StatusView {
    pub fn new(font: Option<FontRenderer>, title: impl Into<String>) -> Self {
        Self {
            font,
            title: title.into(),
        }
    }

    /// Redraw the whole view for `now`
    pub fn draw(&self, fb: &mut Framebuffer, now: NaiveDateTime, refreshes: u64) {
        fb.fill(BACKGROUND);
        fb.fill_rect(0, 0, fb.width(), HEADER_HEIGHT, HEADER);

        let gauges = [
            (now.hour(), 24),
            (now.minute(), 60),
            (now.second(), 60),
        ];
        let gauge_top = fb
            .height()
            .saturating_sub(MARGIN + gauges.len() as u16 * BAR_STEP);
        for (i, (value, max)) in gauges.into_iter().enumerate() {
            draw_gauge(fb, gauge_top + i as u16 * BAR_STEP, value, max);
        }

        if let Some(font) = &self.font {
            let x = i32::from(MARGIN);
            font.draw_string(fb, x, i32::from(MARGIN / 2), &self.title, Color::WHITE);

            // date right-aligned in the header
            let date = now.format("%a %d %b %Y").to_string();
            let date_x = i32::from(fb.width()) - x - font.measure_string(&date).ceil() as i32;
            font.draw_string(fb, date_x, i32::from(MARGIN / 2), &date, Color::WHITE);

            let time = now.format("%H:%M:%S").to_string();
            let body_top = i32::from(HEADER_HEIGHT + MARGIN);
            font.draw_string(fb, x, body_top, &time, ACCENT);
            font.draw_string(
                fb,
                x,
                body_top + font.line_height().round() as i32,
                &format!("refresh #{}", refreshes),
                Color::WHITE,
            );
        }
    }
}

/// Horizontal bar filled in proportion to `value / max`
fn draw_gauge(fb: &mut Framebuffer, y: u16, value: u32, max: u32) {
    let track = fb.width().saturating_sub(2 * MARGIN);
    let filled = (u32::from(track) * value.min(max) / max.max(1)) as u16;
    fb.fill_rect(MARGIN, y, track, BAR_HEIGHT, TRACK);
    fb.fill_rect(MARGIN, y, filled, BAR_HEIGHT, ACCENT);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use smart_display::{DamageTracker, Geometry};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_same_time_draws_same_frame() {
        let view = StatusView::new(None, "status");
        let mut a = Framebuffer::new(480, 320);
        let mut b = Framebuffer::filled(480, 320, Color::RED);
        view.draw(&mut a, at(12, 30, 5), 1);
        view.draw(&mut b, at(12, 30, 5), 1);
        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn test_next_second_dirties_only_seconds_gauge() {
        let view = StatusView::new(None, "status");
        let geometry = Geometry::new(480, 320, 16).unwrap();
        let mut tracker = DamageTracker::new(geometry);
        let mut fb = Framebuffer::new(480, 320);

        view.draw(&mut fb, at(8, 15, 10), 1);
        for tile in tracker.scan(&fb).unwrap() {
            tracker.extract_and_commit(&fb, tile).unwrap();
        }

        view.draw(&mut fb, at(8, 15, 11), 2);
        let dirty = tracker.scan(&fb).unwrap();
        assert!(!dirty.is_empty());

        // seconds gauge is the bottom bar
        let seconds_y = fb.height() - MARGIN - BAR_STEP;
        for tile in dirty {
            let rect = geometry.tile_rect(tile);
            assert!(rect.ey >= seconds_y, "unexpected dirty tile {:?}", rect);
        }
        assert_eq!(fb.pixel_at(0, 0), HEADER);
        assert_eq!(fb.pixel_at(0, HEADER_HEIGHT), BACKGROUND);
    }

    #[test]
    fn test_gauge_fill() {
        let mut fb = Framebuffer::new(100, 40);
        draw_gauge(&mut fb, 0, 30, 60);
        let track = 100 - 2 * MARGIN;
        let mid = MARGIN + track / 2;
        assert_eq!(fb.pixel_at(mid - 1, 0), ACCENT);
        assert_eq!(fb.pixel_at(mid, 0), TRACK);
    }
}
