//! Gesture-driven pan/zoom controller
//!
//! The controller owns the map [`Transform`]. Gestures and animation frames
//! only propose candidates; every candidate passes through one private
//! clamp-and-commit step, so scale never leaves the configured bounds and the
//! pan stays within `extent × max(1, scale) / 2 + margin` on each axis.
//!
//! Transform model: `screen = center + scale × (content − center + translate)`,
//! i.e. translate is expressed in unscaled canvas units. Animation frames are
//! driven by the host calling [`ViewportController::tick`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared::models::{Point, Rect};

use crate::config::ViewportConfig;

const EPSILON: f64 = 1e-9;

/// Current pan/zoom state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        scale: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    /// Screen position of a content point
    pub fn project(&self, content: Point, center: Point) -> Point {
        Point::new(
            center.x + self.scale * (content.x - center.x + self.translate_x),
            center.y + self.scale * (content.y - center.y + self.translate_y),
        )
    }

    /// Content point under a screen position
    pub fn unproject(&self, screen: Point, center: Point) -> Point {
        Point::new(
            center.x + (screen.x - center.x) / self.scale - self.translate_x,
            center.y + (screen.y - center.y) / self.scale - self.translate_y,
        )
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Copy)]
enum Motion {
    Idle,
    /// Ballistic pan after release; velocity in screen units per second
    Inertia {
        vx: f64,
        vy: f64,
        elapsed: Duration,
    },
    /// Zoom that keeps one screen point fixed over a content point
    Zoom {
        pivot: Point,
        anchor: Point,
        from: f64,
        to: f64,
        elapsed: Duration,
    },
    /// Plain interpolation between two transforms (focus, reset)
    Tween {
        from: Transform,
        to: Transform,
        elapsed: Duration,
    },
}

fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Pan/zoom state machine for the map canvas
#[derive(Debug, Clone)]
pub struct ViewportController {
    config: ViewportConfig,
    width: f64,
    height: f64,
    transform: Transform,
    motion: Motion,
    pinch_last: Option<f64>,
}

impl ViewportController {
    /// Create a controller for a canvas of `width` x `height` units
    pub fn new(config: ViewportConfig, width: f64, height: f64) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid viewport config, using defaults");
                ViewportConfig::default()
            }
        };
        let mut controller = Self {
            config,
            width: 1.0,
            height: 1.0,
            transform: Transform::IDENTITY,
            motion: Motion::Idle,
            pinch_last: None,
        };
        controller.set_extent(width, height);
        controller
    }

    pub fn current_transform(&self) -> Transform {
        self.transform
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn is_animating(&self) -> bool {
        !matches!(self.motion, Motion::Idle)
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Content point under a screen position (hit testing)
    pub fn screen_to_content(&self, screen: Point) -> Point {
        self.transform.unproject(screen, self.center())
    }

    /// Resize the canvas; the current transform is re-clamped
    pub fn set_extent(&mut self, width: f64, height: f64) {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            self.width = width;
            self.height = height;
            self.commit(self.transform);
        } else {
            tracing::debug!(width, height, "Ignoring invalid canvas extent");
        }
    }

    // ========================================================================
    // Gestures
    // ========================================================================

    /// Drag by a screen-space delta
    pub fn on_pan_delta(&mut self, dx: f64, dy: f64) {
        if !(dx.is_finite() && dy.is_finite()) {
            return;
        }
        self.motion = Motion::Idle;
        let t = self.transform;
        self.commit(Transform {
            translate_x: t.translate_x + dx / t.scale,
            translate_y: t.translate_y + dy / t.scale,
            ..t
        });
    }

    /// Finger lifted with a residual velocity (screen units per second)
    pub fn on_pan_end(&mut self, vx: f64, vy: f64) {
        if !(vx.is_finite() && vy.is_finite()) || vx.hypot(vy) < self.config.min_velocity {
            self.motion = Motion::Idle;
            return;
        }
        self.motion = Motion::Inertia {
            vx,
            vy,
            elapsed: Duration::ZERO,
        };
    }

    pub fn on_pinch_start(&mut self) {
        self.motion = Motion::Idle;
        self.pinch_last = Some(1.0);
    }

    /// Cumulative gesture scale since the pinch began.
    ///
    /// Only the ratio to the previous factor is applied, so a pinch that is
    /// interrupted and resumed continues from the current scale.
    pub fn on_pinch_factor(&mut self, factor: f64, focal: Option<Point>) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        self.motion = Motion::Idle;
        let last = self.pinch_last.unwrap_or(1.0);
        self.pinch_last = Some(factor);

        let center = self.center();
        let pivot = focal
            .filter(Point::is_finite)
            .map(|p| Point::new(p.x - center.x, p.y - center.y))
            .unwrap_or_default();
        self.zoom_about(self.transform.scale * (factor / last), pivot);
    }

    pub fn on_pinch_end(&mut self) {
        self.pinch_last = None;
    }

    /// Zoom in around the tapped point, or back out when already zoomed
    pub fn on_double_tap(&mut self, point: Point) {
        if !point.is_finite() {
            return;
        }
        let target = self.config.double_tap_scale.clamp(self.config.min_scale, self.config.max_scale);
        if self.transform.scale >= target - EPSILON {
            self.reset();
            return;
        }

        let center = self.center();
        let pivot = Point::new(point.x - center.x, point.y - center.y);
        let t = self.transform;
        let anchor = Point::new(
            pivot.x / t.scale - t.translate_x,
            pivot.y / t.scale - t.translate_y,
        );
        self.pinch_last = None;
        self.motion = Motion::Zoom {
            pivot,
            anchor,
            from: t.scale,
            to: target,
            elapsed: Duration::ZERO,
        };
    }

    /// Animate so `region` (canvas units) fills the canvas, minus padding
    pub fn focus_on(&mut self, region: Rect) {
        let valid = [region.x, region.y, region.width, region.height]
            .iter()
            .all(|v| v.is_finite())
            && region.width >= 0.0
            && region.height >= 0.0;
        if !valid {
            tracing::debug!(?region, "Ignoring invalid focus region");
            return;
        }

        let fill = 1.0 - 2.0 * self.config.focus_padding;
        let scale = if region.width <= EPSILON && region.height <= EPSILON {
            self.config.double_tap_scale
        } else {
            let sx = self.width * fill / region.width.max(EPSILON);
            let sy = self.height * fill / region.height.max(EPSILON);
            sx.min(sy)
        };

        let center = self.center();
        let target = region.center();
        let to = self.clamped(Transform {
            scale,
            translate_x: center.x - target.x,
            translate_y: center.y - target.y,
        });
        self.start_tween(to);
    }

    /// Animate back to the identity transform
    pub fn reset(&mut self) {
        self.pinch_last = None;
        self.start_tween(Transform::IDENTITY);
    }

    // ========================================================================
    // Animation frames
    // ========================================================================

    /// Advance running motion by `dt`; returns whether motion continues
    pub fn tick(&mut self, dt: Duration) -> bool {
        match self.motion {
            Motion::Idle => {}
            Motion::Inertia { vx, vy, elapsed } => self.step_inertia(vx, vy, elapsed, dt),
            Motion::Zoom {
                pivot,
                anchor,
                from,
                to,
                elapsed,
            } => {
                let elapsed = elapsed + dt;
                let progress = self.progress(elapsed);
                let scale = self.clamp_scale(lerp(from, to, ease_out_cubic(progress)));
                self.commit(Transform {
                    scale,
                    translate_x: pivot.x / scale - anchor.x,
                    translate_y: pivot.y / scale - anchor.y,
                });
                self.motion = if progress >= 1.0 {
                    Motion::Idle
                } else {
                    Motion::Zoom {
                        pivot,
                        anchor,
                        from,
                        to,
                        elapsed,
                    }
                };
            }
            Motion::Tween { from, to, elapsed } => {
                let elapsed = elapsed + dt;
                let progress = self.progress(elapsed);
                if progress >= 1.0 {
                    self.commit(to);
                    self.motion = Motion::Idle;
                } else {
                    let e = ease_out_cubic(progress);
                    self.commit(Transform {
                        scale: lerp(from.scale, to.scale, e),
                        translate_x: lerp(from.translate_x, to.translate_x, e),
                        translate_y: lerp(from.translate_y, to.translate_y, e),
                    });
                    self.motion = Motion::Tween { from, to, elapsed };
                }
            }
        }
        self.is_animating()
    }

    fn step_inertia(&mut self, vx: f64, vy: f64, elapsed: Duration, dt: Duration) {
        let secs = dt.as_secs_f64();
        let tau = self.config.inertia_time_constant.as_secs_f64().max(EPSILON);
        let decay = (-secs / tau).exp();
        // distance covered by v·e^(-t/τ) over this frame
        let travel = tau * (1.0 - decay);

        let t = self.transform;
        let wanted_x = t.translate_x + vx * travel / t.scale;
        let wanted_y = t.translate_y + vy * travel / t.scale;
        let committed = self.commit(Transform {
            translate_x: wanted_x,
            translate_y: wanted_y,
            ..t
        });

        // hitting the pan limit kills velocity on that axis
        let vx = if (committed.translate_x - wanted_x).abs() > EPSILON { 0.0 } else { vx * decay };
        let vy = if (committed.translate_y - wanted_y).abs() > EPSILON { 0.0 } else { vy * decay };
        let elapsed = elapsed + dt;

        self.motion = if vx.hypot(vy) < self.config.min_velocity
            || elapsed >= self.config.settle_duration
        {
            Motion::Idle
        } else {
            Motion::Inertia { vx, vy, elapsed }
        };
    }

    fn progress(&self, elapsed: Duration) -> f64 {
        let total = self.config.animation_duration.as_secs_f64();
        if total <= 0.0 {
            1.0
        } else {
            (elapsed.as_secs_f64() / total).min(1.0)
        }
    }

    fn start_tween(&mut self, to: Transform) {
        self.motion = Motion::Tween {
            from: self.transform,
            to,
            elapsed: Duration::ZERO,
        };
    }

    // ========================================================================
    // Clamp-and-commit
    // ========================================================================

    fn zoom_about(&mut self, target_scale: f64, pivot: Point) {
        let old = self.transform;
        // clamp first so translate is derived from the scale actually applied
        let scale = self.clamp_scale(target_scale);
        let delta = scale - old.scale;
        let offset = Point::new(pivot.x / old.scale, pivot.y / old.scale);
        self.commit(Transform {
            scale,
            translate_x: old.translate_x - delta * offset.x / scale,
            translate_y: old.translate_y - delta * offset.y / scale,
        });
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.config.min_scale, self.config.max_scale)
    }

    fn pan_limits(&self, scale: f64) -> (f64, f64) {
        let grow = scale.max(1.0);
        (
            (self.width * grow / 2.0 + self.config.pan_margin).max(0.0),
            (self.height * grow / 2.0 + self.config.pan_margin).max(0.0),
        )
    }

    fn clamped(&self, candidate: Transform) -> Transform {
        let current = self.transform;
        let scale = if candidate.scale.is_finite() && candidate.scale > 0.0 {
            self.clamp_scale(candidate.scale)
        } else {
            current.scale
        };
        let (lx, ly) = self.pan_limits(scale);
        let pick = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        Transform {
            scale,
            translate_x: pick(candidate.translate_x, current.translate_x).clamp(-lx, lx),
            translate_y: pick(candidate.translate_y, current.translate_y).clamp(-ly, ly),
        }
    }

    fn commit(&mut self, candidate: Transform) -> Transform {
        self.transform = self.clamped(candidate);
        self.transform
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    fn controller() -> ViewportController {
        ViewportController::new(ViewportConfig::default(), 400.0, 400.0)
    }

    fn settle(vp: &mut ViewportController) -> usize {
        let mut frames = 0;
        while vp.tick(FRAME) {
            frames += 1;
            assert!(frames < 1_000, "motion never settled");
        }
        frames
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-6, "{a} != {b}");
    }

    #[test]
    fn test_starts_at_identity() {
        assert!(controller().current_transform().is_identity());
    }

    #[test]
    fn test_pinch_is_incremental() {
        let mut vp = controller();
        vp.on_pinch_start();
        vp.on_pinch_factor(1.5, None);
        assert_close(vp.current_transform().scale, 1.5);
        vp.on_pinch_factor(2.0, None);
        assert_close(vp.current_transform().scale, 2.0);
        vp.on_pinch_end();

        // a new gesture starts from the current scale, not from its own 1.1
        vp.on_pinch_start();
        vp.on_pinch_factor(1.1, None);
        assert_close(vp.current_transform().scale, 2.2);
    }

    #[test]
    fn test_scale_is_clamped() {
        let mut vp = controller();
        vp.on_pinch_start();
        vp.on_pinch_factor(10.0, None);
        assert_close(vp.current_transform().scale, 3.1);
        vp.on_pinch_factor(0.01, None);
        assert_close(vp.current_transform().scale, 0.7);
    }

    #[test]
    fn test_bad_gesture_input_is_ignored() {
        let mut vp = controller();
        vp.on_pinch_start();
        for f in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            vp.on_pinch_factor(f, None);
        }
        vp.on_pan_delta(f64::NAN, 3.0);
        vp.on_double_tap(Point::new(f64::NAN, 1.0));
        vp.focus_on(Rect::new(0.0, 0.0, -5.0, 10.0));
        assert!(vp.current_transform().is_identity());
        assert!(!vp.is_animating());
    }

    #[test]
    fn test_pan_limit_grows_with_scale() {
        let mut vp = controller();
        vp.on_pan_delta(10_000.0, -10_000.0);
        let t = vp.current_transform();
        assert_close(t.translate_x, 200.0 + 24.0);
        assert_close(t.translate_y, -(200.0 + 24.0));

        vp.on_pinch_start();
        vp.on_pinch_factor(2.0, None);
        vp.on_pinch_end();
        vp.on_pan_delta(100_000.0, 0.0);
        assert_close(vp.current_transform().translate_x, 400.0 + 24.0);
    }

    #[test]
    fn test_pan_is_divided_by_scale() {
        let mut vp = controller();
        vp.on_pinch_start();
        vp.on_pinch_factor(2.0, None);
        vp.on_pan_delta(40.0, 20.0);
        let t = vp.current_transform();
        assert_close(t.translate_x, 20.0);
        assert_close(t.translate_y, 10.0);
    }

    #[test]
    fn test_pinch_keeps_focal_point_fixed() {
        let mut vp = controller();
        let focal = Point::new(320.0, 120.0);
        let before = vp.screen_to_content(focal);
        vp.on_pinch_start();
        vp.on_pinch_factor(1.8, Some(focal));
        let after = vp.current_transform().project(before, vp.center());
        assert_close(after.x, focal.x);
        assert_close(after.y, focal.y);
    }

    #[test]
    fn test_double_tap_zooms_to_point() {
        let mut vp = controller();
        let tap = Point::new(300.0, 200.0);
        let under_finger = vp.screen_to_content(tap);

        vp.on_double_tap(tap);
        assert!(vp.is_animating());
        settle(&mut vp);

        let t = vp.current_transform();
        assert_close(t.scale, 2.0);
        assert_close(t.translate_x, -50.0);
        assert_close(t.translate_y, 0.0);
        let screen = t.project(under_finger, vp.center());
        assert_close(screen.x, tap.x);
        assert_close(screen.y, tap.y);
    }

    #[test]
    fn test_double_tap_when_zoomed_resets() {
        let mut vp = controller();
        vp.on_double_tap(Point::new(100.0, 100.0));
        settle(&mut vp);
        vp.on_double_tap(Point::new(100.0, 100.0));
        settle(&mut vp);
        assert!(vp.current_transform().is_identity());
    }

    #[test]
    fn test_inertia_decays_and_settles_within_a_second() {
        let mut vp = ViewportController::new(ViewportConfig::default(), 1000.0, 800.0);
        vp.on_pan_end(1000.0, 0.0);
        assert!(vp.is_animating());

        let mut last = vp.current_transform().translate_x;
        let mut frames = 0;
        while vp.tick(FRAME) {
            let x = vp.current_transform().translate_x;
            assert!(x >= last);
            last = x;
            frames += 1;
        }
        assert!(frames <= 63, "took {frames} frames");
        let x = vp.current_transform().translate_x;
        // v·τ is the full ballistic travel
        assert!(x > 200.0 && x <= 250.0, "travelled {x}");
    }

    #[test]
    fn test_slow_release_stops_immediately() {
        let mut vp = controller();
        vp.on_pan_end(1.0, 1.0);
        assert!(!vp.is_animating());
    }

    #[test]
    fn test_inertia_stops_at_pan_limit() {
        let mut vp = controller();
        vp.on_pan_delta(220.0, 0.0);
        vp.on_pan_end(5_000.0, 0.0);
        settle(&mut vp);
        assert_close(vp.current_transform().translate_x, 224.0);
    }

    #[test]
    fn test_focus_centers_region() {
        let mut vp = ViewportController::new(ViewportConfig::default(), 1000.0, 1000.0);
        let region = Rect::new(100.0, 100.0, 100.0, 100.0);
        vp.focus_on(region);
        settle(&mut vp);

        let t = vp.current_transform();
        assert_close(t.scale, 3.1);
        let screen = t.project(region.center(), vp.center());
        assert_close(screen.x, 500.0);
        assert_close(screen.y, 500.0);
    }

    #[test]
    fn test_focus_on_large_region_zooms_out() {
        let mut vp = ViewportController::new(ViewportConfig::default(), 1000.0, 1000.0);
        vp.focus_on(Rect::new(0.0, 0.0, 1000.0, 1000.0));
        settle(&mut vp);
        assert_close(vp.current_transform().scale, 0.7);
    }

    #[test]
    fn test_reset_always_returns_to_identity() {
        let mut vp = controller();
        vp.on_pinch_start();
        vp.on_pinch_factor(2.7, Some(Point::new(10.0, 390.0)));
        vp.on_pinch_end();
        vp.on_pan_delta(-87.0, 33.0);
        vp.on_pan_end(900.0, -400.0);
        vp.tick(FRAME);

        vp.reset();
        let frames = settle(&mut vp);
        assert!(frames > 0);
        assert!(vp.current_transform().is_identity());
    }

    #[test]
    fn test_gesture_interrupts_animation() {
        let mut vp = controller();
        vp.reset();
        vp.on_double_tap(Point::new(200.0, 200.0));
        vp.tick(FRAME);
        vp.on_pan_delta(1.0, 0.0);
        assert!(!vp.is_animating());
    }

    #[test]
    fn test_scale_never_leaves_bounds_under_rapid_input() {
        let mut vp = controller();
        let factors = [3.0, 0.1, 7.5, 1.0001, 0.5, 12.0, 0.03, 2.0];
        for (i, f) in factors.iter().cycle().take(400).enumerate() {
            if i % 17 == 0 {
                vp.on_pinch_start();
            }
            vp.on_pinch_factor(*f * (1.0 + i as f64 / 100.0), Some(Point::new(i as f64, 400.0 - i as f64)));
            vp.on_pan_delta((i as f64).sin() * 300.0, (i as f64).cos() * 300.0);
            if i % 5 == 0 {
                vp.on_double_tap(Point::new(50.0, 60.0));
            }
            vp.tick(FRAME);
            let t = vp.current_transform();
            assert!((0.7..=3.1).contains(&t.scale), "scale {}", t.scale);
            assert!(t.translate_x.is_finite() && t.translate_y.is_finite());
        }
    }

    #[test]
    fn test_resize_reclamps() {
        let mut vp = controller();
        vp.on_pan_delta(10_000.0, 0.0);
        vp.set_extent(100.0, 100.0);
        assert_close(vp.current_transform().translate_x, 50.0 + 24.0);
        vp.set_extent(f64::NAN, 10.0);
        assert_close(vp.center().x, 50.0);
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let vp = ViewportController::new(
            ViewportConfig::default().with_scale_bounds(2.0, 1.0),
            100.0,
            100.0,
        );
        assert_eq!(vp.config(), &ViewportConfig::default());
    }

    #[test]
    fn test_negative_pan_margin_falls_back_to_defaults() {
        let mut vp = ViewportController::new(
            ViewportConfig::default().with_pan_margin(-1000.0),
            400.0,
            400.0,
        );
        assert_eq!(vp.config().pan_margin, ViewportConfig::default().pan_margin);
        vp.on_pan_delta(5000.0, -5000.0);
        let t = vp.current_transform();
        assert!(t.translate_x.is_finite() && t.translate_x > 0.0);
        assert!(t.translate_y.is_finite() && t.translate_y < 0.0);
    }
}
