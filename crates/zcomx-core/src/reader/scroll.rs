//! Smooth scrolling for the scroller presentation
//!
//! `ScrollAnimator` eases the scroll offset (in pixels) toward a target over a
//! configured duration. Call `update()` every frame to advance it.

use std::time::Duration;

use tokio::time::Instant;

use crate::config::{EasingType, ScrollConfig};

impl EasingType {
    /// Map progress `t` in [0, 1] to eased progress in [0, 1]
    #[inline]
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingType::None => if t < 1.0 { 0.0 } else { 1.0 },
            EasingType::Linear => t,
            EasingType::Cubic => 1.0 - (1.0 - t).powi(3),
            EasingType::Quintic => 1.0 - (1.0 - t).powi(5),
            EasingType::EaseOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f64.powf(-10.0 * t)
                }
            }
        }
    }
}

impl ScrollConfig {
    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    /// Frame interval while animating
    pub fn animation_tick_duration(&self) -> Duration {
        if self.animation_fps == 0 {
            Duration::from_millis(16) // ~60fps fallback
        } else {
            Duration::from_millis(1000 / self.animation_fps as u64)
        }
    }

    pub fn is_smooth(&self) -> bool {
        self.smooth_enabled && self.animation_duration_ms > 0
    }
}

#[inline]
fn lerp_u32(from: u32, to: u32, t: f64) -> u32 {
    let from = from as f64;
    (from + (to as f64 - from) * t).round().max(0.0) as u32
}

#[derive(Debug, Clone)]
struct ActiveAnimation {
    start: Instant,
    from: u32,
    to: u32,
    duration: Duration,
    easing: EasingType,
}

#[derive(Debug, Clone)]
pub struct ScrollAnimator {
    animation: Option<ActiveAnimation>,
    config: ScrollConfig,
    current: u32,
}

impl ScrollAnimator {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            animation: None,
            config,
            current: 0,
        }
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Final position once the running animation settles
    pub fn target(&self) -> u32 {
        self.animation.as_ref().map(|a| a.to).unwrap_or(self.current)
    }

    #[inline]
    pub fn current(&self) -> u32 {
        self.current
    }

    /// Jump without animating
    pub fn set(&mut self, position: u32) {
        self.animation = None;
        self.current = position;
    }

    /// Animate toward `target`, clamped to `max`
    ///
    /// Jumps immediately when smooth scrolling is disabled.
    pub fn scroll_to(&mut self, target: u32, max: u32) {
        let target = target.min(max);

        if !self.config.is_smooth() {
            self.set(target);
            return;
        }

        if self.current == target {
            self.animation = None;
            return;
        }

        self.animation = Some(ActiveAnimation {
            start: Instant::now(),
            from: self.current,
            to: target,
            duration: self.config.animation_duration(),
            easing: self.config.easing,
        });
    }

    /// Move relative to the pending target
    pub fn scroll_by(&mut self, delta: i64, max: u32) {
        let target = (self.target() as i64 + delta).clamp(0, max as i64) as u32;
        self.scroll_to(target, max);
    }

    /// Advance the animation and return the current position
    pub fn update(&mut self, max: u32) -> u32 {
        if let Some(ref anim) = self.animation {
            let elapsed = anim.start.elapsed();
            if elapsed >= anim.duration {
                self.current = anim.to.min(max);
                self.animation = None;
            } else {
                let t = elapsed.as_secs_f64() / anim.duration.as_secs_f64();
                self.current = lerp_u32(anim.from, anim.to, anim.easing.apply(t)).min(max);
            }
        } else {
            self.current = self.current.min(max);
        }
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smooth(duration_ms: u64) -> ScrollConfig {
        ScrollConfig {
            smooth_enabled: true,
            animation_duration_ms: duration_ms,
            ..Default::default()
        }
    }

    #[test]
    fn test_easing_boundaries() {
        for easing in [
            EasingType::Linear,
            EasingType::Cubic,
            EasingType::Quintic,
            EasingType::EaseOut,
        ] {
            assert!(easing.apply(0.0).abs() < 0.001, "{:?} at t=0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 0.001, "{:?} at t=1", easing);
        }
        assert_eq!(EasingType::None.apply(0.5), 0.0);
    }

    #[test]
    fn test_instant_when_disabled() {
        let config = ScrollConfig {
            smooth_enabled: false,
            ..Default::default()
        };
        let mut animator = ScrollAnimator::new(config);
        animator.scroll_to(1200, 5000);
        assert_eq!(animator.current(), 1200);
        assert!(!animator.is_animating());
    }

    #[test]
    fn test_target_clamped() {
        let mut animator = ScrollAnimator::new(smooth(100));
        animator.scroll_to(9000, 5000);
        assert_eq!(animator.target(), 5000);
        animator.scroll_by(-6000, 5000);
        assert_eq!(animator.target(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_animation_settles_on_target() {
        let mut animator = ScrollAnimator::new(smooth(150));
        animator.scroll_to(900, 5000);
        assert!(animator.is_animating());

        tokio::time::advance(Duration::from_millis(75)).await;
        let midway = animator.update(5000);
        assert!(midway > 0 && midway < 900, "midway at {}", midway);

        tokio::time::advance(Duration::from_millis(100)).await;
        assert_eq!(animator.update(5000), 900);
        assert!(!animator.is_animating());
    }
}
