//! Time-driven cosmetic motion for biscuits and stunned enemies.

use std::{f32::consts::TAU, time::Duration};

use biscuit_battle_core::BiscuitId;
use glam::Vec2;

/// Peak vertical offset of the idle bob in world units.
pub const BOB_AMPLITUDE: f32 = 0.2;
/// Bob cycles per second at animation rate `1.0`.
pub const BOB_CYCLES_PER_SECOND: f32 = 1.4;
/// Spin applied around the view axis at animation rate `1.0`.
pub const SPIN_DEGREES_PER_SECOND: f32 = 30.0;
/// Relative squash and stretch that follows the bob.
pub const SCALE_PULSE: f32 = 0.04;
/// Opacity of a freshly stunned enemy.
pub const STUNNED_ALPHA: f32 = 0.35;

const PHASE_SPAN_SECONDS: f32 = 10.0;
const INITIAL_TILT_DEGREES: f32 = 10.0;
const GOLDEN_RATIO_CONJUGATE: f32 = 0.618_034;

/// Transform applied on top of a biscuit's resting position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BobPose {
    /// Offset from the resting position.
    pub offset: Vec2,
    /// Accumulated spin in degrees.
    pub rotation_degrees: f32,
    /// Uniform scale factor around `1.0`.
    pub scale: f32,
}

/// Idle float animation of a single biscuit.
///
/// The animation clock advances by `dt * rate`, so a rate of zero freezes the
/// biscuit in its current pose until the rate is restored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiscuitBob {
    time: f32,
    rotation_degrees: f32,
    rate: f32,
}

impl BiscuitBob {
    /// Creates an animation whose clock starts at `phase_seconds`.
    #[must_use]
    pub fn with_phase(phase_seconds: f32, tilt_degrees: f32) -> Self {
        Self {
            time: phase_seconds,
            rotation_degrees: tilt_degrees,
            rate: 1.0,
        }
    }

    /// Creates an animation with a phase derived from the biscuit identifier
    /// so neighbouring biscuits do not bob in sync.
    #[must_use]
    pub fn for_biscuit(biscuit: BiscuitId) -> Self {
        let spread = (biscuit.get() as f32 * GOLDEN_RATIO_CONJUGATE).fract();
        Self::with_phase(
            spread * PHASE_SPAN_SECONDS,
            (spread * 2.0 - 1.0) * INITIAL_TILT_DEGREES,
        )
    }

    /// Current animation rate.
    #[must_use]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Scales animation speed; negative values clamp to zero.
    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate.max(0.0);
    }

    /// Advances the animation clock and returns the resulting pose.
    pub fn advance(&mut self, dt: Duration) -> BobPose {
        let scaled = dt.as_secs_f32() * self.rate;
        self.time += scaled;
        self.rotation_degrees = (self.rotation_degrees + SPIN_DEGREES_PER_SECOND * scaled) % 360.0;
        self.pose()
    }

    /// Pose at the current animation clock.
    #[must_use]
    pub fn pose(&self) -> BobPose {
        let wave = (self.time * TAU * BOB_CYCLES_PER_SECOND).sin();
        BobPose {
            offset: Vec2::new(0.0, wave * BOB_AMPLITUDE),
            rotation_degrees: self.rotation_degrees,
            scale: 1.0 + wave * SCALE_PULSE,
        }
    }
}

/// Opacity of a stunned enemy.
///
/// Stays at [`STUNNED_ALPHA`] until the fade begins, then lerps to fully
/// opaque over `fade_duration`.
#[must_use]
pub fn stunned_alpha(fade_elapsed: Option<Duration>, fade_duration: Duration) -> f32 {
    let Some(elapsed) = fade_elapsed else {
        return STUNNED_ALPHA;
    };
    if fade_duration.is_zero() {
        return 1.0;
    }

    let t = (elapsed.as_secs_f32() / fade_duration.as_secs_f32()).clamp(0.0, 1.0);
    STUNNED_ALPHA + (1.0 - STUNNED_ALPHA) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn bob_peaks_at_quarter_cycle() {
        let mut bob = BiscuitBob::with_phase(0.0, 0.0);
        let quarter = Duration::from_secs_f32(0.25 / BOB_CYCLES_PER_SECOND);
        let pose = bob.advance(quarter);

        assert!(approx(pose.offset.y, BOB_AMPLITUDE));
        assert!(approx(pose.scale, 1.0 + SCALE_PULSE));
        assert!(approx(pose.offset.x, 0.0));
    }

    #[test]
    fn spin_accumulates_with_time() {
        let mut bob = BiscuitBob::with_phase(0.0, 0.0);
        let pose = bob.advance(Duration::from_secs(2));
        assert!(approx(pose.rotation_degrees, 60.0));
    }

    #[test]
    fn zero_rate_freezes_pose() {
        let mut bob = BiscuitBob::with_phase(0.3, 5.0);
        let before = bob.advance(Duration::from_millis(100));
        bob.set_rate(0.0);

        let frozen = bob.advance(Duration::from_secs(3));
        assert_eq!(before, frozen);

        bob.set_rate(1.0);
        assert_ne!(bob.advance(Duration::from_millis(100)), frozen);
    }

    #[test]
    fn biscuit_phases_differ() {
        let first = BiscuitBob::for_biscuit(BiscuitId::new(0)).pose();
        let second = BiscuitBob::for_biscuit(BiscuitId::new(1)).pose();
        assert_ne!(first, second);
    }

    #[test]
    fn stunned_alpha_fades_to_opaque() {
        let fade = Duration::from_millis(500);
        assert!(approx(stunned_alpha(None, fade), STUNNED_ALPHA));
        assert!(approx(stunned_alpha(Some(Duration::ZERO), fade), STUNNED_ALPHA));
        assert!(approx(
            stunned_alpha(Some(Duration::from_millis(250)), fade),
            0.675
        ));
        assert!(approx(stunned_alpha(Some(fade), fade), 1.0));
        assert!(approx(stunned_alpha(Some(Duration::from_secs(9)), fade), 1.0));
        assert!(approx(stunned_alpha(Some(Duration::ZERO), Duration::ZERO), 1.0));
    }
}
