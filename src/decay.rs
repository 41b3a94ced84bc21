//! Memory strength decay projection.
//!
//! Pure math that mirrors the backend's decay formula exactly (f64
//! throughout) so projected curves in the UI match server-computed strengths
//! bit-for-bit. Nothing in this module has side effects or can fail: all
//! functions are total over their domain, with degenerate inputs (negative
//! elapsed time, NaN strength) mapped to the nearest well-defined value.

use crate::model::Layer;

/// Decay rate per day for short-term memories
pub const SML_DECAY_RATE: f64 = 0.15;

/// Decay rate per day for long-term memories
pub const LML_DECAY_RATE: f64 = 0.02;

/// Dampening factor applied to the log of access count
pub const ACCESS_DAMPENING_FACTOR: f64 = 0.5;

/// Strength below which a memory is considered forgotten
pub const FORGET_THRESHOLD: f64 = 0.1;

/// Minimum access count for short-term → long-term promotion
pub const PROMOTION_ACCESS_THRESHOLD: u32 = 3;

/// Minimum strength for short-term → long-term promotion
pub const PROMOTION_STRENGTH_THRESHOLD: f64 = 0.7;

/// Decay rate per day for the given layer
pub fn decay_rate(layer: Layer) -> f64 {
    match layer {
        Layer::ShortTerm => SML_DECAY_RATE,
        Layer::LongTerm => LML_DECAY_RATE,
    }
}

/// Project a memory's strength after `elapsed_days` of no access.
///
/// `strength(t) = s * exp(-rate * t / dampening)` where
/// `dampening = 1 + k * ln(1 + access_count)` — frequently accessed memories
/// decay slower. The result is clamped to `[0, 1]`; negative elapsed time is
/// treated as zero and NaN strength as 0.
pub fn project_decay(
    current_strength: f64,
    access_count: u32,
    layer: Layer,
    elapsed_days: f64,
) -> f64 {
    if current_strength.is_nan() {
        return 0.0;
    }
    let strength = current_strength.clamp(0.0, 1.0);
    let elapsed = if elapsed_days.is_nan() { 0.0 } else { elapsed_days.max(0.0) };

    let dampening = 1.0 + ACCESS_DAMPENING_FACTOR * f64::from(access_count).ln_1p();
    let projected = strength * (-decay_rate(layer) * elapsed / dampening).exp();
    projected.clamp(0.0, 1.0)
}

/// Whether a memory at this strength should be forgotten entirely
pub fn should_forget(strength: f64) -> bool {
    strength.is_nan() || strength < FORGET_THRESHOLD
}

/// Whether a memory qualifies for promotion to the long-term layer.
///
/// Only short-term memories are promotion candidates.
pub fn should_promote(layer: Layer, access_count: u32, strength: f64) -> bool {
    layer == Layer::ShortTerm
        && access_count >= PROMOTION_ACCESS_THRESHOLD
        && strength >= PROMOTION_STRENGTH_THRESHOLD
}

/// One sample of a projected decay curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayPoint {
    /// Days from now
    pub day: u32,
    /// Projected strength on that day
    pub strength: f64,
}

/// Lazy, finite sequence of projected strengths for `day = 0..=horizon`.
///
/// Drives the projection chart. The iterator is `Clone` and can be restarted
/// with [`DecayProjection::restart`], so the chart can re-render without
/// recomputing its inputs.
#[derive(Debug, Clone)]
pub struct DecayProjection {
    strength: f64,
    access_count: u32,
    layer: Layer,
    horizon_days: u32,
    // One past u32::MAX is representable, so the cursor can step beyond any
    // horizon without overflowing
    day: u64,
}

impl DecayProjection {
    /// Rewind to day zero
    pub fn restart(&mut self) {
        self.day = 0;
    }
}

impl Iterator for DecayProjection {
    type Item = DecayPoint;

    fn next(&mut self) -> Option<DecayPoint> {
        if self.day > u64::from(self.horizon_days) {
            return None;
        }
        let day = self.day as u32;
        self.day += 1;
        Some(DecayPoint {
            day,
            strength: project_decay(self.strength, self.access_count, self.layer, f64::from(day)),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (u64::from(self.horizon_days) + 1 - self.day) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DecayProjection {}

/// Build a decay projection series over `0..=horizon_days` inclusive
pub fn decay_projection_series(
    strength: f64,
    access_count: u32,
    layer: Layer,
    horizon_days: u32,
) -> DecayProjection {
    DecayProjection {
        strength,
        access_count,
        layer,
        horizon_days,
        day: 0,
    }
}
