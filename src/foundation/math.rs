use crate::foundation::core::Vec3;

/// Wrap `x` into `[0, 1)`.
pub fn wrap_unit(x: f64) -> f64 {
    let w = x.rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs.
    if w >= 1.0 { 0.0 } else { w }
}

pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Quadratic curve through three points: it starts at `from`, passes `via` at `u = 0.5` and ends
/// at `to`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ThroughCurve {
    from: Vec3,
    ctrl: Vec3,
    to: Vec3,
}

impl ThroughCurve {
    /// Build the curve from its three on-curve points.
    pub fn new(from: Vec3, via: Vec3, to: Vec3) -> Self {
        // B(0.5) = (from + 2*ctrl + to) / 4 == via
        let ctrl = via * 2.0 - (from + to) * 0.5;
        Self { from, ctrl, to }
    }

    /// Sample at `u`, clamped to `[0, 1]`.
    pub fn sample(&self, u: f64) -> Vec3 {
        let u = u.clamp(0.0, 1.0);
        let v = 1.0 - u;
        self.from * (v * v) + self.ctrl * (2.0 * v * u) + self.to * (u * u)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
