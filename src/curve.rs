//! Loxodrome camera-path generation.
//!
//! Produces the control points of a spherical spiral (rhumb line) the camera
//! can follow while shooting. `half` stops the sweep at the equator instead
//! of covering the whole sphere.

use glam::DVec3;

use crate::error::{SyntherError, SyntherResult};

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct LoxodromeSpec {
    pub spirals: u32,
    pub revolutions: u32,
    pub angle_step_deg: u32,
    pub half: bool,
}

impl Default for LoxodromeSpec {
    fn default() -> Self {
        Self {
            spirals: 17,
            revolutions: 23,
            angle_step_deg: 10,
            half: false,
        }
    }
}

impl LoxodromeSpec {
    pub fn half_sphere() -> Self {
        Self {
            half: true,
            ..Self::default()
        }
    }
}

/// Points of the loxodrome on the unit sphere, swept in `angle_step_deg`
/// increments from -180°·revolutions up to the equator (`half`) or the
/// opposite pole.
pub fn loxodrome_points(spec: &LoxodromeSpec) -> SyntherResult<Vec<DVec3>> {
    if spec.spirals == 0 {
        return Err(SyntherError::validation("loxodrome spirals must be > 0"));
    }
    if spec.angle_step_deg == 0 {
        return Err(SyntherError::validation("loxodrome angle step must be > 0"));
    }

    let a = 1.0 / f64::from(spec.spirals);
    let degs = 180 * i64::from(spec.revolutions);
    let end_degs = if spec.half { 0 } else { degs };

    let mut points = Vec::new();
    for deg in (-degs..end_degs).step_by(spec.angle_step_deg as usize) {
        let t = (deg as f64).to_radians();
        let den = (1.0 + a * a * t * t).sqrt();
        points.push(DVec3::new(t.cos() / den, t.sin() / den, -a * t / den));
    }

    Ok(points)
}
