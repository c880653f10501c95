use rand::Rng;

use crate::animation::ease::Ease;
use crate::animation::schedule::{Channel, Schedule, Value};
use crate::choreo::weighted::WeightedTable;
use crate::foundation::core::Vec3;
use crate::foundation::error::{SwarmError, SwarmResult};

/// Field-of-view tween of a camera preset, degrees.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FovMove {
    /// FOV snapped at cycle zero.
    pub from: f64,
    /// FOV reached at the end of the move.
    pub to: f64,
    /// Duration in seconds.
    pub secs: f64,
}

/// One camera move: snap to `from` at cycle zero, then ease towards `to`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraPreset {
    /// Name reported in the cycle state.
    pub name: String,
    /// Relative selection weight.
    pub weight: f64,
    /// Eye position at cycle zero.
    pub from: Vec3,
    /// Eye position at the end of the move.
    pub to: Vec3,
    /// Position tween duration in seconds.
    pub secs: f64,
    /// Optional FOV tween; without one the FOV is left where it is.
    #[serde(default)]
    pub fov: Option<FovMove>,
    /// Easing shared by position and FOV.
    #[serde(default = "default_camera_ease")]
    pub ease: Ease,
}

fn default_camera_ease() -> Ease {
    Ease::InOutQuart
}

impl CameraPreset {
    /// Schedule this move relative to cycle zero.
    pub fn apply<S: Schedule + ?Sized>(&self, schedule: &mut S) {
        schedule.set(Channel::CameraPosition, Value::Vec3(self.from), 0.0);
        schedule.to(
            Channel::CameraPosition,
            Value::Vec3(self.to),
            self.secs,
            0.0,
            self.ease,
        );
        if let Some(fov) = self.fov {
            schedule.set(Channel::CameraFov, Value::Scalar(fov.from), 0.0);
            schedule.to(
                Channel::CameraFov,
                Value::Scalar(fov.to),
                fov.secs,
                0.0,
                self.ease,
            );
        }
    }

    fn validate(&self) -> SwarmResult<()> {
        let finite = self.from.is_finite()
            && self.to.is_finite()
            && self.secs.is_finite()
            && self.secs >= 0.0
            && self
                .fov
                .is_none_or(|f| f.from.is_finite() && f.to.is_finite() && f.secs >= 0.0);
        if !finite {
            return Err(SwarmError::validation(format!(
                "camera preset '{}' has non-finite or negative values",
                self.name
            )));
        }
        Ok(())
    }
}

/// The three stock moves: a dolly zoom, an overhead swoop and a wide diagonal.
pub fn default_camera_presets() -> Vec<CameraPreset> {
    let home = Vec3::new(0.0, 0.0, 5000.0);
    vec![
        CameraPreset {
            name: "dolly_zoom".to_string(),
            weight: 0.3,
            from: Vec3::new(200.0, -200.0, 1000.0),
            to: home,
            secs: 14.0,
            fov: Some(FovMove {
                from: 90.0,
                to: 45.0,
                secs: 14.0,
            }),
            ease: Ease::InOutQuart,
        },
        CameraPreset {
            name: "overhead".to_string(),
            weight: 0.35,
            from: Vec3::new(100.0, 1000.0, 1000.0),
            to: home,
            secs: 14.0,
            fov: None,
            ease: Ease::InOutQuart,
        },
        CameraPreset {
            name: "diagonal".to_string(),
            weight: 0.35,
            from: Vec3::new(-3000.0, 3000.0, 0.0),
            to: home,
            secs: 15.0,
            fov: None,
            ease: Ease::InOutQuart,
        },
    ]
}

/// Picks one camera move per cycle.
#[derive(Clone, Debug)]
pub struct CameraDirector {
    table: WeightedTable<CameraPreset>,
}

impl CameraDirector {
    /// Director over `presets`, weighted by each preset's `weight`.
    pub fn new(presets: Vec<CameraPreset>) -> SwarmResult<Self> {
        for p in &presets {
            p.validate()?;
        }
        let table = WeightedTable::new(presets.into_iter().map(|p| {
            let w = p.weight;
            (p, w)
        }))?;
        Ok(Self { table })
    }

    /// Selection table, for inspection.
    pub fn table(&self) -> &WeightedTable<CameraPreset> {
        &self.table
    }

    /// Choose a preset and schedule it. Returns the chosen preset.
    pub fn direct<R: Rng + ?Sized, S: Schedule + ?Sized>(
        &self,
        rng: &mut R,
        schedule: &mut S,
    ) -> &CameraPreset {
        let preset = self.table.choose(rng);
        preset.apply(schedule);
        tracing::debug!(preset = %preset.name, "camera move chosen");
        preset
    }
}

#[cfg(test)]
#[path = "../../tests/unit/choreo/camera.rs"]
mod tests;
