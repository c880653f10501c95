use rand::Rng;

use crate::animation::ease::Ease;
use crate::animation::rate::{RateAnchor, RateOverlay, RateSegment};
use crate::animation::schedule::Schedule;
use crate::choreo::weighted::WeightedTable;
use crate::foundation::error::SwarmResult;

/// Named playback-rate warp.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RemapPreset {
    /// Name reported in the cycle state.
    pub name: String,
    /// Relative selection weight.
    pub weight: f64,
    /// Rate program attached to the cycle timeline.
    pub overlay: RateOverlay,
}

fn seg(delay: f64, duration: f64, to: f64, ease: Ease) -> RateSegment {
    RateSegment {
        delay,
        duration,
        to,
        ease,
    }
}

/// Stock warps: `pulse` (fast, freeze, burst, freeze, sprint), `plunge` (fast start that nearly
/// stops, then recovers) and `steady` (real time).
pub fn default_remap_presets() -> Vec<RemapPreset> {
    vec![
        RemapPreset {
            name: "pulse".to_string(),
            weight: 0.3,
            overlay: RateOverlay {
                initial_rate: Some(3.0),
                anchor: RateAnchor::LocalTime { at: 3.5 },
                segments: vec![
                    seg(0.0, 1.0, 0.05, Ease::InOutCubic),
                    seg(3.5, 0.5, 3.0, Ease::InOutCubic),
                    seg(4.0, 0.5, 0.05, Ease::InOutCubic),
                    seg(9.0, 2.0, 5.0, Ease::InCubic),
                ],
            },
        },
        RemapPreset {
            name: "plunge".to_string(),
            weight: 0.35,
            overlay: RateOverlay {
                initial_rate: Some(6.0),
                anchor: RateAnchor::Start,
                segments: vec![
                    seg(0.0, 4.0, 0.005, Ease::OutCubic),
                    seg(5.0, 4.0, 2.0, Ease::InCubic),
                ],
            },
        },
        RemapPreset {
            name: "steady".to_string(),
            weight: 0.35,
            overlay: RateOverlay::constant(1.0),
        },
    ]
}

/// Picks one rate warp per cycle and installs it on the cycle timeline.
#[derive(Clone, Debug)]
pub struct TimeRemapper {
    table: WeightedTable<RemapPreset>,
}

impl TimeRemapper {
    /// Remapper over `presets`, weighted by each preset's `weight`.
    pub fn new(presets: Vec<RemapPreset>) -> SwarmResult<Self> {
        for p in &presets {
            p.overlay.validate()?;
        }
        let table = WeightedTable::new(presets.into_iter().map(|p| {
            let w = p.weight;
            (p, w)
        }))?;
        Ok(Self { table })
    }

    /// Selection table, for inspection.
    pub fn table(&self) -> &WeightedTable<RemapPreset> {
        &self.table
    }

    /// Choose a preset and attach its overlay to `schedule`. Returns the chosen preset.
    pub fn remap<R: Rng + ?Sized, S: Schedule + ?Sized>(
        &self,
        rng: &mut R,
        schedule: &mut S,
    ) -> &RemapPreset {
        let preset = self.table.choose(rng);
        schedule.attach_rate_overlay(preset.overlay.clone());
        tracing::debug!(preset = %preset.name, "time remap chosen");
        preset
    }
}

#[cfg(test)]
#[path = "../../tests/unit/choreo/remap.rs"]
mod tests;
