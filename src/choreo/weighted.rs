use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

use crate::foundation::error::{SwarmError, SwarmResult};

/// Discrete distribution over a fixed list of items.
///
/// Weights need not sum to one; each item is chosen with probability `weight / total`.
/// [`WeightedTable::choose`] samples through [`WeightedIndex`]; [`WeightedTable::pick`] maps an
/// explicit uniform sample onto the same cumulative thresholds.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightedTable<T> {
    items: Vec<T>,
    weights: Vec<f64>,
    total: f64,
    index: WeightedIndex<f64>,
}

impl<T> WeightedTable<T> {
    /// Build a table. Weights must be finite and non-negative with a positive sum.
    pub fn new(entries: impl IntoIterator<Item = (T, f64)>) -> SwarmResult<Self> {
        let (items, weights): (Vec<T>, Vec<f64>) = entries.into_iter().unzip();
        if items.is_empty() {
            return Err(SwarmError::validation("weighted table must not be empty"));
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(SwarmError::validation(
                "weights must be finite and non-negative",
            ));
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(SwarmError::validation("weights must have a positive sum"));
        }
        let index = WeightedIndex::new(&weights)
            .map_err(|e| SwarmError::validation(format!("weighted table: {e}")))?;
        Ok(Self {
            items,
            weights,
            total,
            index,
        })
    }

    /// Number of entries, including zero-weight ones.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always `false` for a constructed table.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entries with their normalized probabilities.
    pub fn iter(&self) -> impl Iterator<Item = (&T, f64)> + '_ {
        self.items
            .iter()
            .zip(self.weights.iter())
            .map(|(item, w)| (item, w / self.total))
    }

    /// Normalized probability of entry `index`.
    pub fn probability(&self, index: usize) -> Option<f64> {
        self.weights.get(index).map(|w| w / self.total)
    }

    /// Index selected by a uniform sample `u` in `[0, 1)`. Zero-weight entries are never chosen.
    pub fn pick_index(&self, u: f64) -> usize {
        let target = u.clamp(0.0, 1.0) * self.total;
        let mut acc = 0.0;
        let mut last = 0;
        for (i, w) in self.weights.iter().enumerate() {
            if *w <= 0.0 {
                continue;
            }
            acc += w;
            last = i;
            if target < acc {
                return i;
            }
        }
        last
    }

    /// Entry selected by a uniform sample `u` in `[0, 1)`.
    pub fn pick(&self, u: f64) -> &T {
        &self.items[self.pick_index(u)]
    }

    /// Draw an entry from `rng`.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &T {
        &self.items[self.index.sample(rng)]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/choreo/weighted.rs"]
mod tests;
