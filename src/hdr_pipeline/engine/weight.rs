use std::ops::Index;

/// Weights below this are treated as "do not use this sample at all".
pub const WEIGHT_EPSILON: f64 = 1e-6;

/// Per-level reliability weight shared by all channels and frames.
///
/// A pseudo-Gaussian `exp(-8 v^2)` with `v = (i - mid) / mid`, peaking at the
/// midpoint level so that under- and over-exposed samples count less.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
    values: Vec<f64>,
}

impl WeightTable {
    pub fn new(levels: usize) -> Self {
        let mid = (levels / 2) as f64;
        let values = (0..levels)
            .map(|i| {
                let v = (i as f64 - mid) / mid;
                let w = (-8.0 * v * v).exp();
                if w < WEIGHT_EPSILON { 0.0 } else { w }
            })
            .collect();
        Self { values }
    }

    /// Every level weighted 1.
    pub fn uniform(levels: usize) -> Self {
        Self {
            values: vec![1.0; levels],
        }
    }

    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

impl Index<usize> for WeightTable {
    type Output = f64;

    fn index(&self, level: usize) -> &f64 {
        &self.values[level]
    }
}
