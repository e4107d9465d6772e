use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::frame::types::CHANNELS;

/// Camera response: per channel, the relative scene radiance each intensity
/// level stands for.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseCurve {
    channels: [Vec<f64>; CHANNELS],
}

impl ResponseCurve {
    /// Linear ramp `i / (L - 1)` on every channel; the estimator's starting point.
    pub fn linear(levels: usize) -> Self {
        let denom = levels.saturating_sub(1).max(1) as f64;
        let ramp: Vec<f64> = (0..levels).map(|i| i as f64 / denom).collect();
        Self {
            channels: [ramp.clone(), ramp.clone(), ramp],
        }
    }

    pub fn from_channels(channels: [Vec<f64>; CHANNELS]) -> Self {
        debug_assert!(channels.iter().all(|c| c.len() == channels[0].len()));
        Self { channels }
    }

    pub fn levels(&self) -> usize {
        self.channels[0].len()
    }

    pub fn channel(&self, c: usize) -> &[f64] {
        &self.channels[c]
    }

    pub fn channel_mut(&mut self, c: usize) -> &mut [f64] {
        &mut self.channels[c]
    }

    pub fn channels(&self) -> &[Vec<f64>; CHANNELS] {
        &self.channels
    }

    /// Scales every channel so its value at the midpoint level is 1.
    ///
    /// When the midpoint is zero the first non-zero level above it is used
    /// instead, then the last non-zero level below it. A channel with no
    /// non-zero value at all is a `DegenerateCurve`.
    pub fn normalize(&mut self) -> Result<()> {
        for (c, values) in self.channels.iter_mut().enumerate() {
            normalize_channel(values).map_err(|_| HdrError::DegenerateCurve { channel: c })?;
        }
        Ok(())
    }

    /// Mean squared change against `previous`, over every level where
    /// `previous` is non-zero. Zero when there is nothing to compare.
    pub fn mean_squared_change(&self, previous: &ResponseCurve) -> f64 {
        let mut total = 0.0;
        let mut samples = 0usize;
        for (now, before) in self.channels.iter().zip(&previous.channels) {
            for (&v, &p) in now.iter().zip(before) {
                if p != 0.0 {
                    total += (v - p) * (v - p);
                    samples += 1;
                }
            }
        }
        if samples == 0 { 0.0 } else { total / samples as f64 }
    }
}

fn normalize_channel(values: &mut [f64]) -> std::result::Result<(), ()> {
    let mid = values.len() / 2;
    let divisor = values[mid..]
        .iter()
        .chain(values[..mid].iter().rev())
        .copied()
        .find(|&v| v != 0.0)
        .ok_or(())?;

    for v in values.iter_mut() {
        *v /= divisor;
    }
    Ok(())
}

/// Fills levels that were never observed (`counts[i] == 0`).
///
/// Leading and trailing gaps take the nearest observed value; interior gaps are
/// linearly interpolated between the observed levels on either side. With no
/// observed level at all the values are left untouched.
pub fn fill_holes(values: &mut [f64], counts: &[u64]) {
    debug_assert_eq!(values.len(), counts.len());

    let known: Vec<usize> = counts
        .iter()
        .enumerate()
        .filter(|&(_, &n)| n != 0)
        .map(|(i, _)| i)
        .collect();

    let (Some(&first), Some(&last)) = (known.first(), known.last()) else {
        return;
    };

    let head = values[first];
    values[..first].fill(head);
    let tail = values[last];
    values[last + 1..].fill(tail);

    for pair in known.windows(2) {
        let (p, q) = (pair[0], pair[1]);
        if q - p < 2 {
            continue;
        }
        let (a, b) = (values[p], values[q]);
        for i in p + 1..q {
            values[i] = a + (i - p) as f64 * (b - a) / (q - p) as f64;
        }
    }
}
