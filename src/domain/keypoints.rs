// ============================================================
// Layer 3 — Facial Keypoint Domain Types
// ============================================================
// The regression network emits one flat row per image:
//   [x0, y0, x1, y1, ..., x67, y67]
// These types give that row a shape without pulling in Burn.
//
// Network outputs live in normalised space; training targets
// were built as (pixel - mean) / std, so turning a prediction
// back into pixel coordinates is value * std + mean.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// A single (x, y) landmark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Affine mapping between network space and pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    pub mean: f32,
    pub std:  f32,
}

impl Default for Normalization {
    fn default() -> Self {
        Self { mean: 100.0, std: 50.0 }
    }
}

impl Normalization {
    pub fn denormalize(&self, value: f32) -> f32 {
        value * self.std + self.mean
    }
}

/// All landmarks predicted for one face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeypointSet {
    pub points: Vec<Keypoint>,
}

impl KeypointSet {
    /// Pair up a flat `[x, y, x, y, ...]` row.
    pub fn from_flat(values: &[f32]) -> Result<Self> {
        if values.len() % 2 != 0 {
            bail!("keypoint row has odd length {}", values.len());
        }
        let points = values
            .chunks_exact(2)
            .map(|xy| Keypoint::new(xy[0], xy[1]))
            .collect();
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Map every point from network space to pixel coordinates.
    pub fn denormalized(&self, norm: &Normalization) -> Self {
        let points = self.points
            .iter()
            .map(|p| Keypoint::new(norm.denormalize(p.x), norm.denormalize(p.y)))
            .collect();
        Self { points }
    }

    /// Axis-aligned bounds as (min_x, min_y, max_x, max_y).
    pub fn bounds(&self) -> Option<(f32, f32, f32, f32)> {
        let first = self.points.first()?;
        let init  = (first.x, first.y, first.x, first.y);
        Some(self.points.iter().fold(init, |(x0, y0, x1, y1), p| {
            (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y))
        }))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flat_pairs_values() {
        let set = KeypointSet::from_flat(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.points[1], Keypoint::new(3.0, 4.0));
    }

    #[test]
    fn test_from_flat_rejects_odd_length() {
        assert!(KeypointSet::from_flat(&[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_denormalize_default() {
        // 0.0 → mean, 1.0 → mean + std
        let set = KeypointSet::from_flat(&[0.0, 1.0]).unwrap();
        let px  = set.denormalized(&Normalization::default());
        assert_eq!(px.points[0], Keypoint::new(100.0, 150.0));
    }

    #[test]
    fn test_custom_denormalization() {
        let norm = Normalization { mean: 10.0, std: 4.0 };
        assert_eq!(norm.denormalize(-0.5), 8.0);
    }

    #[test]
    fn test_bounds() {
        let set = KeypointSet::from_flat(&[1.0, 5.0, -2.0, 3.0, 4.0, 0.0]).unwrap();
        assert_eq!(set.bounds(), Some((-2.0, 0.0, 4.0, 5.0)));
        assert_eq!(KeypointSet { points: vec![] }.bounds(), None);
    }
}
