//! Band levels and beat detection from byte frequency data

use crate::consts::{BEAT_COOLDOWN_MS, BEAT_THRESHOLD};

/// Normalized (0-1) band averages of one spectrum frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BandLevels {
    pub bass: f32,
    pub mid: f32,
    pub high: f32,
}

impl BandLevels {
    /// Split analyser bins (0-255 magnitudes, low frequencies first) into
    /// bass (first 10%), mid (10-50%) and high (rest)
    pub fn from_bytes(bins: &[u8]) -> Self {
        if bins.is_empty() {
            return Self::default();
        }
        let len = bins.len();
        let bass_end = (len / 10).max(1);
        let mid_end = (len / 2).max(bass_end);

        Self {
            bass: average(&bins[..bass_end]),
            mid: average(&bins[bass_end..mid_end]),
            high: average(&bins[mid_end..]),
        }
    }

    /// Weighted overall intensity, bass dominated
    pub fn intensity(&self) -> f32 {
        (self.bass * 0.6 + self.mid * 0.3 + self.high * 0.1).clamp(0.0, 1.0)
    }
}

fn average(bins: &[u8]) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }
    let sum: u32 = bins.iter().map(|&b| b as u32).sum();
    sum as f32 / (bins.len() as f32 * 255.0)
}

/// Fires when bass crosses a threshold, at most once per cooldown
#[derive(Debug, Clone)]
pub struct BeatDetector {
    threshold: f32,
    cooldown_ms: f64,
    last_beat_ms: Option<f64>,
}

impl Default for BeatDetector {
    fn default() -> Self {
        Self::new(BEAT_THRESHOLD, BEAT_COOLDOWN_MS)
    }
}

impl BeatDetector {
    pub fn new(threshold: f32, cooldown_ms: f64) -> Self {
        Self {
            threshold,
            cooldown_ms,
            last_beat_ms: None,
        }
    }

    /// Returns true when this frame counts as a beat
    pub fn detect(&mut self, bass: f32, now_ms: f64) -> bool {
        if bass <= self.threshold {
            return false;
        }
        let cooled = self
            .last_beat_ms
            .is_none_or(|last| now_ms - last >= self.cooldown_ms);
        if cooled {
            self.last_beat_ms = Some(now_ms);
        }
        cooled
    }

    pub fn reset(&mut self) {
        self.last_beat_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_split() {
        let mut bins = vec![0u8; 100];
        bins[..10].fill(255);
        bins[10..50].fill(51);
        let bands = BandLevels::from_bytes(&bins);
        assert!((bands.bass - 1.0).abs() < 1e-6);
        assert!((bands.mid - 0.2).abs() < 1e-6);
        assert_eq!(bands.high, 0.0);
        assert!((bands.intensity() - 0.66).abs() < 1e-5);
    }

    #[test]
    fn test_empty_and_tiny_spectra() {
        assert_eq!(BandLevels::from_bytes(&[]), BandLevels::default());
        let bands = BandLevels::from_bytes(&[255]);
        assert_eq!(bands.bass, 1.0);
        assert_eq!(bands.mid, 0.0);
    }

    #[test]
    fn test_beat_cooldown() {
        let mut detector = BeatDetector::new(0.6, 200.0);
        assert!(!detector.detect(0.5, 0.0));
        assert!(detector.detect(0.9, 10.0));
        assert!(!detector.detect(0.9, 100.0));
        assert!(detector.detect(0.9, 210.0));
    }
}
