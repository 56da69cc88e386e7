//! Reactive input sources
//!
//! Every source is reduced to a `SignalSample` before it reaches the field,
//! so the simulation never branches on where its input came from.

use glam::Vec2;

use super::beat::{BandLevels, BeatDetector};
use crate::consts::POINTER_RADIUS;

/// Radial push away from a point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceField {
    pub origin: Vec2,
    pub radius: f32,
}

/// One frame of normalized input
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SignalSample {
    /// Overall energy, 0-1
    pub intensity: f32,
    /// A beat landed this frame
    pub beat: bool,
    /// Optional repelling point
    pub force: Option<ForceField>,
}

impl SignalSample {
    /// No reaction at all
    pub const AMBIENT: SignalSample = SignalSample {
        intensity: 0.0,
        beat: false,
        force: None,
    };
}

/// Anything that can drive the particle field
pub trait ReactiveSignal {
    fn sample(&mut self, now_ms: f64) -> SignalSample;
}

impl<T: ReactiveSignal + ?Sized> ReactiveSignal for Box<T> {
    fn sample(&mut self, now_ms: f64) -> SignalSample {
        (**self).sample(now_ms)
    }
}

/// Plain drifting, used when no other source is available
#[derive(Debug, Clone, Copy, Default)]
pub struct Ambient;

impl ReactiveSignal for Ambient {
    fn sample(&mut self, _now_ms: f64) -> SignalSample {
        SignalSample::AMBIENT
    }
}

/// Last known pointer position, in canvas pixels
#[derive(Debug, Clone)]
pub struct PointerSignal {
    position: Option<Vec2>,
    radius: f32,
}

impl Default for PointerSignal {
    fn default() -> Self {
        Self::new(POINTER_RADIUS)
    }
}

impl PointerSignal {
    pub fn new(radius: f32) -> Self {
        Self {
            position: None,
            radius,
        }
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = Some(Vec2::new(x, y));
    }

    /// Pointer left the page
    pub fn clear(&mut self) {
        self.position = None;
    }

    pub fn position(&self) -> Option<Vec2> {
        self.position
    }
}

impl ReactiveSignal for PointerSignal {
    fn sample(&mut self, _now_ms: f64) -> SignalSample {
        SignalSample {
            intensity: 0.0,
            beat: false,
            force: self.position.map(|origin| ForceField {
                origin,
                radius: self.radius,
            }),
        }
    }
}

/// Provider of analyser frequency bins
pub trait SpectrumSource {
    /// Fill `out` with the current byte spectrum. Returns false when no
    /// data is available (paused, not yet connected).
    fn frequency_data(&mut self, out: &mut Vec<u8>) -> bool;
}

/// Music-driven signal from a spectrum source
pub struct SpectrumSignal<S> {
    source: S,
    detector: BeatDetector,
    bins: Vec<u8>,
    levels: BandLevels,
}

impl<S: SpectrumSource> SpectrumSignal<S> {
    pub fn new(source: S) -> Self {
        Self::with_detector(source, BeatDetector::default())
    }

    pub fn with_detector(source: S, detector: BeatDetector) -> Self {
        Self {
            source,
            detector,
            bins: Vec::new(),
            levels: BandLevels::default(),
        }
    }

    /// Band levels of the most recent sample
    pub fn levels(&self) -> BandLevels {
        self.levels
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S: SpectrumSource> ReactiveSignal for SpectrumSignal<S> {
    fn sample(&mut self, now_ms: f64) -> SignalSample {
        if !self.source.frequency_data(&mut self.bins) {
            self.levels = BandLevels::default();
            return SignalSample::AMBIENT;
        }

        self.levels = BandLevels::from_bytes(&self.bins);
        SignalSample {
            intensity: self.levels.intensity(),
            beat: self.detector.detect(self.levels.bass, now_ms),
            force: None,
        }
    }
}

/// Time-based stand-in for spectral analysis: a kick drum envelope at a
/// fixed tempo, fed through the same beat detector
#[derive(Debug, Clone)]
pub struct PulseSignal {
    beat_ms: f64,
    playing: bool,
    detector: BeatDetector,
}

impl PulseSignal {
    pub fn new(bpm: f64) -> Self {
        Self {
            beat_ms: 60_000.0 / bpm.max(1.0),
            playing: false,
            detector: BeatDetector::default(),
        }
    }

    pub fn set_playing(&mut self, playing: bool) {
        if !playing {
            self.detector.reset();
        }
        self.playing = playing;
    }

    /// Synthetic band levels at `now_ms`
    pub fn levels(&self, now_ms: f64) -> BandLevels {
        let phase = (now_ms / self.beat_ms).fract() as f32;
        let kick = (1.0 - phase).powi(3);
        let sway = ((now_ms / self.beat_ms * std::f64::consts::PI).sin() as f32).abs();
        BandLevels {
            bass: kick,
            mid: 0.3 + 0.3 * sway,
            high: 0.2 + 0.2 * (1.0 - sway),
        }
    }
}

impl ReactiveSignal for PulseSignal {
    fn sample(&mut self, now_ms: f64) -> SignalSample {
        if !self.playing {
            return SignalSample::AMBIENT;
        }
        let levels = self.levels(now_ms);
        SignalSample {
            intensity: levels.intensity(),
            beat: self.detector.detect(levels.bass, now_ms),
            force: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSpectrum {
        frames: Vec<Option<Vec<u8>>>,
    }

    impl SpectrumSource for FakeSpectrum {
        fn frequency_data(&mut self, out: &mut Vec<u8>) -> bool {
            match self.frames.pop().flatten() {
                Some(frame) => {
                    *out = frame;
                    true
                }
                None => false,
            }
        }
    }

    #[test]
    fn test_pointer_signal() {
        let mut pointer = PointerSignal::default();
        assert_eq!(pointer.sample(0.0), SignalSample::AMBIENT);

        pointer.set_position(10.0, 20.0);
        let force = pointer.sample(0.0).force.unwrap();
        assert_eq!(force.origin, Vec2::new(10.0, 20.0));
        assert_eq!(force.radius, POINTER_RADIUS);

        pointer.clear();
        assert!(pointer.sample(0.0).force.is_none());
    }

    #[test]
    fn test_spectrum_signal_beats_and_silence() {
        let loud = vec![255u8; 64];
        let quiet = vec![10u8; 64];
        // popped from the back
        let mut signal = SpectrumSignal::new(FakeSpectrum {
            frames: vec![None, Some(quiet), Some(loud.clone()), Some(loud)],
        });

        let first = signal.sample(0.0);
        assert!(first.beat);
        assert!((first.intensity - 1.0).abs() < 1e-6);

        // inside the cooldown
        assert!(!signal.sample(50.0).beat);

        let quiet = signal.sample(400.0);
        assert!(!quiet.beat);
        assert!(quiet.intensity < 0.1);

        assert_eq!(signal.sample(500.0), SignalSample::AMBIENT);
        assert_eq!(signal.levels(), BandLevels::default());
    }

    #[test]
    fn test_pulse_signal_beats_on_tempo() {
        // 120 bpm: one beat every 500 ms
        let mut pulse = PulseSignal::new(120.0);
        assert_eq!(pulse.sample(0.0), SignalSample::AMBIENT);

        pulse.set_playing(true);
        let beats: Vec<f64> = (0..100)
            .map(|i| i as f64 * 20.0)
            .filter(|&t| pulse.sample(t).beat)
            .collect();
        assert_eq!(beats, vec![0.0, 500.0, 1000.0, 1500.0]);
    }

    #[test]
    fn test_boxed_signal_dispatch() {
        let mut sources: Vec<Box<dyn ReactiveSignal>> =
            vec![Box::new(Ambient), Box::new(PointerSignal::default())];
        for source in sources.iter_mut() {
            assert!(!source.sample(0.0).beat);
        }
    }
}
