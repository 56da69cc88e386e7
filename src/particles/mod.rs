//! Ambient particle background
//!
//! A field of drifting points that reacts to a normalized input signal.
//! Where the signal comes from (pointer, music analyser) is decided by the
//! caller; the field only ever sees a `SignalSample`.

pub mod beat;
pub mod field;
pub mod signal;

pub use beat::{BandLevels, BeatDetector};
pub use field::{Connection, ConnectionMode, FieldConfig, Particle, ParticleField, ParticleKind};
pub use signal::{
    Ambient, ForceField, PointerSignal, PulseSignal, ReactiveSignal, SignalSample, SpectrumSignal,
    SpectrumSource,
};
