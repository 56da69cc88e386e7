//! Particle field simulation

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::signal::SignalSample;
use crate::consts::{
    CONNECTION_DISTANCE, CONNECTION_OPACITY, FLASH_DECAY, FLASH_OPACITY_BOOST, PARTICLE_DENSITY,
    POINTER_OPACITY_BOOST, POINTER_PUSH, REACTIVE_DENSITY_MULTIPLIER, REFERENCE_FPS,
    VELOCITY_DAMPING,
};

/// Frames of catch-up allowed in one tick (tab switches)
const MAX_FRAMES_PER_TICK: f32 = 4.0;

/// Visual style of a particle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Normal,
    /// Soft halo around the dot
    Glow,
    /// Small four-point sparkle
    Star,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    /// Pixels per reference frame
    pub vel: Vec2,
    pub size: f32,
    pub base_opacity: f32,
    /// Opacity after pointer influence, before pulse and flash
    pub opacity: f32,
    pub pulse_speed: f32,
    pub pulse_offset: f32,
    pub kind: ParticleKind,
    /// Final alpha for this frame
    pub alpha: f32,
    /// Final radius for this frame
    pub radius: f32,
}

impl Particle {
    fn random(rng: &mut Pcg32, width: f32, height: f32) -> Self {
        let size = rng.random::<f32>() * 2.0 + 0.5;
        let base_opacity = rng.random::<f32>() * 0.4 + 0.1;
        let roll = rng.random::<f32>();
        let kind = if roll > 0.95 {
            ParticleKind::Star
        } else if roll > 0.85 {
            ParticleKind::Glow
        } else {
            ParticleKind::Normal
        };

        Self {
            pos: Vec2::new(rng.random::<f32>() * width, rng.random::<f32>() * height),
            vel: Vec2::new(
                (rng.random::<f32>() - 0.5) * 0.8,
                (rng.random::<f32>() - 0.5) * 0.8,
            ),
            size,
            base_opacity,
            opacity: base_opacity,
            pulse_speed: rng.random::<f32>() * 0.02 + 0.01,
            pulse_offset: rng.random::<f32>() * TAU,
            kind,
            alpha: base_opacity,
            radius: size,
        }
    }
}

/// When constellation lines are drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectionMode {
    /// Always, at full strength
    Always,
    /// Only while signal intensity exceeds the threshold, scaled by it
    Reactive { threshold: f32 },
    Off,
}

/// A line between two nearby particles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    pub alpha: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    /// Square pixels per particle
    pub density: f32,
    /// Music mode runs a denser field
    pub reactive: bool,
    pub connections: ConnectionMode,
    pub max_particles: Option<usize>,
    /// Sinusoidal opacity pulse
    pub pulse: bool,
    /// Beat flash
    pub flash: bool,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            density: PARTICLE_DENSITY,
            reactive: false,
            connections: ConnectionMode::Always,
            max_particles: None,
            pulse: true,
            flash: true,
        }
    }
}

impl FieldConfig {
    /// Audio-driven variant
    pub fn reactive() -> Self {
        Self {
            reactive: true,
            connections: ConnectionMode::Reactive { threshold: 0.3 },
            ..Self::default()
        }
    }

    /// Particle count for a canvas of this size
    pub fn target_count(&self, width: f32, height: f32) -> usize {
        if !(width > 0.0 && height > 0.0) {
            return 0;
        }
        let mut count = (width * height / self.density).floor();
        if self.reactive {
            count = (count * REACTIVE_DENSITY_MULTIPLIER).floor();
        }
        let count = count as usize;
        match self.max_particles {
            Some(max) => count.min(max),
            None => count,
        }
    }
}

/// Particles on a wrapping canvas
#[derive(Debug, Clone)]
pub struct ParticleField {
    pub config: FieldConfig,
    pub width: f32,
    pub height: f32,
    pub particles: Vec<Particle>,
    /// Beat flash level, 0-1
    pub flash: f32,
    pub elapsed_ms: f64,
    /// Sample the last tick ran with
    last_sample: SignalSample,
    rng: Pcg32,
}

impl ParticleField {
    pub fn new(config: FieldConfig, seed: u64) -> Self {
        Self {
            config,
            width: 0.0,
            height: 0.0,
            particles: Vec::new(),
            flash: 0.0,
            elapsed_ms: 0.0,
            last_sample: SignalSample::AMBIENT,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Take the new canvas size and regenerate the whole population
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        let count = self.config.target_count(self.width, self.height);
        let (w, h) = (self.width, self.height);
        let rng = &mut self.rng;
        self.particles = (0..count).map(|_| Particle::random(rng, w, h)).collect();
        log::debug!("Particle field {}x{}: {} particles", w, h, count);
    }

    /// Swap config (quality or mode change) and repopulate
    pub fn reconfigure(&mut self, config: FieldConfig) {
        self.config = config;
        self.resize(self.width, self.height);
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn last_sample(&self) -> &SignalSample {
        &self.last_sample
    }

    /// Advance by `dt_secs` under one input sample
    pub fn tick(&mut self, dt_secs: f32, sample: &SignalSample) {
        self.last_sample = *sample;
        if self.particles.is_empty() || self.width <= 0.0 || self.height <= 0.0 {
            return;
        }

        let frames = (dt_secs.max(0.0) * REFERENCE_FPS).min(MAX_FRAMES_PER_TICK);
        self.elapsed_ms += dt_secs.max(0.0) as f64 * 1000.0;

        if sample.beat && self.config.flash {
            self.flash = 1.0;
        }

        let speed = 1.0 + sample.intensity.clamp(0.0, 1.0) * 2.0;
        let damping = VELOCITY_DAMPING.powf(frames);
        let flash = self.flash;
        let (width, height) = (self.width, self.height);
        let elapsed = self.elapsed_ms;
        let pulse_on = self.config.pulse;

        for p in self.particles.iter_mut() {
            p.pos += p.vel * frames * speed;

            p.opacity = p.base_opacity;
            if let Some(force) = sample.force {
                let away = p.pos - force.origin;
                let distance = away.length();
                if distance < force.radius {
                    let strength = (force.radius - distance) / force.radius;
                    p.vel += away.normalize_or_zero() * strength * POINTER_PUSH * frames;
                    p.opacity = (p.base_opacity + strength * POINTER_OPACITY_BOOST).min(1.0);
                }
            }
            p.vel *= damping;

            p.pos.x = wrap(p.pos.x, width);
            p.pos.y = wrap(p.pos.y, height);

            let pulse = if pulse_on {
                (elapsed * p.pulse_speed as f64 + p.pulse_offset as f64).sin() as f32 * 0.3 + 0.7
            } else {
                1.0
            };
            p.alpha = (p.opacity * pulse + flash * FLASH_OPACITY_BOOST).clamp(0.0, 1.0);
            p.radius = p.size * (1.0 + flash * 0.5);
        }

        self.flash *= FLASH_DECAY.powf(frames);
        if self.flash < 0.01 {
            self.flash = 0.0;
        }
    }

    /// Line strength for the last sample, None when lines are hidden
    fn connection_strength(&self) -> Option<f32> {
        match self.config.connections {
            ConnectionMode::Always => Some(1.0),
            ConnectionMode::Reactive { threshold } => {
                let intensity = self.last_sample.intensity;
                (intensity > threshold).then_some(intensity)
            }
            ConnectionMode::Off => None,
        }
    }

    /// Pairs closer than the connection distance, fading with range
    pub fn connections(&self) -> Vec<Connection> {
        let Some(strength) = self.connection_strength() else {
            return Vec::new();
        };

        let max_sq = CONNECTION_DISTANCE * CONNECTION_DISTANCE;
        let mut lines = Vec::new();
        for (i, a) in self.particles.iter().enumerate() {
            for (j, b) in self.particles.iter().enumerate().skip(i + 1) {
                let dist_sq = a.pos.distance_squared(b.pos);
                if dist_sq >= max_sq {
                    continue;
                }
                let distance = dist_sq.sqrt();
                lines.push(Connection {
                    a: i,
                    b: j,
                    alpha: (CONNECTION_DISTANCE - distance) / CONNECTION_DISTANCE
                        * CONNECTION_OPACITY
                        * strength,
                });
            }
        }
        lines
    }
}

/// Map into [0, extent)
fn wrap(value: f32, extent: f32) -> f32 {
    let wrapped = value.rem_euclid(extent);
    if wrapped >= extent { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::signal::ForceField;
    use proptest::prelude::*;

    fn field(width: f32, height: f32) -> ParticleField {
        let mut field = ParticleField::new(FieldConfig::default(), 7);
        field.resize(width, height);
        field
    }

    #[test]
    fn test_count_follows_area() {
        let field = field(1500.0, 1000.0);
        assert_eq!(field.particle_count(), 100);

        let mut reactive = ParticleField::new(FieldConfig::reactive(), 7);
        reactive.resize(1500.0, 1000.0);
        assert_eq!(reactive.particle_count(), 150);
    }

    #[test]
    fn test_resize_is_stable_and_capped() {
        let mut field = field(800.0, 600.0);
        let count = field.particle_count();
        field.resize(800.0, 600.0);
        assert_eq!(field.particle_count(), count);

        field.reconfigure(FieldConfig {
            max_particles: Some(5),
            ..FieldConfig::default()
        });
        assert_eq!(field.particle_count(), 5);
    }

    #[test]
    fn test_zero_sized_canvas() {
        let mut field = field(0.0, 600.0);
        assert_eq!(field.particle_count(), 0);
        field.tick(1.0 / 60.0, &SignalSample::AMBIENT);
        assert!(field.connections().is_empty());
    }

    #[test]
    fn test_wraps_around_edges() {
        let mut field = field(300.0, 300.0);
        field.particles[0].pos = Vec2::new(299.9, 0.1);
        field.particles[0].vel = Vec2::new(0.5, -0.5);
        field.tick(1.0 / 60.0, &SignalSample::AMBIENT);
        let pos = field.particles[0].pos;
        assert!(pos.x < 1.0, "x wrapped to {}", pos.x);
        assert!(pos.y > 299.0, "y wrapped to {}", pos.y);
    }

    #[test]
    fn test_pointer_pushes_away_and_brightens() {
        let mut field = field(600.0, 600.0);
        let p = &mut field.particles[0];
        p.pos = Vec2::new(310.0, 300.0);
        p.vel = Vec2::ZERO;
        let base = p.base_opacity;

        let sample = SignalSample {
            force: Some(ForceField {
                origin: Vec2::new(300.0, 300.0),
                radius: 150.0,
            }),
            ..SignalSample::AMBIENT
        };
        field.tick(1.0 / 60.0, &sample);

        let p = &field.particles[0];
        assert!(p.vel.x > 0.0);
        assert!(p.vel.y.abs() < 1e-6);
        assert!(p.opacity > base);

        field.tick(1.0 / 60.0, &SignalSample::AMBIENT);
        assert_eq!(field.particles[0].opacity, base);
    }

    #[test]
    fn test_beat_flash_decays() {
        let mut field = field(600.0, 600.0);
        let beat = SignalSample {
            intensity: 0.9,
            beat: true,
            force: None,
        };
        field.tick(1.0 / 60.0, &beat);
        assert!(field.flash > 0.8 && field.flash < 1.0);
        assert!(field.particles.iter().all(|p| p.alpha >= FLASH_OPACITY_BOOST));

        for _ in 0..60 {
            field.tick(1.0 / 60.0, &SignalSample::AMBIENT);
        }
        assert_eq!(field.flash, 0.0);
    }

    #[test]
    fn test_flash_disabled() {
        let mut field = ParticleField::new(
            FieldConfig {
                flash: false,
                ..FieldConfig::default()
            },
            1,
        );
        field.resize(400.0, 400.0);
        let beat = SignalSample {
            beat: true,
            ..SignalSample::AMBIENT
        };
        field.tick(1.0 / 60.0, &beat);
        assert_eq!(field.flash, 0.0);
    }

    #[test]
    fn test_connection_modes() {
        let mut field = ParticleField::new(FieldConfig::reactive(), 3);
        field.resize(400.0, 400.0);
        field.particles[0].pos = Vec2::new(10.0, 10.0);
        field.particles[1].pos = Vec2::new(70.0, 10.0);

        field.tick(0.0, &SignalSample::AMBIENT);
        assert!(field.connections().is_empty());

        let loud = SignalSample {
            intensity: 0.8,
            ..SignalSample::AMBIENT
        };
        field.tick(0.0, &loud);
        let line = field
            .connections()
            .into_iter()
            .find(|c| c.a == 0 && c.b == 1)
            .unwrap();
        assert!((line.alpha - 0.5 * CONNECTION_OPACITY * 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = field(640.0, 480.0);
        let b = field(640.0, 480.0);
        assert_eq!(a.particles, b.particles);
    }

    proptest! {
        #[test]
        fn prop_count_matches_density(w in 1.0f32..3000.0, h in 1.0f32..3000.0) {
            let field = field(w, h);
            prop_assert_eq!(field.particle_count(), (w * h / PARTICLE_DENSITY).floor() as usize);
        }

        #[test]
        fn prop_positions_stay_in_bounds(
            w in 10.0f32..800.0,
            h in 10.0f32..800.0,
            dt in 0.0f32..0.5,
            px in -100.0f32..900.0,
            py in -100.0f32..900.0,
            intensity in 0.0f32..1.0,
            steps in 1usize..20,
        ) {
            let mut field = field(w, h);
            let sample = SignalSample {
                intensity,
                beat: intensity > 0.5,
                force: Some(ForceField { origin: Vec2::new(px, py), radius: 150.0 }),
            };
            for _ in 0..steps {
                field.tick(dt, &sample);
            }
            for p in &field.particles {
                prop_assert!(p.pos.x >= 0.0 && p.pos.x < w);
                prop_assert!(p.pos.y >= 0.0 && p.pos.y < h);
                prop_assert!(p.alpha >= 0.0 && p.alpha <= 1.0);
            }
        }
    }
}
