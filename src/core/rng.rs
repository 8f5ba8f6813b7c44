use std::f64::consts::PI;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Source of uniform draws in the open interval (0, 1).
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

/// Source of approximately standard-normal draws.
pub trait NormalSource {
    fn next_normal(&mut self) -> f64;
}

impl<N: NormalSource + ?Sized> NormalSource for &mut N {
    fn next_normal(&mut self) -> f64 {
        (**self).next_normal()
    }
}

impl<N: NormalSource + ?Sized> NormalSource for Box<N> {
    fn next_normal(&mut self) -> f64 {
        (**self).next_normal()
    }
}

/// Xorshift64* generator. Each simulation request owns one, so no locking is needed.
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        let state = splitmix64(seed);
        Self {
            state: if state == 0 {
                0xA5A5_A5A5_A5A5_A5A5
            } else {
                state
            },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }
}

impl UniformSource for SeededRng {
    fn next_uniform(&mut self) -> f64 {
        const DENOM: f64 = (1_u64 << 53) as f64;
        let v = self.next_u64() >> 11;
        ((v as f64) + 0.5) / DENOM
    }
}

/// `sqrt(-2 ln u1) * cos(2 pi u2)`, redrawing `u1` while it is zero.
#[derive(Debug, Clone)]
pub struct BoxMuller<U> {
    uniform: U,
}

impl<U: UniformSource> BoxMuller<U> {
    pub fn new(uniform: U) -> Self {
        Self { uniform }
    }
}

impl<U: UniformSource> NormalSource for BoxMuller<U> {
    fn next_normal(&mut self) -> f64 {
        let mut u1 = self.uniform.next_uniform();
        while u1 <= 0.0 {
            u1 = self.uniform.next_uniform();
        }
        let u2 = self.uniform.next_uniform();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }
}

/// Sum of six uniforms minus three, rescaled to unit variance.
///
/// The sum of six U(0,1) draws has variance 1/2, so the centred sum is
/// multiplied by `sqrt(2)`. Output is bounded to roughly +/-4.24.
#[derive(Debug, Clone)]
pub struct CentralLimit<U> {
    uniform: U,
}

impl<U: UniformSource> CentralLimit<U> {
    pub fn new(uniform: U) -> Self {
        Self { uniform }
    }
}

impl<U: UniformSource> NormalSource for CentralLimit<U> {
    fn next_normal(&mut self) -> f64 {
        let sum: f64 = (0..6).map(|_| self.uniform.next_uniform()).sum();
        (sum - 3.0) * std::f64::consts::SQRT_2
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SamplerKind {
    #[serde(alias = "boxMuller", alias = "box_muller")]
    BoxMuller,
    #[serde(alias = "centralLimit", alias = "central_limit", alias = "clt")]
    CentralLimit,
}

impl SamplerKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::BoxMuller => "box-muller",
            Self::CentralLimit => "central-limit",
        }
    }
}

/// Runtime-selected normal sampler over a seeded generator.
#[derive(Debug, Clone)]
pub enum Sampler {
    BoxMuller(BoxMuller<SeededRng>),
    CentralLimit(CentralLimit<SeededRng>),
}

impl Sampler {
    pub fn new(kind: SamplerKind, seed: u64) -> Self {
        let rng = SeededRng::new(seed);
        match kind {
            SamplerKind::BoxMuller => Self::BoxMuller(BoxMuller::new(rng)),
            SamplerKind::CentralLimit => Self::CentralLimit(CentralLimit::new(rng)),
        }
    }
}

impl NormalSource for Sampler {
    fn next_normal(&mut self) -> f64 {
        match self {
            Self::BoxMuller(s) => s.next_normal(),
            Self::CentralLimit(s) => s.next_normal(),
        }
    }
}

/// Seed for callers that did not supply one.
pub fn entropy_seed() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let bump = COUNTER.fetch_add(1, Ordering::Relaxed);
    splitmix64(nanos ^ bump.rotate_left(32))
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
