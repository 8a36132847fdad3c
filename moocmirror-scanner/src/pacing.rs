//! Randomized politeness delays.
//!
//! The pacer only computes how long to wait. Suspending is left to the caller,
//! which keeps the pacer deterministic under a fixed seed.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;

/// Mean and spread of a normally distributed delay, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PacingProfile {
    pub mean_secs: f64,
    pub std_dev_secs: f64,
}

impl PacingProfile {
    pub fn new(mean_secs: f64, std_dev_secs: f64) -> Self {
        Self {
            mean_secs,
            std_dev_secs,
        }
    }

    pub fn none() -> Self {
        Self::new(0.0, 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingKind {
    /// Before constructing any node.
    PageFetch,
    /// Before each document or video download.
    ArtifactFetch,
}

pub struct Pacer {
    page: PacingProfile,
    artifact: PacingProfile,
    rng: Mutex<StdRng>,
}

impl Pacer {
    pub fn new(page: PacingProfile, artifact: PacingProfile) -> Self {
        Self::with_rng(page, artifact, StdRng::from_os_rng())
    }

    pub fn seeded(page: PacingProfile, artifact: PacingProfile, seed: u64) -> Self {
        Self::with_rng(page, artifact, StdRng::seed_from_u64(seed))
    }

    /// Always returns a zero delay.
    pub fn disabled() -> Self {
        Self::seeded(PacingProfile::none(), PacingProfile::none(), 0)
    }

    fn with_rng(page: PacingProfile, artifact: PacingProfile, rng: StdRng) -> Self {
        Self {
            page,
            artifact,
            rng: Mutex::new(rng),
        }
    }

    pub fn profile(&self, kind: PacingKind) -> PacingProfile {
        match kind {
            PacingKind::PageFetch => self.page,
            PacingKind::ArtifactFetch => self.artifact,
        }
    }

    /// Draw a delay for `kind`. Never negative: the absolute value of the
    /// sample is taken rather than truncating at zero.
    pub fn delay(&self, kind: PacingKind) -> Duration {
        let PacingProfile {
            mean_secs,
            std_dev_secs,
        } = self.profile(kind);

        if !mean_secs.is_finite() || !std_dev_secs.is_finite() {
            return Duration::ZERO;
        }

        let normal = match Normal::new(mean_secs, std_dev_secs.abs()) {
            Ok(normal) => normal,
            Err(_) => return Duration::ZERO,
        };

        let sample = {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            normal.sample(&mut *rng)
        };

        if !sample.is_finite() {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(sample.abs()).unwrap_or(Duration::MAX)
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(PacingProfile::new(10.0, 3.0), PacingProfile::new(15.0, 5.0))
    }
}
