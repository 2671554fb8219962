//! This module is to generate some random transducers to assess the performance.
//! Usually, it would not be used in the real-applications.
use crate::states::{BASES, NUM_STATES, STAY};
use crate::transducer::Transducer;
use rand::seq::SliceRandom;
use rand::Rng;

/// How a simulated basecaller reads a strand.
#[derive(Debug, Clone, Copy)]
pub struct Profile {
    /// Probability to emit an additional stay event after each base.
    pub stay: f64,
    /// Probability to skip a base.
    pub skip: f64,
    /// Posterior probability of the true state in each event.
    pub confidence: f64,
}

pub const PROFILE: Profile = Profile {
    stay: 0.1,
    skip: 0.03,
    confidence: 0.8,
};

pub const NOISELESS: Profile = Profile {
    stay: 0.,
    skip: 0.,
    confidence: 0.95,
};

const MIN_PROB: f64 = 0.000_001;

pub fn generate_seq<T: Rng>(rng: &mut T, len: usize) -> Vec<u8> {
    let bases = b"ACTG";
    (0..len)
        .filter_map(|_| bases.choose(rng))
        .copied()
        .collect()
}

// Posterior of an event where `state` is the truth.
fn posterior<T: Rng>(rng: &mut T, state: usize, confidence: f64) -> Vec<f64> {
    let mut noise: Vec<f64> = (0..NUM_STATES).map(|_| rng.gen_range(0.01..1f64)).collect();
    noise[state] = 0f64;
    let sum: f64 = noise.iter().sum();
    noise
        .iter_mut()
        .for_each(|x| *x = *x / sum * (1f64 - confidence));
    noise[state] = confidence;
    noise
}

/// Simulate the transducer of reading `seq` under the profile `p`.
pub fn simulate<T: Rng>(seq: &[u8], rng: &mut T, p: &Profile) -> Transducer {
    let mut rows = vec![];
    for base in seq.iter().filter_map(|b| BASES.iter().position(|x| x == b)) {
        if rng.gen_bool(p.skip) {
            continue;
        }
        rows.push(posterior(rng, base, p.confidence));
        while rng.gen_bool(p.stay) {
            rows.push(posterior(rng, STAY, p.confidence));
        }
    }
    Transducer::from_probabilities(&rows, MIN_PROB)
}

/// A transducer with `len` events, each of which is a random posterior.
pub fn random_transducer<T: Rng>(rng: &mut T, len: usize) -> Transducer {
    let rows: Vec<Vec<f64>> = (0..len)
        .map(|_| (0..NUM_STATES).map(|_| rng.gen_range(0.01..1f64)).collect())
        .collect();
    Transducer::from_probabilities(&rows, MIN_PROB)
}
