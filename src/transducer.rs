//! Per-event posterior matrices produced by a basecalling network.
use crate::states::{NUM_BASES, NUM_STATES, NUM_TRANSITIONS, REV_COMP, STAY};

/// A (partial) transducer: for each event, the log-probabilities of
/// moving and emitting A, C, G, T, or staying.
#[derive(Debug, Clone, PartialEq)]
pub struct Transducer {
    rows: Vec<[f64; NUM_STATES]>,
}

impl Transducer {
    /// Build a transducer from a row-major `values` with `nstate` columns.
    /// Panics if `nstate` is not 5 or `values` is not a multiple of it.
    pub fn new(values: &[f64], nstate: usize) -> Self {
        assert_eq!(nstate, NUM_STATES, "Incorrect number of states in transducer");
        assert_eq!(values.len() % nstate, 0, "Ragged transducer");
        let rows = values
            .chunks_exact(NUM_STATES)
            .map(|row| {
                let mut slot = [0f64; NUM_STATES];
                slot.copy_from_slice(row);
                slot
            })
            .collect();
        Self { rows }
    }
    /// Build a transducer from log-probability rows. Panics if some row does not have 5 states.
    pub fn from_rows<T: std::borrow::Borrow<[f64]>>(rows: &[T]) -> Self {
        let values: Vec<_> = rows
            .iter()
            .flat_map(|row| {
                let row = row.borrow();
                assert_eq!(row.len(), NUM_STATES, "Incorrect number of states in transducer");
                row.iter().copied()
            })
            .collect();
        Self::new(&values, NUM_STATES)
    }
    /// Build a transducer from raw probabilities. Each probability is floored at `min_prob`,
    /// then each row is normalized and log-transformed.
    pub fn from_probabilities<T: std::borrow::Borrow<[f64]>>(rows: &[T], min_prob: f64) -> Self {
        assert!(0f64 < min_prob && min_prob < 1f64, "min_prob should be in (0,1)");
        let rows: Vec<_> = rows
            .iter()
            .map(|row| {
                let row = row.borrow();
                assert_eq!(row.len(), NUM_STATES, "Incorrect number of states in transducer");
                let mut slot = [0f64; NUM_STATES];
                slot.iter_mut()
                    .zip(row.iter())
                    .for_each(|(x, &p)| *x = p.max(min_prob));
                let sum: f64 = slot.iter().sum();
                slot.iter_mut().for_each(|x| *x = (*x / sum).ln());
                slot
            })
            .collect();
        Self { rows }
    }
    pub fn len(&self) -> usize {
        self.rows.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
    pub fn rows(&self) -> &[[f64; NUM_STATES]] {
        &self.rows
    }
    pub fn row(&self, i: usize) -> &[f64; NUM_STATES] {
        &self.rows[i]
    }
    /// Reverse the order of the events and complement the bases.
    pub fn reverse_complement(&self) -> Self {
        let rows = self
            .rows
            .iter()
            .rev()
            .map(|row| {
                let mut slot = [0f64; NUM_STATES];
                slot.iter_mut()
                    .zip(REV_COMP.iter())
                    .for_each(|(x, &from)| *x = row[from]);
                slot
            })
            .collect();
        Self { rows }
    }
    /// Maximum over all the states, for each event.
    pub fn all_max(&self) -> Vec<f64> {
        self.rows.iter().map(|row| max_of(row)).collect()
    }
    /// Maximum over the moves (i.e., all states except the stay), for each event.
    pub fn move_max(&self) -> Vec<f64> {
        self.rows.iter().map(|row| max_of(&row[..STAY])).collect()
    }
    /// Stay log-probability for each event.
    pub fn stay(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row[STAY]).collect()
    }
}

fn max_of(xs: &[f64]) -> f64 {
    xs.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// A full transducer: for each event and each current base,
/// log-probabilities of the 25 transitions (a stay, or a move of some skip distance onto a base).
#[derive(Debug, Clone, PartialEq)]
pub struct FullTransducer {
    events: Vec<[[f64; NUM_TRANSITIONS]; NUM_BASES]>,
}

impl FullTransducer {
    /// Build a full transducer from row-major `values` with the given `shape`.
    /// Panics unless the trailing dimensions are (4, 25) and `values` fits `shape`.
    pub fn new(values: &[f64], shape: (usize, usize, usize)) -> Self {
        let (nev, nbase, ntrans) = shape;
        assert_eq!(
            (nbase, ntrans),
            (NUM_BASES, NUM_TRANSITIONS),
            "Transducer has incorrect shape"
        );
        assert_eq!(values.len(), nev * nbase * ntrans, "Transducer has incorrect shape");
        let events = values
            .chunks_exact(NUM_BASES * NUM_TRANSITIONS)
            .map(|event| {
                let mut slot = [[0f64; NUM_TRANSITIONS]; NUM_BASES];
                for (base, row) in slot.iter_mut().zip(event.chunks_exact(NUM_TRANSITIONS)) {
                    base.copy_from_slice(row);
                }
                slot
            })
            .collect();
        Self { events }
    }
    pub fn len(&self) -> usize {
        self.events.len()
    }
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.events.len(), NUM_BASES, NUM_TRANSITIONS)
    }
    /// Log-probability of the `code` transition from `base` at the `i`-th event.
    pub fn get(&self, i: usize, base: usize, code: usize) -> f64 {
        self.events[i][base][code]
    }
}
