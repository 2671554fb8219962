//! Alignment of two partial transducers by a pair automaton.
//!
//! The five states of the automaton are listed in [`PairState`]. A path starts at
//! `(0, 0)` in the `Diagonal` state and each step consumes one event from the first
//! transducer, from the second, or from both.
//! The cost of a step depends on the state it comes from, the state it goes to,
//! and the events consumed:
//!
//! - To `Diagonal`: the best joint emission of the two events. If the previous step
//!   was a move-gap, the joint stay is not allowed.
//! - To `FirstStayGap`/`SecondStayGap`: a gap penalty plus the stay of the consumed event.
//!   Only reachable from `Diagonal` or from itself.
//! - To `FirstMoveGap`/`SecondMoveGap`: a gap penalty plus the best move of the consumed event.
//!   Extending the same gap allows the stay as well.
//!
//! The gap penalty is `gap_in` along the first row and the first column,
//! `gap_out` when the step reaches the last event of either transducer, and `gap` otherwise.
use crate::dptable::DPTable;
use crate::states::{argmax, PairState, NUM_STATES, STAY};
use crate::transducer::Transducer;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

// Sentinel score of unreachable cells. It should be far below any real path score.
const EP: f64 = -1_000_000_000_000_000_000_000_000_000f64;
// Small penalty so that, on ties, X- -> -X loses to -X -> X-.
const PEN: f64 = -0.0001;

/// Gap penalties and orientation of an alignment between two transducers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignConfig {
    /// Penalty for non-aligned events around the hairpin, i.e., at the start of the alignment.
    pub gap_in: f64,
    /// Penalty for gaps where the two transducers are aligned.
    pub gap: f64,
    /// Penalty for non-aligned events at the end of the strand.
    pub gap_out: f64,
    /// Reverse complement the first transducer before the alignment.
    pub reverse_first: bool,
}

impl AlignConfig {
    pub fn new(gap_in: f64, gap: f64, gap_out: f64, reverse_first: bool) -> Self {
        Self {
            gap_in,
            gap,
            gap_out,
            reverse_first,
        }
    }
    pub fn reverse_first(mut self, reverse_first: bool) -> Self {
        self.reverse_first = reverse_first;
        self
    }
    /// Penalty for a gap step reaching the (i, j) cell, in the interior of the DP table.
    fn gap_at(&self, i: usize, j: usize, nev1: usize, nev2: usize) -> f64 {
        if i == nev1 || j == nev2 {
            self.gap_out
        } else {
            self.gap
        }
    }
}

impl std::default::Default for AlignConfig {
    fn default() -> Self {
        Self::new(-3f64, -5f64, -3f64, true)
    }
}

fn oriented<'a>(trans1: &'a Transducer, reverse_first: bool) -> Cow<'a, Transducer> {
    if reverse_first {
        Cow::Owned(trans1.reverse_complement())
    } else {
        Cow::Borrowed(trans1)
    }
}

// Per-event summaries and the step costs of the automaton.
struct StepCosts<'a> {
    trans1: &'a Transducer,
    trans2: &'a Transducer,
    all1: Vec<f64>,
    all2: Vec<f64>,
    move1: Vec<f64>,
    move2: Vec<f64>,
    config: &'a AlignConfig,
}

impl<'a> StepCosts<'a> {
    fn new(trans1: &'a Transducer, trans2: &'a Transducer, config: &'a AlignConfig) -> Self {
        Self {
            all1: trans1.all_max(),
            all2: trans2.all_max(),
            move1: trans1.move_max(),
            move2: trans2.move_max(),
            trans1,
            trans2,
            config,
        }
    }
    fn nev1(&self) -> usize {
        self.trans1.len()
    }
    fn nev2(&self) -> usize {
        self.trans2.len()
    }
    /// Cost of the step from `from` into `to`, reaching the (i,j) cell.
    /// None if the transition is not allowed.
    fn step(&self, from: PairState, to: PairState, i: usize, j: usize) -> Option<f64> {
        use PairState::*;
        let gap_in = self.config.gap_in;
        if j == 0 {
            // First column. Only the first transducer moves.
            return match (from, to) {
                (Diagonal, FirstMoveGap) if i == 1 => Some(gap_in + self.all1[i - 1]),
                (FirstMoveGap, FirstMoveGap) if 1 < i => Some(gap_in + self.all1[i - 1]),
                _ => None,
            };
        }
        if i == 0 {
            // First row. Only the second transducer moves.
            return match (from, to) {
                (Diagonal, SecondMoveGap) if j == 1 => Some(gap_in + self.all2[j - 1]),
                (SecondMoveGap, SecondMoveGap) if 1 < j => Some(gap_in + self.all2[j - 1]),
                _ => None,
            };
        }
        let (i1, i2) = (i - 1, j - 1);
        let gs = self.config.gap_at(i, j, self.nev1(), self.nev2());
        match to {
            Diagonal => {
                let (row1, row2) = (self.trans1.row(i1), self.trans2.row(i2));
                let mut joint = [0f64; NUM_STATES];
                joint
                    .iter_mut()
                    .zip(row1.iter().zip(row2.iter()))
                    .for_each(|(x, (a, b))| *x = a + b);
                let best = match from {
                    FirstMoveGap | SecondMoveGap => &joint[..STAY],
                    Diagonal | FirstStayGap | SecondStayGap => &joint[..],
                };
                Some(best.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            }
            FirstStayGap => match from {
                Diagonal | FirstStayGap => Some(gs + self.trans1.row(i1)[STAY]),
                _ => None,
            },
            FirstMoveGap => match from {
                FirstMoveGap => Some(gs + self.all1[i1]),
                _ => Some(gs + self.move1[i1]),
            },
            SecondStayGap => match from {
                Diagonal | SecondStayGap => Some(gs + self.trans2.row(i2)[STAY]),
                _ => None,
            },
            SecondMoveGap => match from {
                SecondMoveGap => Some(gs + self.all2[i2]),
                FirstStayGap | FirstMoveGap => Some(gs + self.move2[i2] + PEN),
                Diagonal | SecondStayGap => Some(gs + self.move2[i2]),
            },
        }
    }
}

/// Align two partial transducers, returning the score and the path of the best alignment.
/// The path is a sequence of states of the pair automaton, one for each step, from the start.
/// If `config.reverse_first` is true, the first transducer is reverse complemented beforehand.
/// Note that reversing changes the meaning of the stay state, so the first transducer
/// should have been trained accordingly.
///
/// The log-probabilities should be finite. The memory footprint is O(|trans1| x |trans2|).
pub fn align(
    trans1: &Transducer,
    trans2: &Transducer,
    config: &AlignConfig,
) -> (f64, Vec<PairState>) {
    // Rows are [f64; NUM_STATES], so the width is checked when a transducer is built.
    let trans1 = oriented(trans1, config.reverse_first);
    let costs = StepCosts::new(&trans1, trans2, config);
    let (nev1, nev2) = (costs.nev1(), costs.nev2());
    let mut dptable = DPTable::new(nev1 + 1, nev2 + 1, NUM_STATES, EP);
    let mut traceback: DPTable<Option<PairState>> =
        DPTable::new(nev1 + 1, nev2 + 1, NUM_STATES, None);
    dptable.set(0, 0, PairState::Diagonal.index(), 0f64);
    for i in 0..nev1 + 1 {
        for j in 0..nev2 + 1 {
            for &to in PairState::ALL.iter() {
                let (di, dj) = to.movement().offset();
                if i < di || j < dj {
                    continue;
                }
                let (pi, pj) = (i - di, j - dj);
                let mut best: Option<(PairState, f64)> = None;
                for &from in PairState::ALL.iter() {
                    if let Some(cost) = costs.step(from, to, i, j) {
                        let score = dptable.get(pi, pj, from.index()) + cost;
                        match best {
                            Some((_, max)) if score <= max => {}
                            _ => best = Some((from, score)),
                        }
                    }
                }
                if let Some((from, score)) = best {
                    dptable.set(i, j, to.index(), score);
                    traceback.set(i, j, to.index(), Some(from));
                }
            }
        }
    }
    // Traceback
    let last_cell = dptable.get_cell(nev1, nev2);
    let last_state = argmax(last_cell);
    let score = last_cell[last_state];
    let mut state = PairState::ALL[last_state];
    let (mut i, mut j) = (nev1, nev2);
    let mut path = Vec::with_capacity(nev1 + nev2);
    while i > 0 || j > 0 {
        let (di, dj) = state.movement().offset();
        assert!(di <= i && dj <= j, "Failed i1 {} i2 {}", i, j);
        path.push(state);
        let from = traceback.get(i, j, state.index());
        i -= di;
        j -= dj;
        state = match from {
            Some(from) => from,
            None => panic!("Unreachable cell ({},{},{}) in the traceback", i, j, state),
        };
    }
    path.reverse();
    trace!("ALIGN\t{}\t{}\t{:.3}\t{}", nev1, nev2, score, path.len());
    (score, path)
}

/// Score of `path` as an alignment between `trans1` and `trans2`.
/// None if the path takes a forbidden transition, or does not consume exactly all the events.
/// For the path returned by [`align`], it equals the score returned together.
pub fn path_score(
    trans1: &Transducer,
    trans2: &Transducer,
    path: &[PairState],
    config: &AlignConfig,
) -> Option<f64> {
    let trans1 = oriented(trans1, config.reverse_first);
    let costs = StepCosts::new(&trans1, trans2, config);
    let (mut i, mut j, mut prev) = (0, 0, PairState::Diagonal);
    let mut score = 0f64;
    for &state in path {
        let (di, dj) = state.movement().offset();
        i += di;
        j += dj;
        if costs.nev1() < i || costs.nev2() < j {
            return None;
        }
        score += costs.step(prev, state, i, j)?;
        prev = state;
    }
    (i == costs.nev1() && j == costs.nev2()).then(|| score)
}

/// Number of events consumed from the first and the second transducer by `path`.
pub fn consumed_events(path: &[PairState]) -> (usize, usize) {
    path.iter()
        .map(|state| state.movement().offset())
        .fold((0, 0), |(i, j), (di, dj)| (i + di, j + dj))
}
