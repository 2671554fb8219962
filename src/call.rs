//! Conversion from an alignment between two transducers into a series of state calls.
use crate::states::{argmax, PairState, BASES, NUM_STATES, STAY};
use crate::transducer::Transducer;
use std::borrow::Cow;

/// Convert an alignment of `trans1` and `trans2` into a series of calls, one for each step.
/// A call is a base (0..4) or [`STAY`].
/// If `reverse_first` is true, the first transducer is reverse complemented,
/// as it was in the alignment.
/// Panics if the alignment consumes more events than the transducers have.
pub fn alignment_to_call(
    trans1: &Transducer,
    trans2: &Transducer,
    alignment: &[PairState],
    reverse_first: bool,
) -> Vec<u8> {
    let trans1 = match reverse_first {
        true => Cow::Owned(trans1.reverse_complement()),
        false => Cow::Borrowed(trans1),
    };
    let (mut pos1, mut pos2) = (0, 0);
    let mut calls = Vec::with_capacity(alignment.len());
    for &state in alignment {
        let (di, dj) = state.movement().offset();
        assert!(
            pos1 + di <= trans1.len(),
            "Dropped off end of sequence 1 at {}",
            pos1
        );
        assert!(
            pos2 + dj <= trans2.len(),
            "Dropped off end of sequence 2 at {}",
            pos2
        );
        let call = match state {
            PairState::Diagonal => {
                let (row1, row2) = (trans1.row(pos1), trans2.row(pos2));
                let mut joint = [0f64; NUM_STATES];
                joint
                    .iter_mut()
                    .zip(row1.iter().zip(row2.iter()))
                    .for_each(|(x, (a, b))| *x = a + b);
                argmax(&joint)
            }
            PairState::FirstStayGap | PairState::SecondStayGap => STAY,
            PairState::FirstMoveGap => argmax(trans1.row(pos1)),
            PairState::SecondMoveGap => argmax(trans2.row(pos2)),
        };
        calls.push(call as u8);
        pos1 += di;
        pos2 += dj;
    }
    calls
}

/// Collapse calls into a nucleotide sequence, removing stays.
pub fn calls_to_sequence(calls: &[u8]) -> Vec<u8> {
    calls
        .iter()
        .filter_map(|&call| BASES.get(call as usize))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gen_transducer;
    use crate::pair_align::{align, AlignConfig};
    use rand::Rng;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    #[test]
    fn simple_calls() {
        let rows1 = vec![
            vec![-0.1, -3., -3., -3., -3.],
            vec![-3., -3., -3., -3., -0.1],
            vec![-3., -3., -0.1, -3., -3.],
        ];
        let rows2 = vec![vec![-3., -3., -3., -0.5, -1.], vec![-1., -3., -3., -3., -3.]];
        let trans1 = Transducer::from_rows(&rows1);
        let trans2 = Transducer::from_rows(&rows2);
        use PairState::*;
        let path = [Diagonal, FirstStayGap, SecondMoveGap, FirstMoveGap];
        let calls = alignment_to_call(&trans1, &trans2, &path, false);
        assert_eq!(calls, vec![0, 4, 0, 2]);
        assert_eq!(calls_to_sequence(&calls), b"AAG".to_vec());
        let path = [SecondStayGap, SecondStayGap, FirstMoveGap, FirstMoveGap, FirstMoveGap];
        let calls = alignment_to_call(&trans1, &trans2, &path, true);
        // Reverse complemented: G->C, stay, A->T.
        assert_eq!(calls, vec![4, 4, 1, 4, 3]);
    }
    #[test]
    #[should_panic]
    fn overrun() {
        let trans = Transducer::new(&[0f64; 2 * NUM_STATES], NUM_STATES);
        let path = [PairState::Diagonal, PairState::Diagonal, PairState::FirstMoveGap];
        alignment_to_call(&trans, &trans, &path, false);
    }
    #[test]
    fn stay_sentinel() {
        // The first transducer always stays, the second always emits A. Every step costs nothing.
        let mut rows1 = vec![vec![0f64; NUM_STATES]; 3];
        rows1.iter_mut().for_each(|row| row[STAY] = 1f64.ln());
        let mut rows2 = vec![vec![0f64; NUM_STATES]; 3];
        rows2.iter_mut().for_each(|row| row[0] = 1f64.ln());
        let trans1 = Transducer::from_rows(&rows1);
        let trans2 = Transducer::from_rows(&rows2);
        let config = AlignConfig::new(0f64, 0f64, 0f64, false);
        let (score, path) = align(&trans1, &trans2, &config);
        assert_eq!(score, 0f64);
        let calls = alignment_to_call(&trans1, &trans2, &path, false);
        assert_eq!(calls.len(), path.len());
        for (state, call) in path.iter().zip(calls.iter()) {
            if state.is_stay() {
                assert_eq!(*call as usize, STAY);
            }
        }
    }
    #[test]
    fn calls_have_path_length() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(2389);
        for _ in 0..20 {
            let len1 = rng.gen_range(0..30);
            let len2 = rng.gen_range(0..30);
            let trans1 = gen_transducer::random_transducer(&mut rng, len1);
            let trans2 = gen_transducer::random_transducer(&mut rng, len2);
            let config = AlignConfig::default();
            let (_, path) = align(&trans1, &trans2, &config);
            let calls = alignment_to_call(&trans1, &trans2, &path, config.reverse_first);
            assert_eq!(calls.len(), path.len());
            assert!(calls.iter().all(|&c| (c as usize) <= STAY));
        }
    }
    #[test]
    fn recover_template() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(9043);
        let template = gen_transducer::generate_seq(&mut rng, 100);
        let trans1 = gen_transducer::simulate(&template, &mut rng, &gen_transducer::NOISELESS);
        let trans2 = gen_transducer::simulate(&template, &mut rng, &gen_transducer::NOISELESS);
        let config = AlignConfig::default().reverse_first(false);
        let (_, path) = align(&trans1, &trans2, &config);
        let calls = alignment_to_call(&trans1, &trans2, &path, false);
        let seq = calls_to_sequence(&calls);
        assert_eq!(
            String::from_utf8_lossy(&seq),
            String::from_utf8_lossy(&template)
        );
    }
}
