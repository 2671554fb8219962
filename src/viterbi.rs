//! Viterbi decoding of a full transducer.
//!
//! The hidden state is the current base. At each event, the current base either stays
//! (transition code 0), or moves onto a new base by some skip distance (codes 1..25).
use crate::states::{
    argmax, skip_distance, target_base, BASES, NUM_BASES, NUM_TRANSITIONS, STAY_TRANSITION,
};
use crate::transducer::FullTransducer;

// Canary value for unreached cells.
const CANARY: f64 = -500_000_000f64;

/// The best path through a full transducer.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPath {
    /// Log-probability of the path.
    pub score: f64,
    /// The base at each position. The length is the number of events plus one.
    pub bases: Vec<u8>,
    /// The transition code taken at each event.
    pub transitions: Vec<u8>,
}

impl DecodedPath {
    /// Called sequence. A stay emits nothing, a move emits the base it reaches.
    pub fn sequence(&self) -> Vec<u8> {
        self.transitions
            .iter()
            .zip(self.bases.iter().skip(1))
            .filter(|&(&code, _)| code as usize != STAY_TRANSITION)
            .map(|(_, &base)| BASES[base as usize])
            .collect()
    }
    /// Total number of positions advanced along the path, counting skips.
    pub fn advanced(&self) -> usize {
        self.transitions
            .iter()
            .map(|&code| skip_distance(code as usize))
            .sum()
    }
}

/// Decode a full transducer with the Viterbi algorithm.
/// On ties, the smaller previous base and the smaller transition code win.
/// Panics if the trailing dimensions of `ltrans` are not (4, 25).
pub fn decode_full_transducer(ltrans: &FullTransducer) -> DecodedPath {
    let (nev, nbase, ntrans) = ltrans.shape();
    assert_eq!(
        (nbase, ntrans),
        (NUM_BASES, NUM_TRANSITIONS),
        "Transducer has incorrect shape"
    );
    let mut vitmat = vec![[CANARY; NUM_BASES]; nev + 1];
    // (previous base, transition code).
    let mut traceback = vec![[None; NUM_BASES]; nev + 1];
    vitmat[0] = [0f64; NUM_BASES];
    for i in 1..nev + 1 {
        for pre in 0..NUM_BASES {
            vitmat[i][pre] = vitmat[i - 1][pre] + ltrans.get(i - 1, pre, STAY_TRANSITION);
            traceback[i][pre] = Some((pre as u8, STAY_TRANSITION as u8));
        }
        for pre in 0..NUM_BASES {
            for code in 1..NUM_TRANSITIONS {
                let st = target_base(code) as usize;
                let score = vitmat[i - 1][pre] + ltrans.get(i - 1, pre, code);
                if vitmat[i][st] < score {
                    vitmat[i][st] = score;
                    traceback[i][st] = Some((pre as u8, code as u8));
                }
            }
        }
    }
    let last = argmax(&vitmat[nev]);
    let score = vitmat[nev][last];
    let mut bases = vec![0; nev + 1];
    let mut transitions = vec![0; nev];
    bases[nev] = last as u8;
    for i in (1..nev + 1).rev() {
        match traceback[i][bases[i] as usize] {
            Some((pre, code)) => {
                bases[i - 1] = pre;
                transitions[i - 1] = code;
            }
            None => panic!("Unreached cell ({},{}) in the traceback", i, bases[i]),
        }
    }
    debug!("DECODE\t{}\t{:.3}", nev, score);
    DecodedPath {
        score,
        bases,
        transitions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    const SIZE: usize = NUM_BASES * NUM_TRANSITIONS;
    #[test]
    fn all_stay() {
        let mut values = vec![f64::NEG_INFINITY; 2 * SIZE];
        for event in values.chunks_exact_mut(SIZE) {
            for base in event.chunks_exact_mut(NUM_TRANSITIONS) {
                base[STAY_TRANSITION] = 0f64;
            }
        }
        let ltrans = FullTransducer::new(&values, (2, NUM_BASES, NUM_TRANSITIONS));
        let decoded = decode_full_transducer(&ltrans);
        assert_eq!(decoded.score, 0f64);
        assert_eq!(decoded.bases, vec![0, 0, 0]);
        assert_eq!(decoded.transitions, vec![0, 0]);
        assert!(decoded.sequence().is_empty());
        assert_eq!(decoded.advanced(), 0);
    }
    #[test]
    fn empty() {
        let ltrans = FullTransducer::new(&[], (0, NUM_BASES, NUM_TRANSITIONS));
        let decoded = decode_full_transducer(&ltrans);
        assert_eq!(decoded.score, 0f64);
        assert_eq!(decoded.bases, vec![0]);
        assert!(decoded.transitions.is_empty());
    }
    // Log-transducer where the path `codes` (from base 0) has probability one half per event.
    fn planted(codes: &[usize]) -> FullTransducer {
        let mut values = vec![(0.5f64 / 99f64).ln(); codes.len() * SIZE];
        let mut base = 0;
        for (event, &code) in values.chunks_exact_mut(SIZE).zip(codes.iter()) {
            event[base * NUM_TRANSITIONS + code] = 0.5f64.ln();
            if code != STAY_TRANSITION {
                base = target_base(code) as usize;
            }
        }
        FullTransducer::new(&values, (codes.len(), NUM_BASES, NUM_TRANSITIONS))
    }
    #[test]
    fn planted_path() {
        // A, stay, C, G by skip 2, stay, T by skip 1, A by skip 3
        let codes = [0, 2, 7, 0, 4, 9];
        let decoded = decode_full_transducer(&planted(&codes));
        eprintln!("{:?}", decoded);
        assert_eq!(decoded.bases, vec![0, 0, 1, 2, 2, 3, 0]);
        assert_eq!(decoded.transitions, vec![0, 2, 7, 0, 4, 9]);
        assert_eq!(decoded.sequence(), b"CGTA".to_vec());
        assert_eq!(decoded.advanced(), 1 + 2 + 1 + 3);
        let answer = codes.len() as f64 * 0.5f64.ln();
        assert!((decoded.score - answer).abs() < 0.000001);
    }
    #[test]
    fn score_is_path_probability() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(3290);
        for len in 1..30 {
            let values: Vec<f64> = (0..len * SIZE)
                .map(|_| rng.gen_range(0.001f64..1f64).ln())
                .collect();
            let ltrans = FullTransducer::new(&values, (len, NUM_BASES, NUM_TRANSITIONS));
            let decoded = decode_full_transducer(&ltrans);
            assert_eq!(decoded.bases.len(), len + 1);
            let rescore: f64 = (0..len)
                .map(|i| {
                    let (pre, code) = (decoded.bases[i], decoded.transitions[i]);
                    let next = match code as usize {
                        STAY_TRANSITION => pre,
                        code => target_base(code),
                    };
                    assert_eq!(next, decoded.bases[i + 1]);
                    ltrans.get(i, pre as usize, code as usize)
                })
                .sum();
            assert!((rescore - decoded.score).abs() < 0.000001);
        }
    }
    #[test]
    #[should_panic]
    fn wrong_shape() {
        let ltrans = FullTransducer::new(&[0f64; 2 * 3 * 25], (2, 3, 25));
        decode_full_transducer(&ltrans);
    }
}
