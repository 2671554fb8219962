//! State alphabets shared by the aligner and the decoders.
//!
//! A transducer row holds five log-probabilities: the first four are "move and emit
//! a base" (A, C, G, T in this order), the last one is "stay".
//! The pair automaton used to align two transducers has five states as well,
//! see [`PairState`].

/// Number of states in a row of a (partial) transducer.
pub const NUM_STATES: usize = 5;
/// Number of bases.
pub const NUM_BASES: usize = 4;
/// Index of the stay state. It is also the value of a "stay" call.
pub const STAY: usize = 4;
/// Nucleotides, indexed by base code.
pub const BASES: &[u8; NUM_BASES] = b"ACGT";
/// Column permutation applied when a transducer is reverse complemented.
/// A<->T, C<->G, and the stay is kept.
pub const REV_COMP: [usize; NUM_STATES] = [3, 2, 1, 0, 4];

/// Number of transition codes in a full transducer.
pub const NUM_TRANSITIONS: usize = 25;
/// Transition code for a stay in a full transducer.
pub const STAY_TRANSITION: usize = 0;

// The first four entries would be the stays, so the codes are offset by 3.
const fn state_to_base() -> [u8; 28] {
    let mut slots = [0; 28];
    let mut i = 0;
    while i < 28 {
        slots[i] = (i % NUM_BASES) as u8;
        i += 1;
    }
    slots
}
const STATE_TO_BASE: [u8; 28] = state_to_base();

/// The base reached by the transition `code` (1..25) of a full transducer.
pub const fn target_base(code: usize) -> u8 {
    STATE_TO_BASE[code + 3]
}

/// The number of positions advanced by the transition `code` of a full transducer.
/// Zero for a stay.
pub const fn skip_distance(code: usize) -> usize {
    if code == STAY_TRANSITION {
        0
    } else {
        (code - 1) / NUM_BASES + 1
    }
}

/// How the two transducers advance in a step of the pair automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Both transducers consume an event.
    Diagonal,
    /// Only the first transducer consumes an event.
    Vertical,
    /// Only the second transducer consumes an event.
    Horizontal,
}

impl Move {
    /// (first, second) consumed.
    pub fn offset(self) -> (usize, usize) {
        match self {
            Move::Diagonal => (1, 1),
            Move::Vertical => (1, 0),
            Move::Horizontal => (0, 1),
        }
    }
}

/// States of the pair automaton aligning two transducers.
/// The discriminant is the index used in DP tables and in serialized paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairState {
    /// `XX`: both transducers move or stay.
    Diagonal = 0,
    /// `s-`: the first transducer stays while the second skips.
    FirstStayGap = 1,
    /// `X-`: the first transducer moves while the second skips.
    FirstMoveGap = 2,
    /// `-s`: the second transducer stays while the first skips.
    SecondStayGap = 3,
    /// `-X`: the second transducer moves while the first skips.
    SecondMoveGap = 4,
}

const MOVES: [Move; NUM_STATES] = [
    Move::Diagonal,
    Move::Vertical,
    Move::Vertical,
    Move::Horizontal,
    Move::Horizontal,
];

impl PairState {
    pub const ALL: [PairState; NUM_STATES] = [
        PairState::Diagonal,
        PairState::FirstStayGap,
        PairState::FirstMoveGap,
        PairState::SecondStayGap,
        PairState::SecondMoveGap,
    ];
    pub fn index(self) -> usize {
        self as usize
    }
    pub fn movement(self) -> Move {
        MOVES[self.index()]
    }
    /// Whether a step in this state is a stay of one of the transducers.
    pub fn is_stay(self) -> bool {
        matches!(self, PairState::FirstStayGap | PairState::SecondStayGap)
    }
}

impl std::convert::TryFrom<u8> for PairState {
    type Error = u8;
    fn try_from(val: u8) -> Result<PairState, u8> {
        PairState::ALL.get(val as usize).copied().ok_or(val)
    }
}

impl std::convert::From<PairState> for u8 {
    fn from(state: PairState) -> u8 {
        state as u8
    }
}

impl std::fmt::Display for PairState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            PairState::Diagonal => "XX",
            PairState::FirstStayGap => "s-",
            PairState::FirstMoveGap => "X-",
            PairState::SecondStayGap => "-s",
            PairState::SecondMoveGap => "-X",
        };
        f.write_str(code)
    }
}

/// Index of the first maximum. NaN never wins.
pub fn argmax(xs: &[f64]) -> usize {
    let mut best = 0;
    for (i, &x) in xs.iter().enumerate().skip(1) {
        if xs[best] < x {
            best = i;
        }
    }
    best
}
