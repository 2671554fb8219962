//! Alignment and decoding of the per-event posteriors ("transducers") of a nanopore basecaller.
//!
//! - [`pair_align::align`] aligns two partial transducers, e.g., the template and the complement
//!   strand of a read, and [`call::alignment_to_call`] turns the alignment into calls.
//! - [`viterbi::decode_full_transducer`] decodes a full transducer into a base path.
#[macro_use]
extern crate log;
pub mod call;
pub mod dptable;
pub mod gen_transducer;
pub mod io;
pub mod pair_align;
pub mod states;
pub mod transducer;
pub mod viterbi;
pub use call::{alignment_to_call, calls_to_sequence};
pub use pair_align::{align, AlignConfig};
pub use transducer::{FullTransducer, Transducer};
pub use viterbi::{decode_full_transducer, DecodedPath};
use rayon::prelude::*;
use states::PairState;

/// A call from a pair of transducers.
#[derive(Debug, Clone)]
pub struct PairCall {
    /// Alignment score.
    pub score: f64,
    /// Alignment path.
    pub path: Vec<PairState>,
    /// Calls, one for each step of the path.
    pub calls: Vec<u8>,
    /// Called sequence.
    pub sequence: Vec<u8>,
}

/// Align the template and the complement transducers, then call the sequence along the alignment.
pub fn basecall_pair(
    template: &Transducer,
    complement: &Transducer,
    config: &AlignConfig,
) -> PairCall {
    let (score, path) = align(template, complement, config);
    let calls = alignment_to_call(template, complement, &path, config.reverse_first);
    let sequence = calls_to_sequence(&calls);
    PairCall {
        score,
        path,
        calls,
        sequence,
    }
}

/// Call each record in parallel. A record which fails to be converted
/// into transducers gets an error, not affecting the others.
/// If `min_prob` is given, the records hold probabilities instead of log-probabilities.
pub fn basecall_records(
    records: &[io::AlignRecord],
    config: &AlignConfig,
    min_prob: Option<f64>,
) -> Vec<std::io::Result<PairCall>> {
    records
        .par_iter()
        .map(|record| {
            let (template, complement) = record.to_transducers(min_prob)?;
            debug!(
                "CALL\t{}\t{}\t{}",
                record.name,
                template.len(),
                complement.len()
            );
            Ok(basecall_pair(&template, &complement, config))
        })
        .collect()
}

/// Decode each record in parallel. A malformed record gets an error, not affecting the others.
pub fn decode_records(records: &[io::DecodeRecord]) -> Vec<std::io::Result<DecodedPath>> {
    records
        .par_iter()
        .map(|record| {
            let ltrans = record.to_full_transducer()?;
            Ok(decode_full_transducer(&ltrans))
        })
        .collect()
}
