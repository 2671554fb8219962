//! Thin readers and writers. Only support batch IO.
//!
//! Inputs are JSON arrays of records, each holding the network output of a read.
//! Outputs are FASTA records of called sequences.
use crate::states::{NUM_BASES, NUM_STATES, NUM_TRANSITIONS};
use crate::transducer::{FullTransducer, Transducer};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader};
use std::io::{BufWriter, Write};
pub type FASTARecord = (String, Vec<u8>);

/// Template and complement transducers of a read, to be aligned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignRecord {
    pub name: String,
    pub template: Vec<Vec<f64>>,
    pub complement: Vec<Vec<f64>>,
}

/// Full transducer of a read, to be decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeRecord {
    pub name: String,
    pub transducer: Vec<Vec<Vec<f64>>>,
}

fn invalid_data<E: Into<Box<dyn std::error::Error + Send + Sync>>>(why: E) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, why)
}

fn check_rows(name: &str, rows: &[Vec<f64>], min_prob: Option<f64>) -> std::io::Result<()> {
    if let Some(idx) = rows.iter().position(|row| row.len() != NUM_STATES) {
        let why = format!("{}: event {} has {} states", name, idx, rows[idx].len());
        return Err(invalid_data(why));
    }
    let is_valid = |x: &f64| match min_prob {
        Some(_) => (0f64..=1f64).contains(x),
        None => x.is_finite() && *x <= 0f64,
    };
    if let Some(idx) = rows.iter().position(|row| !row.iter().all(is_valid)) {
        let why = format!("{}: event {} has an invalid value {:?}", name, idx, rows[idx]);
        return Err(invalid_data(why));
    }
    if let Some(min_prob) = min_prob {
        let floored_sum = |row: &Vec<f64>| -> f64 { row.iter().map(|x| x.max(min_prob)).sum() };
        if let Some(idx) = rows.iter().position(|row| floored_sum(row) <= 0f64) {
            let why = format!("{}: event {} has no probability mass", name, idx);
            return Err(invalid_data(why));
        }
    }
    Ok(())
}

impl AlignRecord {
    /// Validate and convert into (template, complement) transducers.
    /// If `min_prob` is given, values are probabilities, floored at `min_prob`.
    /// Otherwise, they are finite log-probabilities.
    pub fn to_transducers(
        &self,
        min_prob: Option<f64>,
    ) -> std::io::Result<(Transducer, Transducer)> {
        if let Some(min_prob) = min_prob.filter(|p| !(0f64 < *p && *p < 1f64)) {
            let why = format!("{}: min_prob should be in (0,1), but {}", self.name, min_prob);
            return Err(invalid_data(why));
        }
        let template = format!("{}(template)", self.name);
        check_rows(&template, &self.template, min_prob)?;
        let complement = format!("{}(complement)", self.name);
        check_rows(&complement, &self.complement, min_prob)?;
        Ok(match min_prob {
            Some(min_prob) => (
                Transducer::from_probabilities(&self.template, min_prob),
                Transducer::from_probabilities(&self.complement, min_prob),
            ),
            None => (
                Transducer::from_rows(&self.template),
                Transducer::from_rows(&self.complement),
            ),
        })
    }
}

impl DecodeRecord {
    /// Validate and convert into a full transducer.
    pub fn to_full_transducer(&self) -> std::io::Result<FullTransducer> {
        let nev = self.transducer.len();
        let mut values = Vec::with_capacity(nev * NUM_BASES * NUM_TRANSITIONS);
        for (idx, event) in self.transducer.iter().enumerate() {
            let is_valid = event.len() == NUM_BASES
                && event.iter().all(|base| base.len() == NUM_TRANSITIONS);
            if !is_valid {
                let (name, shape) = (&self.name, (NUM_BASES, NUM_TRANSITIONS));
                let why = format!("{}: event {} is not of shape {:?}", name, idx, shape);
                return Err(invalid_data(why));
            }
            values.extend(event.iter().flat_map(|base| base.iter().copied()));
        }
        if values.iter().any(|x| x.is_nan() || 0f64 < *x) {
            let why = format!("{}: not log-probabilities", self.name);
            return Err(invalid_data(why));
        }
        Ok(FullTransducer::new(
            &values,
            (nev, NUM_BASES, NUM_TRANSITIONS),
        ))
    }
}

/// Read file or stdin, return parsed records.
pub fn read_records<P, T>(file: &Option<P>) -> std::io::Result<Vec<T>>
where
    P: AsRef<std::path::Path>,
    T: serde::de::DeserializeOwned,
{
    let stdin = std::io::stdin();
    let reader: Box<dyn BufRead> = match file {
        Some(file) => std::fs::File::open(file)
            .map(BufReader::new)
            .map(Box::new)?,
        None => {
            let lock = stdin.lock();
            Box::new(BufReader::new(lock))
        }
    };
    parse_records(reader)
}

/// Parse a JSON array of records.
pub fn parse_records<R, T>(rdr: R) -> std::io::Result<Vec<T>>
where
    R: BufRead,
    T: serde::de::DeserializeOwned,
{
    serde_json::from_reader(rdr).map_err(invalid_data)
}

/// Write records into the writer
pub fn write_fasta<W: Write>(
    wtr: &mut BufWriter<W>,
    records: &[FASTARecord],
) -> std::io::Result<()> {
    for (id, seq) in records {
        writeln!(wtr, ">{}\n{}", id, String::from_utf8_lossy(seq))?;
    }
    Ok(())
}
