//! Run-length text codec for filter bit arrays
//!
//! A bit array is written as a sequence of `value:run,` groups, e.g.
//! `0:12,1:3,0:49,` for 64 bits. Every run is flushed, the last one included.

use core::fmt::Write;

use crate::error::{Error, Result};

/// Encode a bit sequence as `value:run,` groups
pub fn encode_runs<I: IntoIterator<Item = bool>>(bits: I) -> String {
    let mut out = String::new();
    let mut current: Option<(bool, usize)> = None;

    for bit in bits {
        current = match current {
            Some((value, run)) if value == bit => Some((value, run + 1)),
            Some((value, run)) => {
                push_run(&mut out, value, run);
                Some((bit, 1))
            }
            None => Some((bit, 1)),
        };
    }
    if let Some((value, run)) = current {
        push_run(&mut out, value, run);
    }
    out
}

fn push_run(out: &mut String, value: bool, run: usize) {
    // writing to a String cannot fail
    let _ = write!(out, "{}:{},", u8::from(value), run);
}

/// Decode `value:run,` groups back into exactly `expected_len` bits
pub fn decode_runs(text: &str, expected_len: usize) -> Result<Vec<bool>> {
    let mut bits = Vec::with_capacity(expected_len);

    for group in text.trim().split(',').filter(|g| !g.is_empty()) {
        let (value, run) = group
            .split_once(':')
            .ok_or_else(|| Error::Decode(format!("missing ':' in group {:?}", group)))?;
        let value = match value.trim() {
            "0" => false,
            "1" => true,
            other => return Err(Error::Decode(format!("bit value {:?} is not 0 or 1", other))),
        };
        let run: usize = run
            .trim()
            .parse()
            .map_err(|_| Error::Decode(format!("invalid run length in group {:?}", group)))?;
        if run == 0 {
            return Err(Error::Decode(format!("zero-length run in group {:?}", group)));
        }
        if bits.len().checked_add(run).map_or(true, |end| end > expected_len) {
            return Err(Error::Decode(format!(
                "runs exceed filter size {}",
                expected_len
            )));
        }
        bits.extend(core::iter::repeat(value).take(run));
    }

    if bits.len() != expected_len {
        return Err(Error::Decode(format!(
            "runs cover {} bits, expected {}",
            bits.len(),
            expected_len
        )));
    }
    Ok(bits)
}
