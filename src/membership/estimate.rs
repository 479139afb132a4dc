//! Fill-ratio estimators over one or more filters

use super::MembershipStore;
use crate::error::{Error, Result};

/// `-(n/k) * ln(1 - m/n)` for a filter with `m` set bits
pub(crate) fn cardinality_from_fill(n: usize, k: usize, m: f64) -> Result<f64> {
    if m <= 0.0 {
        return Ok(0.0);
    }

    let n = n as f64;
    let ln_arg = 1.0 - m / n;
    if ln_arg <= 0.0 {
        return Err(Error::NumericalInstability(format!(
            "filter saturated: {} of {} bits set",
            m, n
        )));
    }
    Ok(-(n / k as f64) * ln_arg.ln())
}

/// Estimate the cardinality of a filter
///
/// Free-function form of [`MembershipStore::estimate_cardinality`].
pub fn estimate_cardinality(store: &MembershipStore) -> Result<f64> {
    store.estimate_cardinality()
}

/// Estimate `|A ∩ B|` from two filters and their intersection filter
///
/// With `m1`, `m2`, `mi` the set-bit counts and `n` the shared size:
///
/// ```text
/// x = n - (mi*n - m1*m2) / (n - m1 - m2 + mi)
/// |A ∩ B| ≈ (ln x - ln n) / (k * ln(1 - 1/n))
/// ```
///
/// `x / n` plays the role of the unset-bit fraction in the single-filter
/// estimator. A zero denominator, `x <= 0` or `n <= 1` is reported as
/// [`Error::NumericalInstability`].
pub fn estimate_intersection_cardinality(
    store1: &MembershipStore,
    store2: &MembershipStore,
    intersection: &MembershipStore,
) -> Result<f64> {
    store1.ensure_compatible(store2)?;
    store1.ensure_compatible(intersection)?;

    let n = intersection.n() as f64;
    let k = intersection.k() as f64;
    let m1 = store1.m() as f64;
    let m2 = store2.m() as f64;
    let mi = intersection.m() as f64;

    if n <= 1.0 {
        return Err(Error::NumericalInstability(
            "filter of size 1 has no intersection estimate".into(),
        ));
    }

    let num = mi * n - m1 * m2;
    let den = n - m1 - m2 + mi;
    if den == 0.0 {
        return Err(Error::NumericalInstability(format!(
            "zero denominator (m1={}, m2={}, mi={}, n={})",
            m1, m2, mi, n
        )));
    }

    let x = n - num / den;
    if x <= 0.0 {
        return Err(Error::NumericalInstability(format!(
            "non-positive log argument {}",
            x
        )));
    }

    Ok((x.ln() - n.ln()) / (k * (1.0 - 1.0 / n).ln()))
}
