//! Turning clusters into device counts
//!
//! Each cluster is matched to the nearest known device model in a
//! [`ReferenceTable`]; the model's probe rate tells how many frames one device
//! would have produced during the capture, and the [`RateCounter`] divides.
//!
//! # Example
//!
//! ```
//! use probecount::counting::{CountingMethod, RateCounter};
//!
//! let counter = RateCounter::new(CountingMethod::Advanced, 100.0, 1);
//!
//! // 600 frames in 30 s from a model probing 5 times a second
//! assert_eq!(counter.estimate_with_rate(600, 10, 5.0, 30.0), 4);
//! ```

mod rate;
mod reference;

pub use rate::{CountingMethod, RateCounter};
pub use reference::{RateVariant, ReferenceDeviceProfile, ReferenceTable};
