/*! One-pass weighted mean and sample standard deviation.

Observations are folded into a [`WeightedVariance`] as they arrive; nothing
is buffered.  The update is Pebay's weighted form of Welford's algorithm,
so it stays accurate for data with a large mean and a small spread, where
the textbook `E[x²] - E[x]²` formula falls apart.

## Example

```
# use weighted_variance::*;
let mut acc = WeightedVariance::new();
acc.add_observation(1., 3.);
acc.add_observation(5., 1.);
assert_eq!(acc.mean(), 2.);
assert_eq!(acc.sample_std_dev(), 2.);

// Same thing, unweighted
let (mean, sd) = mean_and_sample_std_dev(vec![1., 1., 1., 5.]);
assert_eq!(mean, 2.);
assert_eq!(sd, 2.);
```

## Degenerate input

Nothing here returns an error unless you ask for one.  With a total weight
of 1 or less the sample standard deviation is NaN or infinite, and a NaN
value or weight turns everything NaN.  Use
[`WeightedVariance::try_add_observation`] to reject bad input up front.

*/

mod stats;

pub use stats::*;

/// The mean and sample standard deviation of `values`, each given weight 1.
///
/// Needs at least two values for the standard deviation to be finite.
pub fn mean_and_sample_std_dev(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let acc = values.into_iter().collect::<WeightedVariance>();
    (acc.mean(), acc.sample_std_dev())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    NonFiniteValue(f64),
    NonFiniteWeight(f64),
    NegativeWeight(f64),
}

use std::fmt;
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NonFiniteValue(x) => write!(f, "Observation is not finite: {}", x),
            Error::NonFiniteWeight(w) => write!(f, "Weight is not finite: {}", w),
            Error::NegativeWeight(w) => write!(f, "Weight is negative: {}", w),
        }
    }
}
impl std::error::Error for Error {}
