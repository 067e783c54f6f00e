use crate::Error;

/// A running weighted mean and variance.
///
/// Holds the sum of the weights seen so far, the weighted mean, and the
/// weighted sum of squared deviations from the mean.  Those three numbers
/// are the entire state: nothing else is needed to resume accumulating.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightedVariance {
    /// the sum of all weights seen so far
    total_weight: f64,
    /// the weighted mean of the entire dataset
    mean: f64,
    /// the weighted squared distance from the mean
    sum_sq_dev: f64,
}

impl WeightedVariance {
    pub fn new() -> WeightedVariance {
        WeightedVariance::default()
    }

    /// Rebuild an accumulator from the values returned by `into_parts`.
    pub fn from_parts(total_weight: f64, mean: f64, sum_sq_dev: f64) -> WeightedVariance {
        WeightedVariance {
            total_weight,
            mean,
            sum_sq_dev,
        }
    }

    /// `(total_weight, mean, sum_sq_dev)`
    pub fn into_parts(self) -> (f64, f64, f64) {
        (self.total_weight, self.mean, self.sum_sq_dev)
    }

    /// Add an observation with the given weight.
    ///
    /// This is Pebay's weighted generalisation of Welford's online
    /// algorithm.  Weights are not checked: a negative or non-finite
    /// weight (or value) will poison the statistics with NaNs.  Use
    /// `try_add_observation` if that matters to you.
    ///
    /// A weight of exactly zero is ignored.
    pub fn add_observation(&mut self, value: f64, weight: f64) {
        if weight == 0. {
            return;
        }
        self.total_weight += weight;
        let old_mean = self.mean;
        self.mean = old_mean + weight * (value - old_mean) / self.total_weight;
        // Uses both the old and the new mean; don't collapse this into a square
        self.sum_sq_dev += weight * (value - old_mean) * (value - self.mean);
    }

    /// Add an observation with weight 1
    pub fn update(&mut self, value: f64) {
        self.add_observation(value, 1.);
    }

    /// Like `add_observation`, but refuses non-finite inputs and negative
    /// weights.  The accumulator is left untouched on error.
    pub fn try_add_observation(&mut self, value: f64, weight: f64) -> Result<(), Error> {
        if !value.is_finite() {
            return Err(Error::NonFiniteValue(value));
        }
        if !weight.is_finite() {
            return Err(Error::NonFiniteWeight(weight));
        }
        if weight < 0. {
            return Err(Error::NegativeWeight(weight));
        }
        self.add_observation(value, weight);
        Ok(())
    }

    pub fn is_empty(self) -> bool {
        self.total_weight == 0.
    }

    pub fn total_weight(self) -> f64 {
        self.total_weight
    }

    /// The weighted mean.  Zero if nothing has been observed.
    pub fn mean(self) -> f64 {
        self.mean
    }

    pub fn sum_squared_deviation(self) -> f64 {
        self.sum_sq_dev
    }

    /// The weighted population variance
    pub fn weighted_variance(self) -> f64 {
        self.sum_sq_dev / self.total_weight
    }

    /// The weighted variance with Bessel's correction applied.
    ///
    /// Only meaningful once the total weight exceeds 1; below that you get
    /// NaN or infinity.
    pub fn sample_variance(self) -> f64 {
        let w = self.total_weight;
        self.weighted_variance() * w / (w - 1.)
    }

    pub fn sample_std_dev(self) -> f64 {
        self.sample_variance().sqrt()
    }
}

impl Extend<f64> for WeightedVariance {
    fn extend<T: IntoIterator<Item = f64>>(&mut self, iter: T) {
        for x in iter {
            self.update(x);
        }
    }
}

impl Extend<(f64, f64)> for WeightedVariance {
    fn extend<T: IntoIterator<Item = (f64, f64)>>(&mut self, iter: T) {
        for (x, w) in iter {
            self.add_observation(x, w);
        }
    }
}

impl FromIterator<f64> for WeightedVariance {
    fn from_iter<T: IntoIterator<Item = f64>>(iter: T) -> WeightedVariance {
        let mut acc = WeightedVariance::new();
        acc.extend(iter);
        acc
    }
}

impl FromIterator<(f64, f64)> for WeightedVariance {
    fn from_iter<T: IntoIterator<Item = (f64, f64)>>(iter: T) -> WeightedVariance {
        let mut acc = WeightedVariance::new();
        acc.extend(iter);
        acc
    }
}

/// A snapshot of a `WeightedVariance`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Summary {
    /// The sum of the weights
    pub total_weight: f64,
    /// The weighted mean
    pub mean: f64,
    /// The weighted sample standard deviation
    pub std_dev: f64,
}

impl From<WeightedVariance> for Summary {
    fn from(x: WeightedVariance) -> Summary {
        Summary {
            total_weight: x.total_weight(),
            mean: x.mean(),
            std_dev: x.sample_std_dev(),
        }
    }
}
