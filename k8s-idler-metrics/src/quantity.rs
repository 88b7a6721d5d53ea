//! CPU quantity normalization.
//!
//! Usage reported by `metrics.k8s.io` and limits declared on containers come
//! in different magnitudes (`250m`, `137000000n`, `4500u`). Everything with a
//! suffix is converted to millicores so that usage and limits can be compared.

use std::num::ParseIntError;

use super::*;

const NANOCORES_PER_MILLICORE: f64 = 1_000_000.0;
const MICROCORES_PER_MILLICORE: f64 = 1_000.0;

/// The numeric part of a CPU quantity is not a base-10 integer.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown unit of CPU in {quantity:?}: {source}")]
pub struct QuantityParseError {
    quantity: String,
    #[source]
    source: ParseIntError,
}

impl QuantityParseError {
    fn new(quantity: &str, source: ParseIntError) -> Self {
        let quantity = quantity.to_string();
        Self { quantity, source }
    }

    /// The offending quantity as it was reported.
    pub fn quantity(&self) -> &str {
        &self.quantity
    }
}

pub trait QuantityExt {
    /// CPU value in millicores.
    ///
    /// `m`, `u` and `n` suffixes are scaled to millicores. A bare integer is
    /// returned as-is, i.e. in whole cores and NOT scaled to millicores.
    ///
    /// # Examples
    ///
    /// ```
    /// use k8s_idler_metrics::QuantityExt as _;
    ///
    /// assert_eq!("250m".to_millicores(), Ok(250.0));
    /// assert_eq!("100000000n".to_millicores(), Ok(100.0));
    /// assert_eq!("2".to_millicores(), Ok(2.0));
    /// ```
    fn to_millicores(&self) -> Result<f64, QuantityParseError>;
}

impl QuantityExt for str {
    fn to_millicores(&self) -> Result<f64, QuantityParseError> {
        let (digits, divisor) = if let Some(digits) = self.strip_suffix('m') {
            (digits, 1.0)
        } else if let Some(digits) = self.strip_suffix('n') {
            (digits, NANOCORES_PER_MILLICORE)
        } else if let Some(digits) = self.strip_suffix('u') {
            (digits, MICROCORES_PER_MILLICORE)
        } else {
            (self, 1.0)
        };

        digits
            .parse::<i64>()
            .map(|value| value as f64 / divisor)
            .map_err(|source| QuantityParseError::new(self, source))
    }
}

impl QuantityExt for resource::Quantity {
    fn to_millicores(&self) -> Result<f64, QuantityParseError> {
        self.0.as_str().to_millicores()
    }
}
