use crate::split::error::SplitError;
use bigdecimal::{BigDecimal, RoundingMode};
use model::pagination::id_range::IdRange;
use std::{num::NonZeroU64, str::FromStr};
use tracing::debug;

/// Significant digits used by default; covers 38-digit NUMBER identifiers.
pub const DEFAULT_PRECISION: u64 = 38;

/// Upper limit for configurable precision. Division is exact up to this many digits.
pub const MAX_PRECISION: u64 = 100;

/// Splits a numeric key range into `parallelism` contiguous sub-ranges.
///
/// Arithmetic is decimal throughout. Inputs are never routed through a binary
/// float, so 38-digit identifiers keep every digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSplitter {
    precision: NonZeroU64,
}

impl RangeSplitter {
    pub fn new(precision: NonZeroU64) -> Result<Self, SplitError> {
        if precision.get() > MAX_PRECISION {
            return Err(SplitError::InvalidPrecision {
                got: precision.get(),
                max: MAX_PRECISION,
            });
        }
        Ok(Self { precision })
    }

    pub fn with_precision(digits: u64) -> Result<Self, SplitError> {
        let precision = NonZeroU64::new(digits).ok_or(SplitError::InvalidPrecision {
            got: digits,
            max: MAX_PRECISION,
        })?;
        Self::new(precision)
    }

    pub fn precision(&self) -> u64 {
        self.precision.get()
    }

    /// Returns exactly `parallelism` ranges covering `[id_min, id_max + 1)`.
    ///
    /// Sub-range `k` starts at `id_min + k * width` where
    /// `width = (id_max - id_min + 1) / parallelism`. Each upper bound is the next
    /// range's lower bound and the last upper bound is exactly `id_max + 1`.
    /// `id_min <= id_max` is the caller's responsibility.
    ///
    /// # Panics
    ///
    /// Panics if `parallelism` is zero.
    pub fn split(
        &self,
        id_min: &BigDecimal,
        id_max: &BigDecimal,
        parallelism: usize,
    ) -> Vec<IdRange> {
        assert!(parallelism > 0, "parallelism must be a positive integer");

        let total = id_max - id_min + BigDecimal::from(1u64);
        let end = id_min + &total;
        let divisor = BigDecimal::from(parallelism as u64);

        // Both outer bounds are kept exact, so interior bounds are never rounded
        // more coarsely than the inputs. Rounding is monotonic, which keeps every
        // interior bound inside [id_min, end].
        let working = self.working_precision(id_min, &end);

        let boundary = |k: usize| -> BigDecimal {
            if k == parallelism {
                return end.clone();
            }
            // total * k / N rather than width * k keeps rounding to one step per bound.
            let scaled = &total * &BigDecimal::from(k as u64);
            let offset = &scaled / &divisor;
            round_to_precision(id_min + &offset, working)
        };

        let bounds: Vec<BigDecimal> = (0..=parallelism)
            .map(|k| if k == 0 { id_min.clone() } else { boundary(k) })
            .collect();

        let ranges: Vec<IdRange> = bounds
            .windows(2)
            .map(|pair| IdRange::new(pair[0].clone(), pair[1].clone()))
            .collect();

        debug!(
            id_min = %id_min,
            id_max = %id_max,
            parallelism,
            precision = working.get(),
            "Split id range"
        );

        ranges
    }

    /// The configured precision, widened to hold every digit of either bound.
    fn working_precision(&self, id_min: &BigDecimal, end: &BigDecimal) -> NonZeroU64 {
        let needed = id_min.digits().max(end.digits());
        if needed > self.precision.get() {
            debug!(
                configured = self.precision.get(),
                needed, "Widening precision to cover range bounds"
            );
        }
        self.precision.max(NonZeroU64::new(needed).unwrap_or(NonZeroU64::MIN))
    }

    /// Like [`RangeSplitter::split`], normalising textual bounds first.
    pub fn split_str(
        &self,
        id_min: &str,
        id_max: &str,
        parallelism: usize,
    ) -> Result<Vec<IdRange>, SplitError> {
        let min = parse_bound(id_min)?;
        let max = parse_bound(id_max)?;
        Ok(self.split(&min, &max, parallelism))
    }
}

impl Default for RangeSplitter {
    fn default() -> Self {
        Self {
            precision: NonZeroU64::new(DEFAULT_PRECISION).unwrap_or(NonZeroU64::MIN),
        }
    }
}

/// Rounds only when the value carries more significant digits than allowed,
/// so exact bounds keep their natural scale.
fn round_to_precision(value: BigDecimal, precision: NonZeroU64) -> BigDecimal {
    if value.digits() > precision.get() {
        value.with_precision_round(precision, RoundingMode::HalfEven)
    } else {
        value
    }
}

/// Splits with the default precision.
pub fn split_range(id_min: &BigDecimal, id_max: &BigDecimal, parallelism: usize) -> Vec<IdRange> {
    RangeSplitter::default().split(id_min, id_max, parallelism)
}

/// Parses an integer or decimal formatted bound straight into a decimal.
pub fn parse_bound(value: &str) -> Result<BigDecimal, SplitError> {
    BigDecimal::from_str(value.trim()).map_err(|e| SplitError::InvalidBound {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn pairs(ranges: &[IdRange]) -> Vec<(BigDecimal, BigDecimal)> {
        ranges
            .iter()
            .map(|r| (r.lower.clone(), r.upper.clone()))
            .collect()
    }

    fn assert_covers(ranges: &[IdRange], min: &BigDecimal, max: &BigDecimal) {
        assert_eq!(&ranges[0].lower, min);
        assert_eq!(ranges[ranges.len() - 1].upper, max + &BigDecimal::from(1));
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].upper, pair[1].lower);
            assert!(pair[0].lower <= pair[1].lower);
        }
    }

    #[test]
    fn splits_one_to_ten_in_two() {
        let ranges = split_range(&dec("1"), &dec("10"), 2);
        assert_eq!(
            pairs(&ranges),
            vec![(dec("1"), dec("6")), (dec("6"), dec("11"))]
        );
    }

    #[test]
    fn non_integral_width_keeps_exact_coverage() {
        let min = dec("1");
        let max = dec("10");
        let ranges = split_range(&min, &max, 3);

        assert_eq!(ranges.len(), 3);
        assert_covers(&ranges, &min, &max);
        assert!(ranges[0].upper > dec("4.3333") && ranges[0].upper < dec("4.3334"));

        let total: BigDecimal = ranges.iter().map(|r| r.width()).sum();
        assert_eq!(total, dec("10"));
    }

    #[test]
    fn parallelism_larger_than_range() {
        let min = dec("5");
        let max = dec("6");
        let ranges = split_range(&min, &max, 4);

        assert_eq!(
            pairs(&ranges),
            vec![
                (dec("5"), dec("5.5")),
                (dec("5.5"), dec("6")),
                (dec("6"), dec("6.5")),
                (dec("6.5"), dec("7")),
            ]
        );
    }

    #[test]
    fn single_worker_gets_whole_range() {
        let ranges = split_range(&dec("-20"), &dec("20"), 1);
        assert_eq!(pairs(&ranges), vec![(dec("-20"), dec("21"))]);
    }

    #[test]
    fn thirty_eight_digit_identifiers_do_not_drift() {
        let min = dec("12345678901234567890123456789012340000");
        let max = dec("12345678901234567890123456789012349999");
        let ranges = split_range(&min, &max, 4);

        assert_covers(&ranges, &min, &max);
        assert_eq!(
            ranges[1].lower,
            dec("12345678901234567890123456789012342500")
        );
        for r in &ranges {
            assert_eq!(r.width(), dec("2500"));
        }

        let total: BigDecimal = ranges.iter().map(|r| r.width()).sum();
        assert_eq!(total, &max - &min + BigDecimal::from(1));
    }

    #[test]
    fn bounds_wider_than_precision_stay_ordered() {
        let min = dec("10000000000000000000000000000000000000001");
        let max = dec("10000000000000000000000000000000000000010");
        let ranges = split_range(&min, &max, 2);

        assert_covers(&ranges, &min, &max);
        assert_eq!(
            pairs(&ranges),
            vec![
                (min.clone(), dec("10000000000000000000000000000000000000006")),
                (
                    dec("10000000000000000000000000000000000000006"),
                    dec("10000000000000000000000000000000000000011")
                ),
            ]
        );
        for r in &ranges {
            assert!(r.lower < r.upper);
        }

        // A precision below the bounds' own digits is widened, not applied.
        let narrow = RangeSplitter::with_precision(5).unwrap();
        let ranges = narrow.split(&dec("1234567"), &dec("1234576"), 3);
        assert_covers(&ranges, &dec("1234567"), &dec("1234576"));
        assert!(ranges.iter().all(|r| r.lower < r.upper));
    }

    #[test]
    fn every_integer_key_falls_in_exactly_one_range() {
        let min = dec("3");
        let max = dec("40");
        let ranges = split_range(&min, &max, 7);

        for key in 3..=40 {
            let key = BigDecimal::from(key);
            let hits = ranges.iter().filter(|r| r.contains(&key)).count();
            assert_eq!(hits, 1, "key {key} matched {hits} ranges");
        }
    }

    #[test]
    fn textual_bounds_are_parsed_as_decimals() {
        let splitter = RangeSplitter::with_precision(50).unwrap();
        let ranges = splitter
            .split_str(
                "100000000000000000000000000000000000000000001",
                "100000000000000000000000000000000000000000010",
                2,
            )
            .unwrap();
        assert_eq!(
            ranges[1].lower,
            dec("100000000000000000000000000000000000000000006")
        );

        assert!(matches!(
            splitter.split_str("abc", "10", 2),
            Err(SplitError::InvalidBound { .. })
        ));
    }

    #[test]
    fn rejects_out_of_bounds_precision() {
        assert!(RangeSplitter::with_precision(0).is_err());
        assert!(RangeSplitter::with_precision(MAX_PRECISION + 1).is_err());
        assert_eq!(RangeSplitter::default().precision(), DEFAULT_PRECISION);
    }

    #[test]
    #[should_panic(expected = "parallelism must be a positive integer")]
    fn zero_parallelism_is_a_programming_error() {
        split_range(&dec("1"), &dec("10"), 0);
    }
}
