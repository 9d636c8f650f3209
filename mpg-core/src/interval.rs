//! Interval partitioner: turns a set of timestamps into a week-aligned
//! boundary grid used to fibrate scoring nodes into epochs.

use std::fmt;

/// Length of one week in milliseconds.
const WEEK_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Left edge of one interval in the week-aligned partition.
///
/// The partition always has at least one interval, `[NegInf, +∞)`, which
/// degenerates to the single epoch produced for an empty timestamp set.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum Boundary {
    /// The implicit `-∞` left edge of the earliest interval.
    NegInf,
    /// A week-aligned instant (milliseconds since the Unix epoch).
    At(i64),
}

impl Boundary {
    /// Returns the canonical string used as an address part; stable across
    /// runs for the same boundary value.
    #[must_use]
    pub fn canonical(self) -> String {
        match self {
            Self::NegInf => "-inf".to_owned(),
            Self::At(ms) => ms.to_string(),
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// A sorted, week-aligned partition of the timeline, as produced by
/// [`partition`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Boundaries {
    /// Finite week-start instants `b1..bk`, ascending.
    finite: Vec<i64>,
}

impl Boundaries {
    /// Returns the left edges of every interval in the partition, starting
    /// with the implicit `-∞` edge. There is always at least one.
    #[must_use]
    pub fn intervals(&self) -> Vec<Boundary> {
        let mut out = Vec::with_capacity(self.finite.len() + 1);
        out.push(Boundary::NegInf);
        out.extend(self.finite.iter().copied().map(Boundary::At));
        out
    }

    /// Returns the interval containing `timestamp_ms`: the left edge of the
    /// unique half-open interval `[b, next)` with `b <= timestamp_ms`.
    #[must_use]
    pub fn interval_for(&self, timestamp_ms: i64) -> Boundary {
        let count = self.finite.partition_point(|&b| b <= timestamp_ms);
        if count == 0 {
            Boundary::NegInf
        } else {
            #[expect(
                clippy::indexing_slicing,
                reason = "partition_point bounds count to finite.len()"
            )]
            Boundary::At(self.finite[count - 1])
        }
    }
}

fn floor_div(value: i64, divisor: i64) -> i64 {
    value.div_euclid(divisor)
}

/// Partitions the given timestamps into a sorted, week-aligned boundary
/// sequence spanning their range.
///
/// When `timestamps` is empty the result has no finite boundaries, i.e. the
/// whole timeline is a single interval `[-∞, +∞)`.
#[must_use]
pub fn partition(timestamps: impl IntoIterator<Item = i64>) -> Boundaries {
    let mut min_ts = None;
    let mut max_ts = None;
    for ts in timestamps {
        min_ts = Some(min_ts.map_or(ts, |m: i64| m.min(ts)));
        max_ts = Some(max_ts.map_or(ts, |m: i64| m.max(ts)));
    }
    let (Some(min_ts), Some(max_ts)) = (min_ts, max_ts) else {
        return Boundaries { finite: Vec::new() };
    };

    let k_min = floor_div(min_ts, WEEK_MS);
    let k_max = if max_ts.rem_euclid(WEEK_MS) == 0 {
        max_ts.div_euclid(WEEK_MS)
    } else {
        floor_div(max_ts, WEEK_MS) + 1
    };

    let finite = (k_min..=k_max).map(|k| k * WEEK_MS).collect();
    Boundaries { finite }
}
