//! Donation time series and linear forecast.
//!
//! Donations are grouped into contiguous half-open buckets
//! `[start, end)` of `interval_days` days, starting at the earliest
//! donation. The bucket count is computed from the date range up front and
//! capped at `max_buckets`; donations past the last bucket of a capped
//! series are reported as overflow instead of being bucketed.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::Donation;

/// Default bucket length.
pub const DEFAULT_INTERVAL_DAYS: u32 = 1;

/// Default safety cap on generated buckets.
pub const DEFAULT_MAX_BUCKETS: usize = 1000;

/// Longest accepted bucket length (100 years).
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// One fixed-length interval of the series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesBucket {
    /// Position of the bucket in the series.
    pub index: usize,
    /// Inclusive interval start.
    pub start: DateTime<Utc>,
    /// Exclusive interval end.
    pub end: DateTime<Utc>,
    /// Sum of donations inside the interval.
    pub daily_amount: f64,
    /// Number of donations inside the interval.
    pub daily_count: u64,
    /// Running total up to and including this bucket.
    pub cumulative_amount: f64,
    /// Running count up to and including this bucket.
    pub cumulative_count: u64,
}

/// Bucketed donation history.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeries {
    /// Bucket length in days.
    pub interval_days: u32,
    /// Contiguous, non-overlapping buckets ordered by start.
    pub buckets: Vec<TimeSeriesBucket>,
    /// `true` when the date range needed more than `max_buckets` buckets.
    pub truncated: bool,
    /// Amount of donations that fell after the last bucket of a capped series.
    pub overflow_amount: f64,
    /// Number of such donations.
    pub overflow_count: u64,
    /// Amount of donations that carry no timestamp.
    pub untimed_amount: f64,
    /// Number of such donations.
    pub untimed_count: u64,
}

impl TimeSeries {
    /// Sum of every bucket's amount.
    #[must_use]
    pub fn bucketed_amount(&self) -> f64 {
        self.buckets.last().map_or(0.0, |b| b.cumulative_amount)
    }
}

/// Buckets `donations` into `interval_days`-long intervals.
///
/// `interval_days` is clamped to `1..=MAX_INTERVAL_DAYS` and `max_buckets`
/// to at least one. Donations are stably sorted by timestamp first, so
/// equal timestamps keep their input order.
#[must_use]
pub fn build_time_series(donations: &[Donation], interval_days: u32, max_buckets: usize) -> TimeSeries {
    let interval_days = interval_days.clamp(1, MAX_INTERVAL_DAYS);
    let mut series = TimeSeries {
        interval_days,
        ..TimeSeries::default()
    };

    let mut timed: Vec<(DateTime<Utc>, f64)> = Vec::with_capacity(donations.len());
    for donation in donations {
        match donation.timestamp {
            Some(ts) => timed.push((ts, donation.amount)),
            None => {
                series.untimed_amount += donation.amount;
                series.untimed_count += 1;
            }
        }
    }
    timed.sort_by_key(|(ts, _)| *ts);

    let (Some((first, _)), Some((last, _))) = (timed.first(), timed.last()) else {
        return series;
    };
    let (first, last) = (*first, *last);

    let interval = Duration::days(i64::from(interval_days));
    let interval_ms = interval.num_milliseconds();
    let span_ms = (last - first).num_milliseconds();
    let needed = usize::try_from(span_ms / interval_ms).unwrap_or(usize::MAX).saturating_add(1);
    let count = needed.min(max_buckets.max(1));
    series.truncated = needed > count;
    if series.truncated {
        tracing::warn!(needed, cap = count, "time series truncated at bucket cap");
    }

    let mut start = first;
    for index in 0..count {
        let Some(end) = start.checked_add_signed(interval) else {
            series.truncated = true;
            break;
        };
        series.buckets.push(TimeSeriesBucket {
            index,
            start,
            end,
            daily_amount: 0.0,
            daily_count: 0,
            cumulative_amount: 0.0,
            cumulative_count: 0,
        });
        start = end;
    }

    // Boundaries are evenly spaced, so the owning bucket is a division away.
    for (ts, amount) in &timed {
        let offset = (*ts - first).num_milliseconds() / interval_ms;
        let bucket = usize::try_from(offset)
            .ok()
            .and_then(|i| series.buckets.get_mut(i));
        match bucket {
            Some(bucket) => {
                bucket.daily_amount += amount;
                bucket.daily_count += 1;
            }
            None => {
                series.overflow_amount += amount;
                series.overflow_count += 1;
            }
        }
    }

    let (mut amount, mut count) = (0.0, 0);
    for bucket in &mut series.buckets {
        amount += bucket.daily_amount;
        count += bucket.daily_count;
        bucket.cumulative_amount = amount;
        bucket.cumulative_count = count;
    }
    series
}

/// Least-squares line of bucket amount against bucket index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    /// Change in amount per bucket.
    pub slope: f64,
    /// Fitted amount at index 0.
    pub intercept: f64,
    /// Historical mean amount per bucket.
    pub average: f64,
    /// `true` when fewer than two buckets exist (no x variance).
    pub degenerate: bool,
}

/// One projected bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    /// Position continuing the historical indices.
    pub index: usize,
    /// Inclusive interval start.
    pub start: DateTime<Utc>,
    /// Exclusive interval end.
    pub end: DateTime<Utc>,
    /// Projected amount, never negative.
    pub daily_amount: f64,
    /// Running total continuing from the last historical bucket.
    pub cumulative_amount: f64,
    /// `true` when the historical average replaced the trend value.
    pub fallback: bool,
}

/// Projection of a series beyond its last bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    /// Fitted trend.
    pub trend: Trend,
    /// Projected buckets.
    pub points: Vec<ForecastPoint>,
}

/// Fits an ordinary least-squares line through `(index, daily_amount)`.
#[must_use]
pub fn fit_trend(buckets: &[TimeSeriesBucket]) -> Trend {
    #[allow(clippy::cast_precision_loss)]
    let n = buckets.len() as f64;
    if buckets.is_empty() {
        return Trend {
            slope: 0.0,
            intercept: 0.0,
            average: 0.0,
            degenerate: true,
        };
    }
    let average = buckets.iter().map(|b| b.daily_amount).sum::<f64>() / n;
    let mean_x = (n - 1.0) / 2.0;

    let (mut sxx, mut sxy) = (0.0, 0.0);
    for (i, bucket) in buckets.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let dx = i as f64 - mean_x;
        sxx += dx * dx;
        sxy += dx * (bucket.daily_amount - average);
    }
    if buckets.len() < 2 || sxx == 0.0 {
        return Trend {
            slope: 0.0,
            intercept: average,
            average,
            degenerate: true,
        };
    }
    let slope = sxy / sxx;
    Trend {
        slope,
        intercept: average - slope * mean_x,
        average,
        degenerate: false,
    }
}

/// Projects `forecast_days` buckets past the end of `buckets`.
///
/// A negative, non-finite or degenerate projection is replaced by the
/// historical average. An empty history yields no points.
#[must_use]
pub fn forecast(buckets: &[TimeSeriesBucket], forecast_days: usize) -> Forecast {
    let trend = fit_trend(buckets);
    let Some(last) = buckets.last() else {
        return Forecast {
            trend,
            points: Vec::new(),
        };
    };
    let interval = last.end - last.start;

    let mut points = Vec::with_capacity(forecast_days);
    let mut cumulative = last.cumulative_amount;
    let mut start = last.end;
    for step in 0..forecast_days {
        let Some(end) = start.checked_add_signed(interval) else {
            break;
        };
        let index = buckets.len() + step;
        #[allow(clippy::cast_precision_loss)]
        let projected = trend.intercept + trend.slope * index as f64;
        let fallback = trend.degenerate || !projected.is_finite() || projected < 0.0;
        let daily_amount = if fallback { trend.average } else { projected };
        cumulative += daily_amount;
        points.push(ForecastPoint {
            index,
            start,
            end,
            daily_amount,
            cumulative_amount: cumulative,
            fallback,
        });
        start = end;
    }
    Forecast { trend, points }
}
