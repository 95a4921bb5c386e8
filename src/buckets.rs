//! Adaptive temporal bucketization.
//!
//! Given the date range present in a collection, this module picks a
//! display granularity (`choose_scale`), generates labeled half-open
//! buckets at that granularity (`generate_buckets`), and counts facet
//! values into them (`count_buckets`). Callers that want a two-level
//! histogram - decades plus years, days plus half-days - use
//! `two_scale_buckets`, which also runs the next-finer scale.
//!
//! # Invariants
//!
//! - Buckets are contiguous and non-overlapping:
//!   `buckets[i].upper_bound == buckets[i + 1].lower_bound`.
//! - The first bucket's lower bound is at or below the requested minimum;
//!   the last bucket's upper bound is strictly above the requested
//!   maximum. At least one bucket is always produced, even for
//!   `min == max`.
//! - Membership is half-open: `lower_bound <= value < upper_bound`.
//!
//! Labels carry a "last salient change" marker through a left-to-right
//! fold: only the first bucket of a new day (sub-day scales) or a new
//! year (month scale) shows the full date, later buckets in the same
//! day/year abbreviate.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::format::{format_date, format_time};
use crate::types::{EngineError, Item};

/// Code of the finest supported granularity (one-second buckets).
pub const FINEST_SCALE_CODE: i32 = -9;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// =============================================================================
// SCALES
// =============================================================================

/// Bucket granularity.
///
/// `Years(n)` buckets span `10^n` years (years, decades, centuries, ...).
/// The sub-year scales are fixed calendar units, ordered coarsest to
/// finest. Each scale has an integer code - `Years(n)` is `n >= 0`,
/// `Month` is -1 down to `Second` at -9 - matching the serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateScale {
    Years(u32),
    Month,
    HalfMonth,
    Day,
    HalfDay,
    Hour,
    QuarterHour,
    Minute,
    FiveSeconds,
    Second,
}

impl DateScale {
    pub fn code(self) -> i32 {
        match self {
            DateScale::Years(n) => n as i32,
            DateScale::Month => -1,
            DateScale::HalfMonth => -2,
            DateScale::Day => -3,
            DateScale::HalfDay => -4,
            DateScale::Hour => -5,
            DateScale::QuarterHour => -6,
            DateScale::Minute => -7,
            DateScale::FiveSeconds => -8,
            DateScale::Second => -9,
        }
    }

    /// Decode an integer scale code. Codes below `FINEST_SCALE_CODE` are
    /// rejected - there is nothing finer than one-second buckets.
    pub fn from_code(code: i32) -> Result<Self, EngineError> {
        match code {
            n if n >= 0 => Ok(DateScale::Years(n as u32)),
            -1 => Ok(DateScale::Month),
            -2 => Ok(DateScale::HalfMonth),
            -3 => Ok(DateScale::Day),
            -4 => Ok(DateScale::HalfDay),
            -5 => Ok(DateScale::Hour),
            -6 => Ok(DateScale::QuarterHour),
            -7 => Ok(DateScale::Minute),
            -8 => Ok(DateScale::FiveSeconds),
            -9 => Ok(DateScale::Second),
            _ => Err(EngineError::scale_too_fine(code)),
        }
    }

    /// The next-finer scale, or `None` at the floor. A two-level
    /// histogram at `Second` simply has no second level.
    pub fn finer(self) -> Option<Self> {
        DateScale::from_code(self.code() - 1).ok()
    }
}

/// Day-of-month where the second half of a month begins: the 15th in
/// February, the 16th everywhere else.
fn half_month_day(month: u32) -> u32 {
    if month == 2 {
        15
    } else {
        16
    }
}

// =============================================================================
// SCALE SELECTION
// =============================================================================

/// Choose the coarsest scale that still distinguishes `min` from `max`.
///
/// The rules run coarsest-first and the first satisfied one wins:
/// year difference picks a year-power scale (`floor(log10 Δy)`), then
/// month / half-month / day differences pick the calendar scales, then
/// hour, minute, and second differences pick the time scales. Equal
/// instants land on `Second`.
pub fn choose_scale(min: &NaiveDateTime, max: &NaiveDateTime) -> Result<DateScale, EngineError> {
    if max < min {
        return Err(EngineError::inverted_range(*min, *max));
    }

    let year_diff = max.year() - min.year();
    if year_diff != 0 {
        // it'll be by years, we just have to decide how many of them
        let mut power = 0u32;
        let mut d = year_diff as u32;
        while d >= 10 {
            d /= 10;
            power += 1;
        }
        return Ok(DateScale::Years(power));
    }
    if max.month() > min.month() {
        return Ok(DateScale::Month);
    }
    let threshold = half_month_day(max.month());
    if min.day() < threshold && max.day() >= threshold {
        return Ok(DateScale::HalfMonth);
    }
    if max.day() > min.day() {
        return Ok(DateScale::Day);
    }
    let hour_diff = max.hour() - min.hour();
    if hour_diff >= 12 {
        return Ok(DateScale::HalfDay);
    }
    if hour_diff > 0 {
        return Ok(DateScale::Hour);
    }
    let minute_diff = max.minute() - min.minute();
    if minute_diff >= 15 {
        return Ok(DateScale::QuarterHour);
    }
    if minute_diff > 0 {
        return Ok(DateScale::Minute);
    }
    if max.second() - min.second() >= 5 {
        return Ok(DateScale::FiveSeconds);
    }
    Ok(DateScale::Second)
}

// =============================================================================
// BUCKETS
// =============================================================================

/// How a bucket is captioned: one centered string, or a left/right pair
/// marking the two ends of the interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BucketLabel {
    Centered(String),
    Span { left: String, right: String },
}

impl BucketLabel {
    /// The combined single-string form, "left to right" for spans.
    pub fn text(&self) -> String {
        match self {
            BucketLabel::Centered(s) => s.clone(),
            BucketLabel::Span { left, right } => format!("{} to {}", left, right),
        }
    }
}

/// One half-open interval `[lower_bound, upper_bound)` of a temporal
/// histogram, with its label, value count, and member item ids.
///
/// Buckets are produced fresh on every (re)computation and are never
/// mutated after counting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateBucket {
    pub lower_bound: NaiveDateTime,
    pub upper_bound: NaiveDateTime,
    pub label: BucketLabel,
    pub count: usize,
    pub items: Vec<String>,
}

impl DateBucket {
    /// Inclusive lower bound, exclusive upper bound.
    pub fn contains(&self, value: &NaiveDateTime) -> bool {
        *value >= self.lower_bound && *value < self.upper_bound
    }
}

/// Generate labeled buckets covering `[min, max]` at the given scale,
/// defaulting the scale via `choose_scale` when omitted.
///
/// The starting instant snaps down to the nearest scale boundary: year
/// scales round the year down to a multiple of the step, sub-year scales
/// zero every finer field, and the half granularities (half-month,
/// half-day, quarter-hour, five-seconds) snap to the nearer half
/// boundary at or below the source instant. Generation then steps one
/// scale unit at a time until a bucket's upper bound passes `max`; the
/// final bucket may extend beyond it.
pub fn generate_buckets(
    min: &NaiveDateTime,
    max: &NaiveDateTime,
    scale: Option<DateScale>,
) -> Result<Vec<DateBucket>, EngineError> {
    if max < min {
        return Err(EngineError::inverted_range(*min, *max));
    }
    let scale = match scale {
        Some(s) => s,
        None => choose_scale(min, max)?,
    };

    let start = snap_down(min, scale).ok_or_else(|| EngineError::InvalidRange {
        reason: format!("cannot snap {} to a {:?} boundary", min, scale),
    })?;

    let mut buckets = Vec::new();
    let mut last_shown: Option<i64> = None;
    let mut upper = start;
    let mut step_count: i64 = 0;
    loop {
        step_count += 1;
        let lower = upper;
        upper = step_from(&start, scale, step_count).ok_or_else(|| EngineError::InvalidRange {
            reason: format!("bucket bound out of calendar range at step {}", step_count),
        })?;
        let (label, shown) = label_for(scale, &lower, &upper, last_shown);
        last_shown = shown;
        buckets.push(DateBucket {
            lower_bound: lower,
            upper_bound: upper,
            label,
            count: 0,
            items: Vec::new(),
        });
        if upper > *max {
            break;
        }
    }
    Ok(buckets)
}

/// Snap an instant down to the nearest boundary for a scale.
///
/// Returns `None` only when the result would leave the supported
/// calendar range (absurdly large year steps).
fn snap_down(t: &NaiveDateTime, scale: DateScale) -> Option<NaiveDateTime> {
    let (year, month, day) = (t.year(), t.month(), t.day());
    let (hour, minute, second) = (t.hour(), t.minute(), t.second());
    let (y, mo, d, h, mi, s) = match scale {
        DateScale::Years(n) => {
            let step = 10i64.checked_pow(n)?;
            let snapped = (year as i64).div_euclid(step) * step;
            (i32::try_from(snapped).ok()?, 1, 1, 0, 0, 0)
        }
        DateScale::Month => (year, month, 1, 0, 0, 0),
        DateScale::HalfMonth => {
            let threshold = half_month_day(month);
            let d = if day >= threshold { threshold } else { 1 };
            (year, month, d, 0, 0, 0)
        }
        DateScale::Day => (year, month, day, 0, 0, 0),
        DateScale::HalfDay => (year, month, day, hour / 12 * 12, 0, 0),
        DateScale::Hour => (year, month, day, hour, 0, 0),
        DateScale::QuarterHour => (year, month, day, hour, minute / 15 * 15, 0),
        DateScale::Minute => (year, month, day, hour, minute, 0),
        DateScale::FiveSeconds => (year, month, day, hour, minute, second / 5 * 5),
        DateScale::Second => (year, month, day, hour, minute, second),
    };
    NaiveDate::from_ymd_opt(y, mo, d)?.and_hms_opt(h, mi, s)
}

/// The instant `steps` scale units past the snapped start.
///
/// Fixed-duration scales use plain duration arithmetic (naive datetimes
/// have no DST); month-and-coarser scales recompute calendar fields so
/// that month lengths and year rollover come out right.
fn step_from(start: &NaiveDateTime, scale: DateScale, steps: i64) -> Option<NaiveDateTime> {
    let add = |d: Duration| start.checked_add_signed(d);
    match scale {
        DateScale::Second => add(Duration::seconds(steps)),
        DateScale::FiveSeconds => add(Duration::seconds(5 * steps)),
        DateScale::Minute => add(Duration::minutes(steps)),
        DateScale::QuarterHour => add(Duration::minutes(15 * steps)),
        DateScale::Hour => add(Duration::hours(steps)),
        DateScale::HalfDay => add(Duration::hours(12 * steps)),
        DateScale::Day => add(Duration::days(steps)),
        DateScale::Month => {
            let months = start.month0() as i64 + steps;
            let year = start.year() as i64 + months.div_euclid(12);
            let month = months.rem_euclid(12) as u32 + 1;
            NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, 1)?.and_hms_opt(0, 0, 0)
        }
        DateScale::HalfMonth => {
            // steps are half-months; odd steps land on the mid-month
            // boundary of whatever month they fall in
            let halves = if start.day() > 1 { steps + 1 } else { steps };
            let months = start.month0() as i64 + halves.div_euclid(2);
            let year = start.year() as i64 + months.div_euclid(12);
            let month = months.rem_euclid(12) as u32 + 1;
            let day = if halves.rem_euclid(2) == 1 {
                half_month_day(month)
            } else {
                1
            };
            NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)?.and_hms_opt(0, 0, 0)
        }
        DateScale::Years(n) => {
            let step = 10i64.checked_pow(n)?;
            let year = start.year() as i64 + steps.checked_mul(step)?;
            NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, 1, 1)?.and_hms_opt(0, 0, 0)
        }
    }
}

/// Label one bucket, threading the "last salient change" accumulator.
///
/// For sub-day scales the accumulator is the day-of-month last shown in
/// full; for the month scale it is the calendar year. Other scales
/// ignore it.
fn label_for(
    scale: DateScale,
    lower: &NaiveDateTime,
    upper: &NaiveDateTime,
    last_shown: Option<i64>,
) -> (BucketLabel, Option<i64>) {
    match scale {
        DateScale::HalfDay
        | DateScale::Hour
        | DateScale::QuarterHour
        | DateScale::Minute
        | DateScale::FiveSeconds
        | DateScale::Second => {
            // show the time alone, unless this bucket starts a new day
            let new_day = lower.day() as i64;
            let (left, shown) = if last_shown == Some(new_day) {
                (format_time(lower), last_shown)
            } else {
                (
                    format!("{} {}", format_date(lower), format_time(lower)),
                    Some(new_day),
                )
            };
            let right = if shown == Some(upper.day() as i64) {
                format_time(upper)
            } else {
                format!("{} {}", format_date(upper), format_time(upper))
            };
            (BucketLabel::Span { left, right }, shown)
        }
        DateScale::Day => (BucketLabel::Centered(format_date(lower)), last_shown),
        DateScale::HalfMonth => (
            BucketLabel::Span {
                left: format_date(lower),
                right: format_date(upper),
            },
            last_shown,
        ),
        DateScale::Month => {
            // month name alone, with the year on the first bucket of it
            let year = lower.year() as i64;
            let name = MONTHS[lower.month0() as usize];
            if last_shown == Some(year) {
                (BucketLabel::Centered(name.to_string()), last_shown)
            } else {
                (
                    BucketLabel::Centered(format!("{} {}", name, year)),
                    Some(year),
                )
            }
        }
        DateScale::Years(0) => (
            BucketLabel::Centered(lower.year().to_string()),
            last_shown,
        ),
        DateScale::Years(n) => {
            let step = 10i64.pow(n.min(9));
            let rounded = (lower.year() as i64).div_euclid(step) * step;
            (BucketLabel::Centered(format!("{}s", rounded)), last_shown)
        }
    }
}

// =============================================================================
// COUNTING
// =============================================================================

/// The minimum and maximum instant among a facet's values across items,
/// or `None` when no item carries the facet at all.
pub fn date_extent(items: &[&Item], facet: &str) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let mut extent: Option<(NaiveDateTime, NaiveDateTime)> = None;
    for item in items {
        let Some(values) = item.values(facet) else {
            continue;
        };
        for value in values {
            let Some(d) = value.as_date() else { continue };
            extent = Some(match extent {
                None => (d, d),
                Some((lo, hi)) => (lo.min(d), hi.max(d)),
            });
        }
    }
    extent
}

/// Count every facet value of every item into the matching buckets.
///
/// An item lands in more than one bucket only by carrying multiple
/// values; the count is per value, the member list records each item
/// once per bucket.
pub fn count_buckets(buckets: &mut [DateBucket], items: &[&Item], facet: &str) {
    for item in items {
        let Some(values) = item.values(facet) else {
            continue;
        };
        for value in values {
            let Some(d) = value.as_date() else { continue };
            for bucket in buckets.iter_mut() {
                if bucket.contains(&d) {
                    bucket.count += 1;
                    if bucket.items.last() != Some(&item.id) {
                        bucket.items.push(item.id.clone());
                    }
                }
            }
        }
    }
}

/// A two-level histogram: the chosen scale plus the next-finer one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoScaleBuckets {
    pub scale: DateScale,
    pub coarse: Vec<DateBucket>,
    pub fine: Vec<DateBucket>,
}

/// Build and count buckets for a facet at the chosen scale and the
/// next-finer scale in one pass over the given items.
///
/// Returns `Ok(None)` when no item carries the facet ("not currently
/// applicable"). At the finest scale the fine list is empty - a missing
/// second level is a normal degenerate case, not an error.
pub fn two_scale_buckets(
    items: &[&Item],
    facet: &str,
) -> Result<Option<TwoScaleBuckets>, EngineError> {
    let Some((min, max)) = date_extent(items, facet) else {
        return Ok(None);
    };
    let scale = choose_scale(&min, &max)?;
    let mut coarse = generate_buckets(&min, &max, Some(scale))?;
    count_buckets(&mut coarse, items, facet);
    let fine = match scale.finer() {
        Some(finer) => {
            let mut buckets = generate_buckets(&min, &max, Some(finer))?;
            count_buckets(&mut buckets, items, facet);
            buckets
        }
        None => Vec::new(),
    };
    Ok(Some(TwoScaleBuckets {
        scale,
        coarse,
        fine,
    }))
}
