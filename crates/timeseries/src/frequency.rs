use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Weekday};

const WEEKDAY_ALIASES: [&str; 7] = ["MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN"];
const MONTH_ALIASES: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Hourly,
    Daily,
    /// Anchored on the weekday of the observations.
    Weekly(Weekday),
    MonthStart,
    MonthEnd,
    /// Anchored on the first month of the quarterly cycle, `1..=3`.
    QuarterStart(u32),
    /// Anchored on the calendar month, `1..=12`.
    YearStart(u32),
    /// A fixed step that matches none of the calendar cadences.
    Seconds(i64),
}

impl Frequency {
    /// Offset alias in the notation forecasting libraries accept.
    pub fn code(self) -> String {
        match self {
            Self::Hourly => "H".into(),
            Self::Daily => "D".into(),
            Self::Weekly(day) => {
                format!("W-{}", WEEKDAY_ALIASES[day.num_days_from_monday() as usize])
            }
            Self::MonthStart => "MS".into(),
            Self::MonthEnd => "M".into(),
            Self::QuarterStart(month) => format!("QS-{}", month_alias(month)),
            Self::YearStart(month) => format!("YS-{}", month_alias(month)),
            Self::Seconds(s) => format!("{s}s"),
        }
    }

    pub fn step(self, from: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Self::Hourly => from.checked_add_signed(Duration::hours(1)),
            Self::Daily => from.checked_add_signed(Duration::days(1)),
            Self::Weekly(_) => from.checked_add_signed(Duration::weeks(1)),
            Self::MonthStart => from.checked_add_months(Months::new(1)),
            Self::QuarterStart(_) => from.checked_add_months(Months::new(3)),
            Self::YearStart(_) => from.checked_add_months(Months::new(12)),
            Self::MonthEnd => {
                let next = from.date().with_day(1)?.checked_add_months(Months::new(1))?;
                Some(last_day_of_month(next)?.and_time(from.time()))
            }
            Self::Seconds(s) => from.checked_add_signed(Duration::seconds(s)),
        }
    }
}

fn month_alias(month: u32) -> &'static str {
    MONTH_ALIASES[(month.clamp(1, 12) - 1) as usize]
}

fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

fn is_month_end(date: NaiveDate) -> bool {
    last_day_of_month(date) == Some(date)
}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// Infers a regular cadence from ascending dates. Repeated timestamps are
/// ignored; `None` for fewer than two distinct dates or irregular spacing.
pub fn infer_frequency(dates: &[NaiveDateTime]) -> Option<Frequency> {
    let mut distinct: Vec<NaiveDateTime> = dates.to_vec();
    distinct.sort();
    distinct.dedup();
    if distinct.len() < 2 {
        return None;
    }

    let diffs: Vec<i64> = distinct
        .windows(2)
        .map(|w| (w[1] - w[0]).num_seconds())
        .collect();
    let uniform = diffs.iter().all(|d| *d == diffs[0]);
    if uniform {
        match diffs[0] {
            3_600 => return Some(Frequency::Hourly),
            86_400 => return Some(Frequency::Daily),
            604_800 => return Some(Frequency::Weekly(distinct[0].weekday())),
            _ => {}
        }
    }
    calendar_frequency(&distinct).or_else(|| uniform.then(|| Frequency::Seconds(diffs[0])))
}

fn calendar_frequency(distinct: &[NaiveDateTime]) -> Option<Frequency> {
    if distinct.iter().any(|d| d.time() != distinct[0].time()) {
        return None;
    }
    let months: Vec<i64> = distinct.iter().map(|d| month_index(d.date())).collect();
    let step = months[1] - months[0];
    if months.windows(2).any(|w| w[1] - w[0] != step) {
        return None;
    }
    let all_first = distinct.iter().all(|d| d.day() == 1);
    let all_last = distinct.iter().all(|d| is_month_end(d.date()));
    let first_month = distinct[0].month();
    match (step, all_first, all_last) {
        (1, true, _) => Some(Frequency::MonthStart),
        (1, false, true) => Some(Frequency::MonthEnd),
        (3, true, _) => Some(Frequency::QuarterStart((first_month - 1) % 3 + 1)),
        (12, true, _) => Some(Frequency::YearStart(first_month)),
        _ => None,
    }
}

/// Median spacing of ascending dates, used when no cadence is detected.
pub fn median_step(dates: &[NaiveDateTime]) -> Option<Frequency> {
    let mut diffs: Vec<i64> = dates
        .windows(2)
        .map(|w| (w[1] - w[0]).num_seconds())
        .filter(|d| *d > 0)
        .collect();
    if diffs.is_empty() {
        return None;
    }
    diffs.sort_unstable();
    Some(Frequency::Seconds(diffs[diffs.len() / 2]))
}

/// The `periods` timestamps following `last`.
pub fn future_dates(
    last: NaiveDateTime,
    frequency: Frequency,
    periods: usize,
) -> Vec<NaiveDateTime> {
    let mut out = Vec::with_capacity(periods);
    let mut current = last;
    for _ in 0..periods {
        match frequency.step(current) {
            Some(next) => {
                out.push(next);
                current = next;
            }
            None => break,
        }
    }
    out
}

#[cfg(test)]
#[path = "tests/frequency_tests.rs"]
mod tests;
