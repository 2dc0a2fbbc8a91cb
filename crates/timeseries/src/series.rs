use chrono::NaiveDateTime;
use serde::Serialize;
use shared::domain::FillStrategy;

use crate::error::SeriesError;

/// The selected date and value columns, row aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    ds: Vec<Option<NaiveDateTime>>,
    y: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MissingCounts {
    pub date: usize,
    pub value: usize,
}

impl MissingCounts {
    pub fn any(&self) -> bool {
        self.date > 0 || self.value > 0
    }
}

impl TimeSeries {
    pub fn new(ds: Vec<Option<NaiveDateTime>>, y: Vec<Option<f64>>) -> Result<Self, SeriesError> {
        if ds.len() != y.len() {
            return Err(SeriesError::LengthMismatch {
                dates: ds.len(),
                values: y.len(),
            });
        }
        Ok(Self { ds, y })
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn dates(&self) -> &[Option<NaiveDateTime>] {
        &self.ds
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.y
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<NaiveDateTime>, Option<f64>)> + '_ {
        self.ds.iter().copied().zip(self.y.iter().copied())
    }

    /// Stable ascending sort on the date; rows without a date go last.
    pub fn sort_by_date(&mut self) {
        let mut rows: Vec<(Option<NaiveDateTime>, Option<f64>)> = self.iter().collect();
        rows.sort_by(|a, b| match (a.0, b.0) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        let (ds, y) = rows.into_iter().unzip();
        self.ds = ds;
        self.y = y;
    }

    pub fn missing_counts(&self) -> MissingCounts {
        MissingCounts {
            date: self.ds.iter().filter(|d| d.is_none()).count(),
            value: self.y.iter().filter(|v| v.is_none()).count(),
        }
    }

    pub fn apply_fill(&mut self, strategy: FillStrategy) {
        match strategy {
            FillStrategy::DoNothing => {}
            FillStrategy::DropRows => {
                let rows: Vec<_> = self
                    .iter()
                    .filter(|(d, v)| d.is_some() && v.is_some())
                    .collect();
                let (ds, y) = rows.into_iter().unzip();
                self.ds = ds;
                self.y = y;
            }
            FillStrategy::ForwardFill => {
                forward_fill(&mut self.ds);
                forward_fill(&mut self.y);
            }
            FillStrategy::BackwardFill => {
                backward_fill(&mut self.ds);
                backward_fill(&mut self.y);
            }
        }
    }

    /// Rows that carry a date, for plotting against time.
    pub fn dated_rows(&self) -> (Vec<NaiveDateTime>, Vec<Option<f64>>) {
        self.iter().filter_map(|(d, v)| d.map(|d| (d, v))).unzip()
    }
}

fn forward_fill<T: Copy>(values: &mut [Option<T>]) {
    let mut last = None;
    for v in values.iter_mut() {
        if v.is_some() {
            last = *v;
        } else {
            *v = last;
        }
    }
}

fn backward_fill<T: Copy>(values: &mut [Option<T>]) {
    let mut next = None;
    for v in values.iter_mut().rev() {
        if v.is_some() {
            next = *v;
        } else {
            *v = next;
        }
    }
}

#[cfg(test)]
#[path = "tests/series_tests.rs"]
mod tests;
