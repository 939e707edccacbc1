use chrono::{DateTime, Utc};

use crate::error::{ContentError, Result};
use crate::record::Record;

/// Window width used when a caller has no terminal to measure.
pub const DEFAULT_COLS: usize = 70;

/// Position inside a content object.
///
/// Submission content has a header in front of its comments; listings only
/// have items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Index {
    Header,
    Item(usize),
}

impl Index {
    fn position(self) -> i64 {
        match self {
            Index::Header => -1,
            Index::Item(n) => n as i64,
        }
    }

    fn from_position(position: i64) -> Option<Self> {
        match position {
            -1 => Some(Index::Header),
            n if n >= 0 => Some(Index::Item(n as usize)),
            _ => None,
        }
    }

    /// The index `step` positions away, if one exists.
    pub fn offset(self, step: isize) -> Option<Self> {
        Self::from_position(self.position() + step as i64)
    }
}

pub trait Content {
    /// Record at `index` laid out for a window `n_cols` wide.
    ///
    /// Returns [`ContentError::OutOfRange`] when nothing exists there and the
    /// upstream source has no more data.
    fn get(&mut self, index: Index, n_cols: usize) -> Result<Record>;

    /// Lazily walks records from `start`, moving `step` positions each time.
    ///
    /// Stops quietly at the first out-of-range index. Walking backwards never
    /// yields the header.
    fn iterate(&mut self, start: Index, step: isize, n_cols: usize) -> Iterate<'_, Self>
    where
        Self: Sized,
    {
        Iterate {
            content: self,
            next: Some(start),
            step,
            n_cols,
        }
    }
}

pub struct Iterate<'a, C: ?Sized> {
    content: &'a mut C,
    next: Option<Index>,
    step: isize,
    n_cols: usize,
}

impl<C: Content + ?Sized> Iterator for Iterate<'_, C> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next.take()?;
        if self.step < 0 && index == Index::Header {
            return None;
        }
        match self.content.get(index, self.n_cols) {
            Ok(record) => {
                if self.step != 0 {
                    self.next = index.offset(self.step);
                }
                Some(Ok(record))
            }
            Err(ContentError::OutOfRange) => None,
            // Fused after reporting the failure once.
            Err(err) => Some(Err(err)),
        }
    }
}

/// Wraps each paragraph of `text` to `width` columns, keeping blank lines.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    for paragraph in text.lines() {
        let lines = textwrap::wrap(paragraph, width);
        if lines.is_empty() {
            out.push(String::new());
        } else {
            out.extend(lines.into_iter().map(|line| line.into_owned()));
        }
    }
    out
}

pub fn humanize_timestamp(utc_timestamp: f64, verbose: bool) -> String {
    let then = DateTime::from_timestamp(utc_timestamp.trunc() as i64, 0).unwrap_or_default();
    humanize_since(then, Utc::now(), verbose)
}

/// Relative age such as `5min` or, verbose, `5 minutes ago`.
pub fn humanize_since(then: DateTime<Utc>, now: DateTime<Utc>, verbose: bool) -> String {
    let seconds = (now - then).num_seconds();
    if seconds < 60 {
        return if verbose { "moments ago".into() } else { "0min".into() };
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return label(minutes, "minutes", "min", verbose);
    }
    let hours = minutes / 60;
    if hours < 24 {
        return label(hours, "hours", "hr", verbose);
    }
    let days = hours / 24;
    if days < 30 {
        return label(days, "days", "day", verbose);
    }
    let months = (days as f64 / 30.4).floor() as i64;
    if months < 12 {
        return label(months, "months", "month", verbose);
    }
    label(months / 12, "years", "yr", verbose)
}

fn label(value: i64, long: &str, short: &str, verbose: bool) -> String {
    if verbose {
        format!("{value} {long} ago")
    } else {
        format!("{value}{short}")
    }
}
