//! Totals and filters over an entry list.
//!
//! Everything here is a pure function of its input: callers load the list,
//! the aggregator never touches storage.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;

use crate::{EngineError, Entry, EntryKind, Money, ResultEngine};

/// Income, expense and their difference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Totals {
    pub income: Money,
    pub expense: Money,
    pub net: Money,
}

/// Sums amounts per entry kind. `net` is always `income - expense`.
///
/// Fails with [`EngineError::InvalidAmount`] when a sum does not fit in
/// [`Money`].
pub fn totals<'a, I>(entries: I) -> ResultEngine<Totals>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let too_large = || EngineError::InvalidAmount("total too large".to_string());

    let mut income = Money::ZERO;
    let mut expense = Money::ZERO;
    for entry in entries {
        let sum = match entry.kind {
            EntryKind::Income => &mut income,
            EntryKind::Expense => &mut expense,
        };
        *sum = sum.checked_add(entry.amount).ok_or_else(too_large)?;
    }
    Ok(Totals {
        income,
        expense,
        net: income.checked_sub(expense).ok_or_else(too_large)?,
    })
}

/// Inclusive range of calendar dates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> ResultEngine<Self> {
        if from > to {
            return Err(EngineError::InvalidDateRange(format!(
                "{from} is after {to}"
            )));
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Entry type selector with an `all` wildcard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KindFilter {
    #[default]
    All,
    Only(EntryKind),
}

impl KindFilter {
    pub fn matches(self, kind: EntryKind) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == kind,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(kind) => kind.as_str(),
        }
    }
}

impl fmt::Display for KindFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KindFilter {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

/// Selection criteria of a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportFilter {
    pub range: DateRange,
    pub kind: KindFilter,
}

impl ReportFilter {
    pub fn matches(&self, entry: &Entry) -> bool {
        self.range.contains(entry.date) && self.kind.matches(entry.kind)
    }
}

/// Entries matching `filter`, in list order.
pub fn filter<'a>(entries: &'a [Entry], filter: &ReportFilter) -> Vec<&'a Entry> {
    entries.iter().filter(|entry| filter.matches(entry)).collect()
}
