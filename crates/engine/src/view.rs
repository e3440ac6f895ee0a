//! Display models.
//!
//! Projections from ledger data to what a screen or a report shows. No
//! business rules live here: amounts are already validated, totals are
//! computed by [`crate::aggregate`].

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::{
    Entry, EntryId, EntryKind, ResultEngine, UserProfile,
    aggregate::{ReportFilter, Totals, totals},
};

/// Dashboard figures, formatted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dashboard {
    pub income: String,
    pub expense: String,
    pub net: String,
    /// `true` when expenses exceed income.
    pub in_deficit: bool,
}

impl Dashboard {
    pub fn from_totals(totals: &Totals, symbol: &str) -> Self {
        Self {
            income: totals.income.format(symbol),
            expense: totals.expense.format(symbol),
            net: totals.net.format(symbol),
            in_deficit: totals.net.is_negative(),
        }
    }
}

/// One line of the history listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryRow {
    /// 1-based position in the list.
    pub position: usize,
    pub id: EntryId,
    pub kind: EntryKind,
    pub date: NaiveDate,
    pub description: String,
    pub category: String,
    pub amount: String,
}

pub fn history_rows(entries: &[Entry], symbol: &str) -> Vec<HistoryRow> {
    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| HistoryRow {
            position: idx + 1,
            id: entry.id,
            kind: entry.kind,
            date: entry.date,
            description: entry.description.clone(),
            category: entry.category.clone(),
            amount: entry.amount.format(symbol),
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportHeader {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub photo: String,
    /// Upper-cased type selector: `ALL`, `INCOME` or `EXPENSE`.
    pub report_type: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub generated_at: DateTime<FixedOffset>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportRow {
    pub kind: EntryKind,
    pub date: NaiveDate,
    pub description: String,
    pub category: String,
    pub amount: String,
}

/// Printable report: header, matching rows, totals over those rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportDocument {
    pub header: ReportHeader,
    pub rows: Vec<ReportRow>,
    pub summary: Dashboard,
}

impl ReportDocument {
    /// `entries` must already be filtered with `filter`.
    pub fn build(
        profile: &UserProfile,
        filter: &ReportFilter,
        entries: &[&Entry],
        symbol: &str,
        generated_at: DateTime<FixedOffset>,
    ) -> ResultEngine<Self> {
        let header = ReportHeader {
            name: profile.name.clone(),
            phone: profile.phone.clone(),
            email: profile.email.clone(),
            photo: profile.photo.clone(),
            report_type: filter.kind.as_str().to_ascii_uppercase(),
            from: filter.range.from(),
            to: filter.range.to(),
            generated_at,
        };
        let rows = entries
            .iter()
            .map(|entry| ReportRow {
                kind: entry.kind,
                date: entry.date,
                description: entry.description.clone(),
                category: entry.category.clone(),
                amount: entry.amount.format(symbol),
            })
            .collect();
        let summary = Dashboard::from_totals(&totals(entries.iter().copied())?, symbol);

        Ok(Self {
            header,
            rows,
            summary,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
