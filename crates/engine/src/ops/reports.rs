use chrono::{DateTime, FixedOffset};

use crate::{
    ResultEngine,
    aggregate::{self, ReportFilter, Totals},
    view::{Dashboard, HistoryRow, ReportDocument, history_rows},
};

use super::Engine;

impl Engine {
    pub async fn totals(&self) -> ResultEngine<Totals> {
        let entries = self.entries().await?;
        aggregate::totals(&entries)
    }

    pub async fn dashboard(&self, symbol: &str) -> ResultEngine<Dashboard> {
        Ok(Dashboard::from_totals(&self.totals().await?, symbol))
    }

    pub async fn history(&self, symbol: &str) -> ResultEngine<Vec<HistoryRow>> {
        let entries = self.entries().await?;
        Ok(history_rows(&entries, symbol))
    }

    /// Builds the report for the entries matching `filter`.
    pub async fn report(
        &self,
        filter: &ReportFilter,
        symbol: &str,
        generated_at: DateTime<FixedOffset>,
    ) -> ResultEngine<ReportDocument> {
        let profile = self.profile().await?;
        let entries = self.entries().await?;
        let picked = aggregate::filter(&entries, filter);
        tracing::debug!(
            matched = picked.len(),
            total = entries.len(),
            kind = %filter.kind,
            "report built"
        );
        ReportDocument::build(&profile, filter, &picked, symbol, generated_at)
    }
}
