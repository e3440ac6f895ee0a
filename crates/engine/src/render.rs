//! Report renderings: terminal text, printable HTML and CSV.

use std::fmt::Write as _;

use crate::{
    EngineError, ResultEngine,
    util::escape_html,
    view::{HistoryRow, ReportDocument},
};

/// Output formats supported by [`render`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Html,
    Csv,
}

impl std::str::FromStr for ReportFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "html" => Ok(Self::Html),
            "csv" => Ok(Self::Csv),
            other => Err(EngineError::InvalidEntry(format!(
                "unknown report format: {other}"
            ))),
        }
    }
}

pub fn render(doc: &ReportDocument, format: ReportFormat) -> ResultEngine<String> {
    match format {
        ReportFormat::Text => Ok(text(doc)),
        ReportFormat::Html => Ok(html(doc)),
        ReportFormat::Csv => csv(doc),
    }
}

/// Plain table for the terminal.
pub fn text(doc: &ReportDocument) -> String {
    let h = &doc.header;
    let mut out = String::new();
    let _ = writeln!(out, "{}", h.name);
    let _ = writeln!(out, "Phone: {}", h.phone);
    let _ = writeln!(out, "Email: {}", h.email);
    let _ = writeln!(out, "Report Type: {}", h.report_type);
    let _ = writeln!(out, "Date Range: {} – {}", h.from, h.to);
    let _ = writeln!(out, "Generated: {}", h.generated_at.format("%Y-%m-%d %H:%M"));
    out.push('\n');

    if doc.rows.is_empty() {
        out.push_str("No entries found.\n");
    } else {
        let _ = writeln!(
            out,
            "{:<8} {:<10} {:<28} {:<16} {:>14}",
            "Type", "Date", "Description", "Category", "Amount"
        );
        for row in &doc.rows {
            let _ = writeln!(
                out,
                "{:<8} {:<10} {:<28} {:<16} {:>14}",
                row.kind.as_str(),
                row.date.to_string(),
                clip(&row.description, 28),
                clip(&row.category, 16),
                row.amount
            );
        }
    }

    out.push('\n');
    let _ = writeln!(out, "Total Income:  {}", doc.summary.income);
    let _ = writeln!(out, "Total Expense: {}", doc.summary.expense);
    let _ = writeln!(out, "Net Balance:   {}", doc.summary.net);
    out
}

/// Standalone HTML page, ready to print or convert to PDF.
pub fn html(doc: &ReportDocument) -> String {
    let h = &doc.header;
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\"/>\n");
    let _ = writeln!(out, "<title>Expense report – {}</title>", escape_html(&h.name));
    out.push_str("</head>\n<body>\n");
    out.push_str(
        "<div style=\"text-align: center; color: black; font-family: sans-serif;\">\n",
    );
    let _ = writeln!(
        out,
        "  <img src=\"{}\" style=\"height: 60px; width: 60px; border-radius: 50%; margin-bottom: 8px;\" />",
        escape_html(&h.photo)
    );
    let _ = writeln!(out, "  <h3 style=\"margin: 5px 0;\">{}</h3>", escape_html(&h.name));
    let _ = writeln!(out, "  <p style=\"margin: 0;\">📞 {}</p>", escape_html(&h.phone));
    let _ = writeln!(
        out,
        "  <p style=\"margin: 0 0 10px 0;\">✉️ {}</p>",
        escape_html(&h.email)
    );
    let _ = writeln!(
        out,
        "  <p><strong>Report Type:</strong> {}</p>",
        escape_html(&h.report_type)
    );
    let _ = writeln!(
        out,
        "  <p><strong>Date Range:</strong> {} – {}</p>",
        h.from, h.to
    );
    let _ = writeln!(
        out,
        "  <p><small>Generated {}</small></p>",
        h.generated_at.format("%Y-%m-%d %H:%M %:z")
    );
    out.push_str("</div>\n<hr/>\n");
    out.push_str(
        "<table style=\"width: 100%; color: black; font-size: 14px; font-family: sans-serif;\">\n",
    );
    out.push_str("  <thead>\n    <tr>\n      <th>Type</th><th>Date</th><th>Description</th><th>Category</th><th>Amount</th>\n    </tr>\n  </thead>\n  <tbody>\n");
    for row in &doc.rows {
        let _ = writeln!(
            out,
            "    <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            row.kind.as_str(),
            row.date,
            escape_html(&row.description),
            escape_html(&row.category),
            escape_html(&row.amount)
        );
    }
    out.push_str("  </tbody>\n</table>\n<hr/>\n");
    let _ = writeln!(
        out,
        "<p><strong>Total Income:</strong> {}</p>",
        escape_html(&doc.summary.income)
    );
    let _ = writeln!(
        out,
        "<p><strong>Total Expense:</strong> {}</p>",
        escape_html(&doc.summary.expense)
    );
    let _ = writeln!(
        out,
        "<p><strong>Net Balance:</strong> {}</p>",
        escape_html(&doc.summary.net)
    );
    out.push_str("</body>\n</html>\n");
    out
}

/// One CSV row per entry; totals are left to the spreadsheet.
pub fn csv(doc: &ReportDocument) -> ResultEngine<String> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());
    let to_err = |err: ::csv::Error| EngineError::Export(err.to_string());

    writer
        .write_record(["type", "date", "description", "category", "amount"])
        .map_err(to_err)?;
    for row in &doc.rows {
        writer
            .write_record([
                row.kind.as_str(),
                row.date.to_string().as_str(),
                row.description.as_str(),
                row.category.as_str(),
                row.amount.as_str(),
            ])
            .map_err(to_err)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| EngineError::Export(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| EngineError::Export(err.to_string()))
}

/// History listing for the terminal.
pub fn history_table(rows: &[HistoryRow]) -> String {
    if rows.is_empty() {
        return "No entries found.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3}  {:<8}  {:<8} {:<10} {:<28} {:<16} {:>14}",
        "#", "ID", "Type", "Date", "Description", "Category", "Amount"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:>3}  {:<8}  {:<8} {:<10} {:<28} {:<16} {:>14}",
            row.position,
            row.id.short(),
            row.kind.as_str().to_ascii_uppercase(),
            row.date.to_string(),
            clip(&row.description, 28),
            clip(&row.category, 16),
            row.amount
        );
    }
    out
}

fn clip(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut clipped: String = value.chars().take(width.saturating_sub(1)).collect();
    clipped.push('…');
    clipped
}
