//! Plain-text renderers for the three display modes. Pure functions of the
//! selected fields and the latest record.

use crate::json_path::{FieldPath, ProjectedRecord};

use super::config::DisplayMode;
use super::format::{field_label, format_value, NOT_AVAILABLE};

/// One labelled, formatted row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub label: String,
    pub value: String,
}

/// Rows in selection order. Fields absent from the record show as N/A.
pub fn rows(fields: &[FieldPath], record: &ProjectedRecord) -> Vec<Row> {
    fields
        .iter()
        .map(|field| Row {
            label: field_label(field.as_str()),
            value: record
                .get(field.as_str())
                .map(format_value)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        })
        .collect()
}

pub fn render(mode: DisplayMode, fields: &[FieldPath], record: &ProjectedRecord) -> String {
    let rows = rows(fields, record);
    match mode {
        DisplayMode::Card => render_card(&rows),
        DisplayMode::Table => render_table(&rows),
        DisplayMode::List => render_list(&rows),
    }
}

/// Label left, value right-aligned.
pub fn render_card(rows: &[Row]) -> String {
    let label_width = rows.iter().map(|row| row.label.chars().count()).max().unwrap_or(0);
    let value_width = rows.iter().map(|row| row.value.chars().count()).max().unwrap_or(0);

    rows.iter()
        .map(|row| {
            format!(
                "{:<lw$}  {:>vw$}",
                row.label,
                row.value,
                lw = label_width,
                vw = value_width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_table(rows: &[Row]) -> String {
    const FIELD: &str = "Field";
    const VALUE: &str = "Value";

    let label_width = rows
        .iter()
        .map(|row| row.label.chars().count())
        .chain(std::iter::once(FIELD.len()))
        .max()
        .unwrap_or(FIELD.len());
    let value_width = rows
        .iter()
        .map(|row| row.value.chars().count())
        .chain(std::iter::once(VALUE.len()))
        .max()
        .unwrap_or(VALUE.len());

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format!(
        "{:<lw$} | {:>vw$}",
        FIELD,
        VALUE,
        lw = label_width,
        vw = value_width
    ));
    lines.push(format!("{}-+-{}", "-".repeat(label_width), "-".repeat(value_width)));
    for row in rows {
        lines.push(format!(
            "{:<lw$} | {:>vw$}",
            row.label,
            row.value,
            lw = label_width,
            vw = value_width
        ));
    }
    lines.join("\n")
}

pub fn render_list(rows: &[Row]) -> String {
    rows.iter()
        .map(|row| format!("{}: {}", row.label, row.value))
        .collect::<Vec<_>>()
        .join("\n")
}
