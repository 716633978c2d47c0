use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(value),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

fn table_options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    }
}

/// Every weave response is either one record (shown as key/value pairs) or a
/// list of records (one row each, `id` leading).
fn render_table<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let options = table_options();
    match serde_json::to_value(value)? {
        Value::Array(items) => Ok(record_rows(&items, options)),
        Value::Object(map) => {
            let mut rows = map
                .iter()
                .map(|(key, value)| vec![key.clone(), value_to_cell(value)])
                .collect::<Vec<_>>();
            rows.sort();
            Ok(table::render_entity_table(&["key", "value"], &rows, options))
        }
        other => anyhow::bail!("table output expects a record or a list, got {other}"),
    }
}

fn record_rows(items: &[Value], options: table::TableOptions) -> String {
    let records = items.iter().filter_map(Value::as_object).collect::<Vec<_>>();
    if records.is_empty() {
        return String::from("(no rows)");
    }

    let mut columns = records
        .iter()
        .flat_map(|record| record.keys())
        .map(String::as_str)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>();
    if let Some(position) = columns.iter().position(|column| *column == "id") {
        let id = columns.remove(position);
        columns.insert(0, id);
    }

    let rows = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| record.get(*column).map_or_else(|| String::from("-"), value_to_cell))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    table::render_entity_table(&columns, &rows, options)
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
