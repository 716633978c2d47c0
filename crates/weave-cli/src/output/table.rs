//! Aligned plain-text tables for `--format table`.

const MIN_COLUMN_WIDTH: usize = 6;
const SEPARATOR: &str = "  ";

#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

/// Render string rows under `headers`, shrinking the widest columns first
/// when the table would overflow `max_width`.
#[must_use]
pub fn render_entity_table(
    headers: &[&str],
    rows: &[Vec<String>],
    options: TableOptions,
) -> String {
    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
                .max(min_width(header))
        })
        .collect();

    fit_widths(&mut widths, headers, options.max_width);

    let header_line = headers
        .iter()
        .zip(widths.iter())
        .map(|(header, width)| format_cell(&truncate_text(header, *width), *width, false))
        .collect::<Vec<_>>()
        .join(SEPARATOR);

    let divider = "-".repeat(header_line.chars().count());

    let row_lines = rows.iter().map(|row| {
        widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let value = row.get(index).map_or("-", String::as_str);
                let truncated = truncate_text(value, *width);
                let cell = format_cell(&truncated, *width, looks_numeric(&truncated));
                if options.color {
                    colorize_severity(&cell, &truncated)
                } else {
                    cell
                }
            })
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    });

    let mut lines = Vec::with_capacity(2 + rows.len());
    lines.push(header_line);
    lines.push(divider);
    lines.extend(row_lines);
    lines.join("\n")
}

fn min_width(header: &str) -> usize {
    header.chars().count().max(MIN_COLUMN_WIDTH)
}

fn fit_widths(widths: &mut [usize], headers: &[&str], max_width: Option<usize>) {
    let Some(max_width) = max_width else {
        return;
    };

    let separators = widths.len().saturating_sub(1) * SEPARATOR.len();
    let mut total = widths.iter().sum::<usize>() + separators;

    while total > max_width {
        let widest = widths
            .iter()
            .enumerate()
            .filter(|(index, width)| **width > min_width(headers[*index]))
            .max_by_key(|(_, width)| **width)
            .map(|(index, _)| index);

        let Some(index) = widest else {
            break;
        };
        widths[index] -= 1;
        total -= 1;
    }
}

fn truncate_text(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 1 {
        return "…".to_string();
    }

    let mut out: String = value.chars().take(width - 1).collect();
    out.push('…');
    out
}

fn looks_numeric(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.' | 'e'))
        && trimmed.parse::<f64>().is_ok()
}

fn format_cell(value: &str, width: usize, numeric: bool) -> String {
    if numeric {
        format!("{value:>width$}")
    } else {
        format!("{value:<width$}")
    }
}

/// Severity labels: critical and high red, medium yellow, low green.
fn colorize_severity(cell: &str, value: &str) -> String {
    let code = match value.to_ascii_lowercase().as_str() {
        "critical" | "high" => "31",
        "medium" => "33",
        "low" => "32",
        _ => return cell.to_string(),
    };
    format!("\u{1b}[{code}m{cell}\u{1b}[0m")
}
