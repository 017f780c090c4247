use std::fmt::Write as _;

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::metadata::Envelope;

pub fn render(envelope: &Envelope, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => render_table(envelope),
    }

    Ok(())
}

fn render_table(envelope: &Envelope) {
    print!("{}", envelope.text);
    if !envelope.text.ends_with('\n') {
        println!();
    }

    if !envelope.meta.warnings.is_empty() {
        println!();
        println!("warnings:");
        for warning in &envelope.meta.warnings {
            println!("  - {warning}");
        }
    }
}

/// Column-aligned plain text table.
#[derive(Debug, Clone, Default)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (index, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(index) {
                    Some(width) => *width = (*width).max(len),
                    None => widths.push(len),
                }
            }
        }

        let mut out = String::new();
        write_row(&mut out, &self.headers, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_row(&mut out, &rule, &widths);
        for row in &self.rows {
            write_row(&mut out, row, &widths);
        }
        out
    }
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{}", line.trim_end());
}

/// Fixed two-decimal price formatting.
pub fn price(value: f64) -> String {
    format!("{value:.2}")
}

pub fn optional_price(value: Option<f64>) -> String {
    value.map(price).unwrap_or_else(|| String::from("-"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligns_columns_to_widest_cell() {
        let mut table = TextTable::new(["date", "close"]);
        table.push(vec![String::from("2022-01-03"), price(3817.75)]);
        table.push(vec![String::from("2022-01-04"), optional_price(None)]);

        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "date        close");
        assert_eq!(lines[1], "----------  -------");
        assert_eq!(lines[2], "2022-01-03  3817.75");
        assert_eq!(lines[3], "2022-01-04  -");
    }
}
