//! Plain column tables
//!
//! Whitespace-aligned, no borders. Headers are dimmed and the first column
//! (the IP name) is highlighted.

use crossterm::style::Stylize;

#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Missing cells render empty; extra cells are dropped.
    pub fn push<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.rows
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(h.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Lines without styling, for logs and tests.
    pub fn lines(&self) -> Vec<String> {
        let widths = self.widths();
        let header: Vec<String> = self.headers.iter().map(|h| h.to_string()).collect();
        std::iter::once(header)
            .chain(self.rows.iter().cloned())
            .map(|row| format_row(&row, &widths))
            .collect()
    }

    pub fn print(&self) {
        let widths = self.widths();
        let header: Vec<String> = self.headers.iter().map(|h| h.to_string()).collect();
        println!("  {}", format_row(&header, &widths).dark_grey());

        for row in &self.rows {
            let (name, rest) = row.split_first().map_or(("", &[][..]), |(n, r)| (n.as_str(), r));
            let nw = widths.first().copied().unwrap_or(0);
            let name = format!("{name:<nw$}");
            let rest = format_row(rest, widths.get(1..).unwrap_or_default());
            if rest.is_empty() {
                println!("  {}", name.cyan());
            } else {
                println!("  {}  {rest}", name.cyan());
            }
        }
    }
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{cell:<w$}"))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}
