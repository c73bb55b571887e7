// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Table reconstruction with rowspan/colspan expansion
//!
//! A `<table>` is flattened into a rectangular grid: a cell spanning R rows
//! and C columns has its text replicated into all R x C covered positions.
//! Spans still open when the table ends are truncated, and positions no
//! cell ever covers stay empty strings.

use std::collections::HashMap;

use crate::dom::Element;

/// A logical grid reconstructed from `<table>` markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Reconstruct the grid from a `<table>` element
    pub fn from_element(table: Element<'_>) -> Self {
        let trs = table.find_all("tr");
        let row_count = trs.len();

        // First pass: figure out how many columns the grid needs. Pending
        // rowspans from earlier rows occupy columns in later ones, so each
        // row's width is its own cells' colspans plus the spans hanging
        // over it.
        let mut colcount = 0;
        let mut hanging: Vec<usize> = Vec::new();
        for (r, tr) in trs.iter().enumerate() {
            let cells = row_cells(tr);
            let mut width = hanging.len();
            for (i, cell) in cells.iter().enumerate() {
                // The last cell counts as one column even with a larger
                // colspan, matching visual table layout.
                if i + 1 < cells.len() {
                    width += colspan_attr(cell).unwrap_or(1).max(1);
                } else {
                    width += 1;
                }
            }
            colcount = colcount.max(width);
            for cell in &cells {
                hanging.push(rowspan_attr(cell, row_count - r));
            }
            hanging = hanging
                .iter()
                .filter(|&&s| s > 1)
                .map(|&s| s - 1)
                .collect();
        }

        // Second pass: fill the grid. pending maps column index to the
        // number of upcoming rows that column is still blocked for.
        let mut grid = vec![vec![String::new(); colcount]; row_count];
        let mut pending: HashMap<usize, usize> = HashMap::new();

        for (r, tr) in trs.iter().enumerate() {
            let mut col = 0;
            for cell in row_cells(tr) {
                while pending.get(&col).copied().unwrap_or(0) > 0 {
                    col += 1;
                }
                if col >= colcount {
                    break;
                }

                let rowspan = rowspan_attr(&cell, row_count - r);
                let colspan = colspan_attr(&cell).unwrap_or(1).max(1).min(colcount - col);
                let text = cell.text().trim().to_string();

                for drow in 0..rowspan {
                    for dcol in 0..colspan {
                        // Spans reaching past the last row are truncated
                        if r + drow < row_count && col + dcol < colcount {
                            grid[r + drow][col + dcol] = text.clone();
                            pending.insert(col + dcol, rowspan);
                        }
                    }
                }
                col += colspan;
            }
            pending = pending
                .iter()
                .filter(|(_, &s)| s > 1)
                .map(|(&c, &s)| (c, s - 1))
                .collect();
        }

        Self { rows: grid }
    }

    /// The reconstructed rows; every row has the same length
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Consume the table, returning its rows
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }

    /// Number of rows in the grid
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// Direct td/th children only; nested tables keep their own cells.
fn row_cells<'a>(tr: &Element<'a>) -> Vec<Element<'a>> {
    tr.children()
        .into_iter()
        .filter(|c| c.name() == "td" || c.name() == "th")
        .collect()
}

fn colspan_attr(cell: &Element<'_>) -> Option<usize> {
    cell.attr("colspan").and_then(|v| v.parse().ok())
}

// rowspan="0" spans to the end of the table, per the HTML spec
fn rowspan_attr(cell: &Element<'_>, rows_left: usize) -> usize {
    match cell.attr("rowspan").and_then(|v| v.parse::<usize>().ok()) {
        Some(0) => rows_left,
        Some(n) => n,
        None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    fn rows(html: &str) -> Vec<Vec<String>> {
        let doc = parse_html(html);
        let table = doc.find("table").unwrap();
        Table::from_element(table).into_rows()
    }

    fn grid(expected: &[&[&str]]) -> Vec<Vec<String>> {
        expected
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_plain_table_transcribes_verbatim() {
        let result = rows(
            r#"<table>
                <tr><th>A</th><th>B</th></tr>
                <tr><td>1</td><td>2</td></tr>
            </table>"#,
        );
        assert_eq!(result, grid(&[&["A", "B"], &["1", "2"]]));
    }

    #[test]
    fn test_colspan_in_header() {
        let result = rows(
            r#"<table border="1">
                <thead>
                    <tr><th colspan="2">The table header</th></tr>
                </thead>
                <tbody>
                    <tr><td>The table body</td><td>with two columns</td></tr>
                </tbody>
            </table>"#,
        );
        assert_eq!(
            result,
            grid(&[
                &["The table header", "The table header"],
                &["The table body", "with two columns"],
            ])
        );
    }

    #[test]
    fn test_rowspan_duplicates_downward() {
        let result = rows(
            r#"<table>
                <tr><td rowspan="2">span</td><td>r0</td></tr>
                <tr><td>r1</td></tr>
            </table>"#,
        );
        assert_eq!(result, grid(&[&["span", "r0"], &["span", "r1"]]));
        // Rectangularity
        assert!(result.iter().all(|r| r.len() == result[0].len()));
    }

    #[test]
    fn test_rowspans_widen_later_rows() {
        let result = rows(
            r#"<table border="1">
                <tr><th>A</th><th>B</th></tr>
                <tr><td rowspan="2">C</td><td rowspan="2">D</td></tr>
                <tr><td>E</td><td>F</td></tr>
                <tr><td>G</td><td>H</td></tr>
            </table>"#,
        );
        assert_eq!(
            result,
            grid(&[
                &["A", "B", "", ""],
                &["C", "D", "", ""],
                &["C", "D", "E", "F"],
                &["G", "H", "", ""],
            ])
        );
    }

    #[test]
    fn test_block_spans_with_colspans() {
        let result = rows(
            r#"<table border="1">
                <tr>
                    <td rowspan="3" colspan="3">A</td>
                    <td>B</td><td>C</td><td>D</td>
                </tr>
                <tr><td colspan="3">E</td></tr>
                <tr><td colspan="1">E</td><td>C</td><td>C</td></tr>
                <tr>
                    <td colspan="1">E</td>
                    <td>C</td><td>C</td><td>C</td><td>C</td><td>C</td>
                </tr>
            </table>"#,
        );
        assert_eq!(
            result,
            grid(&[
                &["A", "A", "A", "B", "C", "D"],
                &["A", "A", "A", "E", "E", "E"],
                &["A", "A", "A", "E", "C", "C"],
                &["E", "C", "C", "C", "C", "C"],
            ])
        );
    }

    #[test]
    fn test_rowspan_past_table_end_truncated() {
        let result = rows(
            r#"<table>
                <tr><td rowspan="5">deep</td><td>x</td></tr>
                <tr><td>y</td></tr>
            </table>"#,
        );
        assert_eq!(result, grid(&[&["deep", "x"], &["deep", "y"]]));
    }

    #[test]
    fn test_colspan_zero_is_a_single_column() {
        // Browsers treat colspan="0" as 1; only rowspan="0" spans onward
        let result = rows(
            r#"<table>
                <tr><td colspan="0">A</td><td>B</td></tr>
            </table>"#,
        );
        assert_eq!(result, grid(&[&["A", "B"]]));
    }

    #[test]
    fn test_rowspan_zero_spans_to_table_end() {
        let result = rows(
            r#"<table>
                <tr><td rowspan="0">S</td><td>x</td></tr>
                <tr><td>y</td></tr>
                <tr><td>z</td></tr>
            </table>"#,
        );
        assert_eq!(
            result,
            grid(&[&["S", "x"], &["S", "y"], &["S", "z"]])
        );
    }

    #[test]
    fn test_empty_table() {
        let result = rows("<table></table>");
        assert!(result.is_empty());
    }
}
