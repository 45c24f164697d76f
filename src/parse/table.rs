//! A minimal CSV table reader/writer.
//!
//! Handles quoted fields (embedded commas, newlines, and `""` escapes),
//! tolerates CRLF line endings, and pads short rows so every row has one
//! cell per column. Field content is otherwise passed through untouched.

/// A parsed tabular file: a header row plus data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Column names from the header row, in file order
    pub columns: Vec<String>,
    /// Data rows; each row has exactly `columns.len()` cells
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Find a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Find a column by case-insensitive, whitespace-trimmed name.
    /// Returns the index and the original header text.
    pub fn column_index_loose(&self, name: &str) -> Option<(usize, &str)> {
        let want = name.trim().to_lowercase();
        self.columns
            .iter()
            .position(|c| c.trim().to_lowercase() == want)
            .map(|i| (i, self.columns[i].as_str()))
    }

    /// Get a cell, or "" if the row/column is out of range
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }
}

/// Parse CSV text into a `Table`. The first record is the header.
/// Returns `None` if the input contains no records at all.
pub fn parse_table(source: &str) -> Option<Table> {
    let mut records = parse_records(source);
    if records.is_empty() {
        return None;
    }
    let columns = records.remove(0);
    let width = columns.len();

    let mut rows = Vec::with_capacity(records.len());
    for mut record in records {
        // Skip fully blank records (trailing newline artifacts)
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        record.resize(width, String::new());
        record.truncate(width);
        rows.push(record);
    }

    Some(Table { columns, rows })
}

/// Split CSV text into records of fields, honoring quotes.
fn parse_records(source: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut saw_any = false;

    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        saw_any = true;
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => {
                record.push(std::mem::take(&mut field));
            }
            '\r' => {
                // Swallow the CR of a CRLF pair; a bare CR ends the record
                if chars.peek() == Some(&'\n') {
                    continue;
                }
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    // Final record without a trailing newline
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    } else if saw_any && records.is_empty() {
        records.push(vec![String::new()]);
    }

    records
}

/// Serialize a `Table` back to CSV text with a trailing newline.
pub fn serialize_table(table: &Table) -> String {
    let mut out = String::new();
    write_record(&mut out, &table.columns);
    for row in &table.rows {
        write_record(&mut out, row);
    }
    out
}

fn write_record(out: &mut String, fields: &[String]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&quote_field(field));
    }
    out.push('\n');
}

/// Quote a field only when it needs it
fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        let mut quoted = String::with_capacity(field.len() + 2);
        quoted.push('"');
        for c in field.chars() {
            if c == '"' {
                quoted.push('"');
            }
            quoted.push(c);
        }
        quoted.push('"');
        quoted
    } else {
        field.to_string()
    }
}
