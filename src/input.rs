// src/input.rs
use crate::models::Result;
use tracing::debug;

/// Column the venue names are read from.
pub const NAME_COLUMN: &str = "whole name";

/// Load venue names from the input CSV. The file must have a header row
/// with a "whole name" column; other columns are ignored.
pub async fn load_venue_names(path: &str) -> Result<Vec<String>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|_| format!("Could not find the input file '{}'", path))?;

    parse_venue_names(&contents)
}

fn parse_venue_names(contents: &str) -> Result<Vec<String>> {
    let contents = contents.trim_start_matches('\u{feff}');
    let mut lines = contents.lines();

    let header = lines.next().ok_or("input file is empty")?;
    let columns = split_csv_line(header);
    let name_idx = columns
        .iter()
        .position(|c| c.trim() == NAME_COLUMN)
        .ok_or_else(|| format!("input file must contain a column named '{}'", NAME_COLUMN))?;

    let mut names = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_csv_line(line);
        if let Some(name) = fields.get(name_idx) {
            let name = name.trim();
            if !name.is_empty() {
                names.push(name.to_string());
            }
        }
    }

    debug!("Parsed {} names from input CSV", names.len());
    Ok(names)
}

/// Split one CSV line into fields, honoring double-quoted fields with
/// embedded commas and doubled quotes. Single-line records only.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}
