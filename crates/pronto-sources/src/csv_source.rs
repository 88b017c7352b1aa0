//! CSV files (and CSV text) into raw listing rows.

use std::path::Path;

use pronto_listing::RawRow;

use crate::SourceError;

/// Parses CSV text with a header row. Short rows leave trailing columns unset.
///
/// # Errors
///
/// Returns [`SourceError::Csv`] if the text is not valid CSV.
pub fn parse_csv_rows(text: &str) -> Result<Vec<RawRow>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Reads and parses a CSV file.
///
/// # Errors
///
/// Returns [`SourceError::Io`] if the file cannot be read, or
/// [`SourceError::Csv`] if its contents are not valid CSV.
pub async fn read_csv_file(path: &Path) -> Result<Vec<RawRow>, SourceError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SourceError::io(path, e))?;
    let rows = parse_csv_rows(&text)?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "read csv rows");
    Ok(rows)
}
