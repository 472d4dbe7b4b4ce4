//! CSV report exporter

use crate::domain::export::{ensure_rows, ExportRow, Exporter, EXPORT_COLUMNS};
use crate::domain::DomainError;

#[derive(Debug, Clone, Default)]
pub struct CsvExporter;

impl CsvExporter {
    pub fn new() -> Self {
        Self
    }
}

fn write_error(e: impl std::fmt::Display) -> DomainError {
    DomainError::internal(format!("Failed to write CSV: {}", e))
}

impl Exporter for CsvExporter {
    fn media_type(&self) -> &'static str {
        "text/csv"
    }

    fn extension(&self) -> &'static str {
        "csv"
    }

    fn export(&self, rows: &[ExportRow]) -> Result<Vec<u8>, DomainError> {
        ensure_rows(rows)?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(EXPORT_COLUMNS).map_err(write_error)?;
        for row in rows {
            writer.write_record(row.cells()).map_err(write_error)?;
        }

        writer.into_inner().map_err(write_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, name: &str) -> ExportRow {
        ExportRow {
            id,
            name: name.to_string(),
            kind: "expense".to_string(),
            category_id: 3,
            category_name: "Food".to_string(),
            amount: 12.5,
            date: "2024-03-01T12:00:00Z".to_string(),
            user_id: 1,
        }
    }

    #[test]
    fn test_header_and_rows() {
        let bytes = CsvExporter::new()
            .export(&[row(1, "Lunch"), row(2, "Dinner, late")])
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "id,name,type,category_id,category_name,amount,date,user_id"
        );
        assert_eq!(lines[1], "1,Lunch,expense,3,Food,12.5,2024-03-01T12:00:00Z,1");
        assert_eq!(
            lines[2],
            "2,\"Dinner, late\",expense,3,Food,12.5,2024-03-01T12:00:00Z,1"
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_rows_rejected() {
        let err = CsvExporter::new().export(&[]).unwrap_err();
        assert_eq!(err.message(), "No data to export");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(CsvExporter::new().file_name(), "report.csv");
    }
}
