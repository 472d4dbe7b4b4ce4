//! Report exporters

mod csv;
mod xlsx;

pub use self::csv::CsvExporter;
pub use self::xlsx::XlsxExporter;

use crate::domain::export::{ExportFormat, Exporter};

pub fn exporter_for(format: ExportFormat) -> Box<dyn Exporter> {
    match format {
        ExportFormat::Csv => Box::new(CsvExporter::new()),
        ExportFormat::Xlsx => Box::new(XlsxExporter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exporter_for_format() {
        assert_eq!(exporter_for(ExportFormat::Csv).media_type(), "text/csv");
        assert_eq!(exporter_for(ExportFormat::Xlsx).file_name(), "report.xlsx");
    }
}
