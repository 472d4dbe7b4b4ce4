//! XLSX report exporter
//!
//! Writes a minimal Office Open XML workbook: one sheet named `Transactions`
//! holding inline-string and numeric cells.

use std::io::{Cursor, Write};
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::domain::export::{ensure_rows, ExportRow, Exporter, EXPORT_COLUMNS};
use crate::domain::DomainError;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Transactions" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

/// Columns written as numbers rather than text
const NUMERIC_COLUMNS: [usize; 4] = [0, 3, 5, 7];

#[derive(Debug, Clone, Default)]
pub struct XlsxExporter;

impl XlsxExporter {
    pub fn new() -> Self {
        Self
    }
}

fn write_error(e: impl std::fmt::Display) -> DomainError {
    DomainError::internal(format!("Failed to write XLSX: {}", e))
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Spreadsheet column letters: 0 -> A, 25 -> Z, 26 -> AA
fn column_name(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

fn text_cell(reference: &str, value: &str) -> String {
    format!(
        r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
        reference,
        escape_xml(value)
    )
}

fn sheet_xml(rows: &[ExportRow]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    xml.push_str(r#"<row r="1">"#);
    for (col, header) in EXPORT_COLUMNS.iter().enumerate() {
        xml.push_str(&text_cell(&format!("{}1", column_name(col)), header));
    }
    xml.push_str("</row>");

    for (i, row) in rows.iter().enumerate() {
        let line = i + 2;
        xml.push_str(&format!(r#"<row r="{}">"#, line));
        for (col, value) in row.cells().iter().enumerate() {
            let reference = format!("{}{}", column_name(col), line);
            if NUMERIC_COLUMNS.contains(&col) {
                xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, value));
            } else {
                xml.push_str(&text_cell(&reference, value));
            }
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

impl Exporter for XlsxExporter {
    fn media_type(&self) -> &'static str {
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    }

    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn export(&self, rows: &[ExportRow]) -> Result<Vec<u8>, DomainError> {
        ensure_rows(rows)?;

        let sheet = sheet_xml(rows);
        let parts: [(&str, &str); 5] = [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", ROOT_RELS),
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
            ("xl/worksheets/sheet1.xml", &sheet),
        ];

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            zip.start_file(name, SimpleFileOptions::default())
                .map_err(write_error)?;
            zip.write_all(content.as_bytes()).map_err(write_error)?;
        }

        let cursor = zip.finish().map_err(write_error)?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn row(name: &str) -> ExportRow {
        ExportRow {
            id: 7,
            name: name.to_string(),
            kind: "income".to_string(),
            category_id: 2,
            category_name: "Salary".to_string(),
            amount: 1000.0,
            date: "2024-03-01T00:00:00Z".to_string(),
            user_id: 1,
        }
    }

    #[test]
    fn test_column_name() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(7), "H");
        assert_eq!(column_name(26), "AA");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("R&D <team>"), "R&amp;D &lt;team&gt;");
    }

    #[test]
    fn test_workbook_package() {
        let bytes = XlsxExporter::new().export(&[row("Pay & bonus")]).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "[Content_Types].xml",
                "_rels/.rels",
                "xl/_rels/workbook.xml.rels",
                "xl/workbook.xml",
                "xl/worksheets/sheet1.xml",
            ]
        );

        let mut sheet = String::new();
        archive
            .by_name("xl/worksheets/sheet1.xml")
            .unwrap()
            .read_to_string(&mut sheet)
            .unwrap();
        assert!(sheet.contains("<t>category_name</t>"));
        assert!(sheet.contains("<t>Pay &amp; bonus</t>"));
        assert!(sheet.contains(r#"<c r="F2"><v>1000</v></c>"#));
    }

    #[test]
    fn test_empty_rows_rejected() {
        assert!(XlsxExporter::new().export(&[]).is_err());
    }
}
