//! Report workbook writer
//!
//! Serializes a [`ComparisonReport`] into a single-sheet XLSX workbook. The
//! style table is fixed: duplicate values get a solid blue fill, unique
//! values a solid yellow fill. Output is assembled in memory; there is no
//! temporary-file round trip.

use std::fs::File;
use std::io::{Cursor, Seek, Write};
use std::path::Path;

use crate::error::XlsxResult;
use celldiff_core::{CellRef, ComparisonReport, Highlight};

/// Fill color for values repeating within their own cell (ARGB)
const DUPLICATE_FILL_RGB: &str = "FF00B0F0";

/// Fill color for values present on one side only (ARGB)
const UNIQUE_FILL_RGB: &str = "FFFFFF00";

/// Report workbook writer
pub struct ReportWriter;

impl ReportWriter {
    /// Write a report to a file path
    pub fn write_file<P: AsRef<Path>>(report: &ComparisonReport, path: P) -> XlsxResult<()> {
        let file = File::create(path)?;
        Self::write(report, file)
    }

    /// Write a report into an in-memory buffer
    pub fn write_bytes(report: &ComparisonReport) -> XlsxResult<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        Self::write(report, &mut buffer)?;
        Ok(buffer.into_inner())
    }

    /// Write a report to a writer
    pub fn write<W: Write + Seek>(report: &ComparisonReport, writer: W) -> XlsxResult<()> {
        let mut zip = zip::ZipWriter::new(writer);

        Self::write_content_types(&mut zip)?;
        Self::write_root_rels(&mut zip)?;
        Self::write_workbook_xml(&mut zip, report)?;
        Self::write_workbook_rels(&mut zip)?;
        Self::write_styles_xml(&mut zip)?;
        Self::write_worksheet(&mut zip, report)?;

        zip.finish()?;
        Ok(())
    }

    fn write_content_types<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
    <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_root_rels<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("_rels/.rels", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_xml<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        report: &ComparisonReport,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/workbook.xml", options)?;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>
        <sheet name="{}" sheetId="1" r:id="rId1"/>
    </sheets>
</workbook>"#,
            Self::escape_xml(&report.sheet_name)
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_rels<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/_rels/workbook.xml.rels", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Fixed style table: cellXfs 0 = plain, 1 = duplicate fill, 2 = unique
    /// fill. The first two fills (none, gray125) are required by the format.
    fn write_styles_xml<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/styles.xml", options)?;

        let content = Self::styles_xml();
        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn styles_xml() -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <fonts count="1">
        <font><sz val="11"/><name val="Calibri"/></font>
    </fonts>
    <fills count="4">
        <fill><patternFill patternType="none"/></fill>
        <fill><patternFill patternType="gray125"/></fill>
        <fill><patternFill patternType="solid"><fgColor rgb="{dup}"/><bgColor rgb="{dup}"/></patternFill></fill>
        <fill><patternFill patternType="solid"><fgColor rgb="{uniq}"/><bgColor rgb="{uniq}"/></patternFill></fill>
    </fills>
    <borders count="1">
        <border><left/><right/><top/><bottom/><diagonal/></border>
    </borders>
    <cellStyleXfs count="1">
        <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
    </cellStyleXfs>
    <cellXfs count="3">
        <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
        <xf numFmtId="0" fontId="0" fillId="2" borderId="0" xfId="0" applyFill="1"/>
        <xf numFmtId="0" fontId="0" fillId="3" borderId="0" xfId="0" applyFill="1"/>
    </cellXfs>
</styleSheet>"#,
            dup = DUPLICATE_FILL_RGB,
            uniq = UNIQUE_FILL_RGB,
        )
    }

    fn xf_id(highlight: Highlight) -> u32 {
        match highlight {
            Highlight::None => 0,
            Highlight::Duplicate => 1,
            Highlight::Unique => 2,
        }
    }

    fn write_worksheet<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        report: &ComparisonReport,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/worksheets/sheet1.xml", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        // Column width hints
        content.push_str("\n    <cols>");
        for (i, col) in report.columns.iter().enumerate() {
            content.push_str(&format!(
                "\n        <col min=\"{idx}\" max=\"{idx}\" width=\"{width}\" customWidth=\"1\"/>",
                idx = i + 1,
                width = col.width_hint(),
            ));
        }
        content.push_str("\n    </cols>");

        content.push_str("\n    <sheetData>");

        // Header row
        content.push_str("\n        <row r=\"1\">");
        for (i, col) in report.columns.iter().enumerate() {
            Self::push_cell(&mut content, 0, i as u32, &col.header, Highlight::None);
        }
        content.push_str("\n        </row>");

        // Data rows; each column is filled positionally from its own source
        for row_idx in 0..report.row_count() {
            content.push_str(&format!("\n        <row r=\"{}\">", row_idx + 2));
            for (col_idx, col) in report.columns.iter().enumerate() {
                if let Some(cell) = col.cells.get(row_idx) {
                    Self::push_cell(
                        &mut content,
                        row_idx as u32 + 1,
                        col_idx as u32,
                        &cell.text,
                        cell.highlight,
                    );
                }
            }
            content.push_str("\n        </row>");
        }

        content.push_str("\n    </sheetData>\n</worksheet>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn push_cell(content: &mut String, row: u32, col: u32, text: &str, highlight: Highlight) {
        let cell_ref = CellRef::new(row, col).to_a1_string();
        let xf_id = Self::xf_id(highlight);
        let style_attr = if xf_id != 0 {
            format!(" s=\"{}\"", xf_id)
        } else {
            String::new()
        };

        content.push_str(&format!(
            "\n            <c r=\"{}\"{} t=\"inlineStr\"><is><t>{}</t></is></c>",
            cell_ref,
            style_attr,
            Self::escape_xml(text)
        ));
    }

    fn escape_xml(s: &str) -> String {
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use celldiff_core::{build_report, compare};

    fn tokens(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_styles_xml_carries_both_fills() {
        let xml = ReportWriter::styles_xml();
        assert!(xml.contains(DUPLICATE_FILL_RGB));
        assert!(xml.contains(UNIQUE_FILL_RGB));
        assert!(xml.contains("cellXfs count=\"3\""));
    }

    #[test]
    fn test_xf_id_mapping() {
        assert_eq!(ReportWriter::xf_id(Highlight::None), 0);
        assert_eq!(ReportWriter::xf_id(Highlight::Duplicate), 1);
        assert_eq!(ReportWriter::xf_id(Highlight::Unique), 2);
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(
            ReportWriter::escape_xml(r#"a<b>&"c'"#),
            "a&lt;b&gt;&amp;&quot;c&apos;"
        );
    }

    #[test]
    fn test_write_bytes_produces_a_zip_package() {
        let cmp = compare(tokens(&["a", "a"]), tokens(&["b"]));
        let report = build_report("A1", "B1", &cmp);

        let bytes = ReportWriter::write_bytes(&report).unwrap();
        // ZIP local file header magic
        assert_eq!(&bytes[..4], &b"PK\x03\x04"[..]);
    }

    #[test]
    fn test_highlighted_cells_carry_style_indices() {
        let cmp = compare(tokens(&["dup", "dup", "solo"]), tokens(&["dup"]));
        let report = build_report("A1", "B1", &cmp);

        let mut content = String::new();
        // Raw-left column: "dup" rows are duplicates
        ReportWriter::push_cell(&mut content, 1, 0, "dup", Highlight::Duplicate);
        assert!(content.contains("s=\"1\""));

        content.clear();
        ReportWriter::push_cell(&mut content, 1, 1, "solo", Highlight::Unique);
        assert!(content.contains("s=\"2\""));

        content.clear();
        ReportWriter::push_cell(&mut content, 0, 0, &report.columns[0].header, Highlight::None);
        assert!(!content.contains(" s="));
    }
}
