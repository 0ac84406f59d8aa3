//! Text-oriented XLSX reader
//!
//! Reads just what the comparison engine consumes: the workbook's sheet names
//! and a single sheet's cells as text. Styles, formulas, merged regions, and
//! the rest of the format are ignored; a formula cell contributes its cached
//! value's stored text.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use celldiff_core::{CellGrid, CellRef};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode special characters in XML:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x005f_` = Underscore (escaped underscore)
fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(idx) = rest.find("_x") {
        let (head, tail) = rest.split_at(idx);
        out.push_str(head);

        // A valid escape is exactly _xHHHH_
        let candidate = &tail[2..];
        let decoded = if candidate.len() >= 5
            && candidate.as_bytes()[..4].iter().all(u8::is_ascii_hexdigit)
            && candidate.as_bytes()[4] == b'_'
        {
            u32::from_str_radix(&candidate[..4], 16)
                .ok()
                .and_then(char::from_u32)
        } else {
            None
        };

        match decoded {
            Some(c) => {
                out.push(c);
                rest = &candidate[5..];
            }
            None => {
                out.push_str("_x");
                rest = candidate;
            }
        }
    }

    out.push_str(rest);
    out
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// List sheet names from a file path, in workbook order
    pub fn sheet_names_file<P: AsRef<Path>>(path: P) -> XlsxResult<Vec<String>> {
        let file = File::open(path)?;
        Self::sheet_names(file)
    }

    /// List sheet names from a reader, in workbook order
    pub fn sheet_names<R: Read + Seek>(reader: R) -> XlsxResult<Vec<String>> {
        let mut archive = zip::ZipArchive::new(reader)?;
        Self::check_package(&mut archive)?;

        let sheets = Self::read_workbook_xml(&mut archive)?;
        Ok(sheets.into_iter().map(|(name, _)| name).collect())
    }

    /// Read one sheet from a file path into a text grid
    pub fn read_sheet_file<P: AsRef<Path>>(path: P, sheet_name: &str) -> XlsxResult<CellGrid> {
        let file = File::open(path)?;
        Self::read_sheet(file, sheet_name)
    }

    /// Read the named sheet from a reader into a text grid
    pub fn read_sheet<R: Read + Seek>(reader: R, sheet_name: &str) -> XlsxResult<CellGrid> {
        let mut archive = zip::ZipArchive::new(reader)?;
        Self::check_package(&mut archive)?;

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let sheets = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let r_id = sheets
            .iter()
            .find(|(name, _)| name == sheet_name)
            .map(|(_, r_id)| r_id.clone())
            .ok_or_else(|| XlsxError::SheetNotFound(sheet_name.to_string()))?;

        let path = sheet_paths
            .get(&r_id)
            .cloned()
            .ok_or_else(|| XlsxError::MissingPart(format!("worksheet part for '{}'", sheet_name)))?;

        let mut grid = CellGrid::new();
        Self::read_worksheet(&mut archive, &path, &mut grid, &shared_strings)?;
        Ok(grid)
    }

    fn check_package<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> XlsxResult<()> {
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }
        Ok(())
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    // Rich-text runs contribute every <t> inside the <si>
                    b"t" if in_si => {
                        in_t = true;
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        current_string.clear();
                        in_si = false;
                    }
                    b"t" => {
                        in_t = false;
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    if let Ok(text) = e.unescape() {
                        current_string.push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read workbook.xml to get sheet names and rIds
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                    let mut name = None;
                    let mut r_id = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => {
                                name = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"r:id" => {
                                r_id = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            _ => {}
                        }
                    }

                    if let (Some(name), Some(r_id)) = (name, r_id) {
                        sheets.push((name, r_id));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to get sheet file paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut target = None;
                    let mut rel_type = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => {
                                id = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"Target" => {
                                target = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"Type" => {
                                rel_type = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            _ => {}
                        }
                    }

                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to xl/ unless package-absolute
                            let full_path = if let Some(stripped) = target.strip_prefix('/') {
                                stripped.to_string()
                            } else {
                                format!("xl/{}", target)
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read a worksheet's cells into the grid as text
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        grid: &mut CellGrid,
        shared_strings: &[String],
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();

        // Position of the cell being parsed. Cells without an r attribute
        // take the next column of the current row.
        let mut current_row: u32 = 0;
        let mut next_col: u32 = 0;
        let mut cell_pos: Option<(u32, u32)> = None;
        let mut cell_type: Option<String> = None;
        let mut cell_value: Option<String> = None;
        let mut inline_value: Option<String> = None;
        let mut in_cell = false;
        let mut in_value = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;
        let mut in_formula = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"row" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"r" {
                                if let Some(n) = attr
                                    .unescape_value()
                                    .ok()
                                    .and_then(|s| s.parse::<u32>().ok())
                                {
                                    if n >= 1 {
                                        current_row = n - 1;
                                    }
                                }
                            }
                        }
                        next_col = 0;
                    }
                    b"c" => {
                        in_cell = true;
                        cell_type = None;
                        cell_value = None;
                        inline_value = None;
                        cell_pos = Some(Self::cell_position(
                            &e,
                            current_row,
                            &mut next_col,
                        ));
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"t" {
                                cell_type = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                        }
                    }
                    b"v" if in_cell => {
                        in_value = true;
                    }
                    b"is" if in_cell => {
                        in_inline_str = true;
                        inline_value = Some(String::new());
                    }
                    b"t" if in_inline_str => {
                        in_inline_text = true;
                    }
                    b"f" if in_cell => {
                        in_formula = true;
                    }
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"c" => {
                    // Value-less cell; advances the implicit column only
                    let _ = Self::cell_position(&e, current_row, &mut next_col);
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"row" => {
                        current_row += 1;
                        next_col = 0;
                    }
                    b"c" => {
                        if let Some((row, col)) = cell_pos.take() {
                            if let Some(text) = Self::cell_text(
                                cell_type.as_deref(),
                                cell_value.take(),
                                inline_value.take(),
                                shared_strings,
                            ) {
                                grid.set(row, col, text);
                            }
                        }
                        in_cell = false;
                    }
                    b"v" => {
                        in_value = false;
                    }
                    b"is" => {
                        in_inline_str = false;
                    }
                    b"t" => {
                        in_inline_text = false;
                    }
                    b"f" => {
                        in_formula = false;
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if in_value && !in_formula {
                        if let Ok(text) = e.unescape() {
                            cell_value
                                .get_or_insert_with(String::new)
                                .push_str(&text);
                        }
                    } else if in_inline_text {
                        if let Ok(text) = e.unescape() {
                            inline_value
                                .get_or_insert_with(String::new)
                                .push_str(&text);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    /// Resolve a `<c>` element's position from its r attribute, falling back
    /// to the next implicit column of the current row
    fn cell_position(
        e: &quick_xml::events::BytesStart<'_>,
        current_row: u32,
        next_col: &mut u32,
    ) -> (u32, u32) {
        let mut pos = None;
        for attr in e.attributes().flatten() {
            if attr.key.as_ref() == b"r" {
                if let Some(cell) = attr
                    .unescape_value()
                    .ok()
                    .and_then(|s| CellRef::parse(&s).ok())
                {
                    pos = Some((cell.row, cell.col));
                }
            }
        }

        let (row, col) = pos.unwrap_or((current_row, *next_col));
        *next_col = col + 1;
        (row, col)
    }

    /// Render a parsed cell as text
    ///
    /// All values are carried as text: strings are decoded, numbers and
    /// cached formula results keep their stored lexical form, booleans read
    /// as TRUE/FALSE, error literals pass through verbatim.
    fn cell_text(
        cell_type: Option<&str>,
        value: Option<String>,
        inline: Option<String>,
        shared_strings: &[String],
    ) -> Option<String> {
        match cell_type {
            Some("s") => {
                let raw = value?;
                match raw.trim().parse::<usize>().ok().and_then(|i| shared_strings.get(i)) {
                    Some(s) => Some(s.clone()),
                    None => {
                        log::warn!("shared string index '{}' out of range", raw);
                        None
                    }
                }
            }
            Some("inlineStr") => inline.map(|s| decode_excel_escapes(&s)),
            Some("b") => value.map(|v| {
                if v.trim() == "1" {
                    "TRUE".to_string()
                } else {
                    "FALSE".to_string()
                }
            }),
            Some("str") => value.map(|v| decode_excel_escapes(&v)),
            // Numbers, error literals, and untyped cells keep the raw text
            _ => value,
        }
    }
}
