//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::read_styles_xml;
use rota_core::style::CellStyle;
use rota_core::{CellAddress, CellError, CellValue, Workbook, Worksheet, MAX_COLS};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode special characters in XML:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '_' || chars.peek() != Some(&'x') {
            result.push(c);
            continue;
        }
        chars.next(); // consume 'x'

        let mut hex_chars = String::with_capacity(4);
        while hex_chars.len() < 4 {
            match chars.peek() {
                Some(&ch) if ch.is_ascii_hexdigit() => {
                    hex_chars.push(ch);
                    chars.next();
                }
                _ => break,
            }
        }

        let decoded = if hex_chars.len() == 4 && chars.peek() == Some(&'_') {
            u32::from_str_radix(&hex_chars, 16)
                .ok()
                .and_then(char::from_u32)
        } else {
            None
        };

        match decoded {
            Some(ch) => {
                chars.next(); // consume closing '_'
                result.push(ch);
            }
            None => {
                // Not an escape sequence, keep what was consumed
                result.push_str("_x");
                result.push_str(&hex_chars);
            }
        }
    }

    result
}

/// Convert an Excel serial number to a date-time.
///
/// The 1900 system counts from 1899-12-30 and includes Excel's phantom
/// 1900-02-29 (serial 60); serials below 61 are shifted by one day to
/// compensate. The 1904 system counts from 1904-01-01.
pub fn serial_to_datetime(serial: f64, date_1904: bool) -> Option<NaiveDateTime> {
    // 2958466 is 10000-01-01, past Excel's last representable day
    if !serial.is_finite() || !(0.0..2_958_466.0).contains(&serial) {
        return None;
    }

    let (epoch, serial) = if date_1904 {
        (NaiveDate::from_ymd_opt(1904, 1, 1)?, serial)
    } else if serial < 61.0 {
        (NaiveDate::from_ymd_opt(1899, 12, 31)?, serial)
    } else {
        (NaiveDate::from_ymd_opt(1899, 12, 30)?, serial)
    };

    let days = serial.trunc() as i64;
    let seconds = ((serial - serial.trunc()) * 86_400.0).round() as i64;

    epoch
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::seconds(seconds))
}

/// A `<sheet>` entry of workbook.xml
#[derive(Debug, Clone)]
struct SheetEntry {
    name: String,
    r_id: String,
    visible: bool,
}

/// Contents of workbook.xml that drive the rest of the read
#[derive(Debug, Default)]
struct WorkbookXml {
    sheets: Vec<SheetEntry>,
    date_1904: bool,
}

/// Per-read lookup tables shared by every worksheet
struct ReadContext<'a> {
    shared_strings: &'a [String],
    cell_styles: &'a [CellStyle],
    date_1904: bool,
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Read a workbook from an in-memory buffer
    pub fn read_bytes(bytes: &[u8]) -> XlsxResult<Workbook> {
        Self::read(Cursor::new(bytes))
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let cell_styles = Self::read_styles(&mut archive)?;
        let workbook_xml = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::empty();
        workbook.settings_mut().date_1904 = workbook_xml.date_1904;

        let ctx = ReadContext {
            shared_strings: &shared_strings,
            cell_styles: &cell_styles,
            date_1904: workbook_xml.date_1904,
        };

        for entry in &workbook_xml.sheets {
            let Some(path) = sheet_paths.get(&entry.r_id) else {
                log::warn!(
                    "sheet '{}' references unknown relationship {}",
                    entry.name,
                    entry.r_id
                );
                continue;
            };

            let sheet_idx = workbook.add_worksheet_with_name(&entry.name)?;
            let worksheet = workbook
                .worksheet_mut(sheet_idx)
                .ok_or_else(|| XlsxError::Parse(format!("sheet index {} vanished", sheet_idx)))?;
            worksheet.set_visible(entry.visible);
            Self::read_worksheet(&mut archive, path, worksheet, &ctx)?;

            log::debug!(
                "read sheet '{}' ({} cells, visible: {})",
                entry.name,
                worksheet.cell_count(),
                entry.visible
            );
        }

        Ok(workbook)
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
        // Rich-text runs carry significant leading/trailing spaces
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;
        // Phonetic runs (<rPh>) repeat the text as furigana; skip them
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        current_string.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
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

    fn read_styles<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<CellStyle>> {
        match archive.by_name("xl/styles.xml") {
            Ok(file) => read_styles_xml(file),
            Err(_) => Ok(vec![CellStyle::default()]),
        }
    }

    /// Read workbook.xml to get sheet names, rIds and visibility
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<WorkbookXml> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut parsed = WorkbookXml::default();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"sheet" => {
                        let mut name = None;
                        let mut r_id = None;
                        let mut visible = true;

                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"name" => {
                                    name = attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                b"r:id" => {
                                    r_id = attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                b"state" => {
                                    visible = attr
                                        .unescape_value()
                                        .ok()
                                        .map_or(true, |s| s.as_ref() == "visible");
                                }
                                _ => {}
                            }
                        }

                        if let (Some(name), Some(r_id)) = (name, r_id) {
                            parsed.sheets.push(SheetEntry {
                                name,
                                r_id,
                                visible,
                            });
                        }
                    }
                    b"workbookPr" => {
                        parsed.date_1904 = e
                            .attributes()
                            .flatten()
                            .find(|a| a.key.as_ref() == b"date1904")
                            .and_then(|a| a.unescape_value().ok())
                            .map_or(false, |s| is_true(&s));
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(parsed)
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

                    // Only include worksheet relationships
                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to xl/ folder
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
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

    /// Read a worksheet from the archive
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        worksheet: &mut Worksheet,
        ctx: &ReadContext<'_>,
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        // Inline strings keep their whitespace; numbers tolerate it
        xml_reader.trim_text(false);

        let mut buf = Vec::new();

        let mut formats = SheetFormats::default();
        let mut last_row = 0u32;
        let mut cell = PendingCell::default();
        let mut in_cell = false;
        let mut in_value = false;
        let mut in_formula = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"row" => {
                        let row = RowFormat::from_attrs(&e, last_row);
                        last_row = row.row;
                        Self::apply_row_format(worksheet, &row, ctx, path)?;
                        formats.current_row = row.default_style();
                    }
                    b"c" => {
                        in_cell = true;
                        cell = PendingCell::from_attrs(&e);
                    }
                    b"v" if in_cell => in_value = true,
                    b"f" if in_cell => {
                        in_formula = true;
                        cell.formula.get_or_insert_with(String::new);
                    }
                    b"is" if in_cell => in_inline_str = true,
                    b"t" if in_inline_str => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    // A row painted from its header is written without cells
                    b"row" => {
                        let row = RowFormat::from_attrs(&e, last_row);
                        last_row = row.row;
                        Self::apply_row_format(worksheet, &row, ctx, path)?;
                    }
                    b"col" => {
                        if let Some(span) = ColumnFormat::from_attrs(&e) {
                            let at = format!("columns {}-{}", span.first + 1, span.last + 1);
                            if let Some(style) = Self::lookup_style(ctx, span.style, path, &at) {
                                if !style.is_default() {
                                    worksheet.set_column_style(span.first, span.last, style)?;
                                }
                            }
                            formats.columns.push(span);
                        }
                    }
                    // Self-closing <c r=".." s=".."/>: a styled blank
                    b"c" => {
                        let blank = PendingCell::from_attrs(&e);
                        Self::process_cell(worksheet, &blank, &formats, ctx, path)?;
                    }
                    // Shared-formula children are written as <f t="shared" si="0"/>
                    b"f" if in_cell => {
                        cell.formula.get_or_insert_with(String::new);
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"row" => formats.current_row = None,
                    b"c" => {
                        Self::process_cell(worksheet, &cell, &formats, ctx, path)?;
                        in_cell = false;
                    }
                    b"v" => in_value = false,
                    b"f" => in_formula = false,
                    b"is" => in_inline_str = false,
                    b"t" if in_inline_str => in_inline_text = false,
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if in_value || in_formula || in_inline_text {
                        let text = e
                            .unescape()
                            .map_err(|err| XlsxError::Parse(format!("{}: {}", path, err)))?;
                        if in_value {
                            cell.value.get_or_insert_with(String::new).push_str(&text);
                        } else if in_formula {
                            if let Some(f) = cell.formula.as_mut() {
                                f.push_str(&text);
                            }
                        } else {
                            cell.inline.get_or_insert_with(String::new).push_str(&text);
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

    /// Record a row's default style on the worksheet
    fn apply_row_format(
        worksheet: &mut Worksheet,
        row: &RowFormat,
        ctx: &ReadContext<'_>,
        path: &str,
    ) -> XlsxResult<()> {
        let Some(index) = row.default_style() else {
            return Ok(());
        };
        let at = format!("row {}", row.row);
        if let Some(style) = Self::lookup_style(ctx, index, path, &at) {
            if row.row > 0 && !style.is_default() {
                worksheet.set_row_style(row.row - 1, style)?;
            }
        }
        Ok(())
    }

    /// Look up a `cellXfs` entry. Index 0 is the default style; an index
    /// past the end of the table is logged and read as unstyled.
    fn lookup_style<'a>(
        ctx: &ReadContext<'a>,
        index: u32,
        path: &str,
        at: &str,
    ) -> Option<&'a CellStyle> {
        if index == 0 {
            return None;
        }
        let style = ctx.cell_styles.get(index as usize);
        if style.is_none() {
            log::warn!(
                "{}: {} references style {} but only {} are defined; reading it unstyled",
                path,
                at,
                index,
                ctx.cell_styles.len()
            );
        }
        style
    }

    /// Process a cell and add it to the worksheet
    fn process_cell(
        worksheet: &mut Worksheet,
        cell: &PendingCell,
        formats: &SheetFormats,
        ctx: &ReadContext<'_>,
        path: &str,
    ) -> XlsxResult<()> {
        let Some(cell_ref) = cell.reference.as_deref() else {
            log::debug!("skipping cell without a reference");
            return Ok(());
        };
        let addr = CellAddress::parse(cell_ref).map_err(|e| {
            XlsxError::Parse(format!("Invalid cell reference '{}': {}", cell_ref, e))
        })?;

        let style = cell
            .style
            .or_else(|| formats.default_for(addr.col))
            .and_then(|s| Self::lookup_style(ctx, s, path, cell_ref));
        let is_date_format = style.map_or(false, |s| s.number_format.is_date_format());

        let raw = Self::convert_value(cell, ctx, is_date_format)?;
        let value = match cell.formula.as_deref() {
            Some(f) => {
                let text = if f.starts_with('=') {
                    f.to_string()
                } else {
                    format!("={}", f)
                };
                CellValue::formula(text, Some(raw).filter(|v| !v.is_empty()))
            }
            None => raw,
        };

        if !value.is_empty() {
            worksheet.set_cell_value_at(addr.row, addr.col, value)?;
        }
        if let Some(style) = style {
            if !style.is_default() {
                worksheet.set_cell_style_at(addr.row, addr.col, style)?;
            }
        }

        Ok(())
    }

    /// Convert the raw `<v>`/`<is>` text of a cell into a value
    fn convert_value(
        cell: &PendingCell,
        ctx: &ReadContext<'_>,
        is_date_format: bool,
    ) -> XlsxResult<CellValue> {
        if cell.cell_type.as_deref() == Some("inlineStr") {
            return Ok(cell
                .inline
                .as_deref()
                .map(|s| CellValue::string(decode_excel_escapes(s)))
                .unwrap_or_default());
        }

        let Some(value) = cell.value.as_deref() else {
            return Ok(CellValue::Empty);
        };

        Ok(match cell.cell_type.as_deref() {
            // Shared string
            Some("s") => {
                let idx: usize = value.trim().parse().map_err(|_| {
                    XlsxError::Parse(format!("Invalid shared string index: {}", value))
                })?;
                let s = ctx.shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                })?;
                CellValue::string(s.as_str())
            }

            // Boolean
            Some("b") => CellValue::Boolean(value.trim() == "1" || value.eq_ignore_ascii_case("true")),

            // Error
            Some("e") => CellError::parse(value.trim())
                .map(CellValue::Error)
                .unwrap_or_else(|| CellValue::string(value)),

            // Formula string result
            Some("str") => CellValue::string(decode_excel_escapes(value)),

            // ISO 8601 date cell (t="d")
            Some("d") => parse_iso_datetime(value.trim())
                .map(CellValue::DateTime)
                .unwrap_or_else(|| CellValue::string(value)),

            // Number (default type or explicit "n")
            None | Some("n") => match value.trim().parse::<f64>() {
                Ok(n) if is_date_format => serial_to_datetime(n, ctx.date_1904)
                    .map(CellValue::DateTime)
                    .unwrap_or(CellValue::Number(n)),
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::string(value),
            },

            // Unknown type - treat as string
            Some(_) => CellValue::string(value),
        })
    }
}

/// A `<c>` element being assembled from its attributes and children
#[derive(Debug, Default)]
struct PendingCell {
    reference: Option<String>,
    cell_type: Option<String>,
    style: Option<u32>,
    value: Option<String>,
    formula: Option<String>,
    inline: Option<String>,
}

impl PendingCell {
    fn from_attrs(e: &BytesStart<'_>) -> Self {
        let mut cell = PendingCell::default();
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => {
                    cell.reference = attr.unescape_value().ok().map(|s| s.to_string());
                }
                b"t" => {
                    cell.cell_type = attr.unescape_value().ok().map(|s| s.to_string());
                }
                b"s" => {
                    cell.style = attr
                        .unescape_value()
                        .ok()
                        .and_then(|s| s.parse::<u32>().ok());
                }
                _ => {}
            }
        }
        cell
    }
}

/// Default-style attributes of a `<row>` element
#[derive(Debug)]
struct RowFormat {
    /// 1-based row number
    row: u32,
    style: Option<u32>,
    custom_format: bool,
}

impl RowFormat {
    /// `r` may be omitted, in which case the row follows `previous`
    fn from_attrs(e: &BytesStart<'_>, previous: u32) -> Self {
        let mut row = RowFormat {
            row: previous.saturating_add(1),
            style: None,
            custom_format: false,
        };
        for attr in e.attributes().flatten() {
            let Ok(value) = attr.unescape_value() else {
                continue;
            };
            match attr.key.as_ref() {
                b"r" => {
                    if let Ok(r) = value.parse::<u32>() {
                        row.row = r;
                    }
                }
                b"s" => row.style = value.parse::<u32>().ok(),
                b"customFormat" => row.custom_format = is_true(&value),
                _ => {}
            }
        }
        row
    }

    /// Style the row applies to its cells; `s` only counts with `customFormat`
    fn default_style(&self) -> Option<u32> {
        self.style.filter(|_| self.custom_format)
    }
}

/// A `<col>` span with a default style, as 0-based columns
#[derive(Debug)]
struct ColumnFormat {
    first: u16,
    last: u16,
    style: u32,
}

impl ColumnFormat {
    fn from_attrs(e: &BytesStart<'_>) -> Option<Self> {
        let (mut min, mut max, mut style) = (None, None, None);
        for attr in e.attributes().flatten() {
            let Ok(value) = attr.unescape_value() else {
                continue;
            };
            match attr.key.as_ref() {
                b"min" => min = value.parse::<u16>().ok(),
                b"max" => max = value.parse::<u16>().ok(),
                b"style" => style = value.parse::<u32>().ok(),
                _ => {}
            }
        }
        let (min, style) = (min.filter(|&m| m > 0 && m <= MAX_COLS)?, style?);
        let max = max.unwrap_or(min).clamp(min, MAX_COLS);
        Some(Self {
            first: min - 1,
            last: max - 1,
            style,
        })
    }
}

/// Row and column default styles in effect while reading cells
#[derive(Debug, Default)]
struct SheetFormats {
    /// Default style of the `<row>` being read
    current_row: Option<u32>,
    columns: Vec<ColumnFormat>,
}

impl SheetFormats {
    /// Style index for a cell written without an `s` attribute
    fn default_for(&self, col: u16) -> Option<u32> {
        self.current_row.or_else(|| {
            self.columns
                .iter()
                .rev()
                .find(|span| (span.first..=span.last).contains(&col))
                .map(|span| span.style)
        })
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0))
}

fn is_true(s: &str) -> bool {
    s == "1" || s.eq_ignore_ascii_case("true")
}
