//! Builds small XLSX packages in memory for end-to-end tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::{Cursor, Write};

use rota_core::CellAddress;

/// Cell style indices in [`STYLES`]
pub const GREY: u32 = 1;
pub const YELLOW: u32 = 2;
pub const DATE: u32 = 3;
pub const WHITE: u32 = 4;

const STYLES: &str = r#"<?xml version="1.0"?><styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fills count="5"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill><fill><patternFill patternType="solid"><fgColor rgb="FFBFBFBF"/><bgColor indexed="64"/></patternFill></fill><fill><patternFill patternType="solid"><fgColor rgb="FFFFFF00"/><bgColor indexed="64"/></patternFill></fill><fill><patternFill patternType="solid"><fgColor theme="0"/><bgColor indexed="64"/></patternFill></fill></fills><cellXfs count="5"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/><xf numFmtId="0" fontId="0" fillId="2" borderId="0" applyFill="1"/><xf numFmtId="0" fontId="0" fillId="3" borderId="0" applyFill="1"/><xf numFmtId="14" fontId="0" fillId="0" borderId="0" applyNumberFormat="1"/><xf numFmtId="0" fontId="0" fillId="4" borderId="0" applyFill="1"/></cellXfs></styleSheet>"#;

/// One worksheet under construction; rows and columns are 0-based
#[derive(Debug, Clone, Default)]
pub struct SheetXml {
    name: String,
    hidden: bool,
    cells: BTreeMap<(u32, u16), String>,
    row_styles: BTreeMap<u32, u32>,
}

impl SheetXml {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn renamed(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn text(self, row: u32, col: u16, text: &str) -> Self {
        self.styled_text(row, col, text, 0)
    }

    pub fn styled_text(mut self, row: u32, col: u16, text: &str, style: u32) -> Self {
        let r = cell_ref(row, col);
        self.cells.insert(
            (row, col),
            format!(
                r#"<c r="{}" s="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                r,
                style,
                escape(text)
            ),
        );
        self
    }

    pub fn number(mut self, row: u32, col: u16, value: f64, style: u32) -> Self {
        let r = cell_ref(row, col);
        self.cells.insert(
            (row, col),
            format!(r#"<c r="{}" s="{}"><v>{}</v></c>"#, r, style, value),
        );
        self
    }

    /// A styled blank cell
    pub fn fill(mut self, row: u32, col: u16, style: u32) -> Self {
        let r = cell_ref(row, col);
        self.cells
            .insert((row, col), format!(r#"<c r="{}" s="{}"/>"#, r, style));
        self
    }

    /// Paint columns `0..width` of a row with a blank styled cell
    pub fn divider(mut self, row: u32, width: u16, style: u32) -> Self {
        for col in 0..width {
            self = self.fill(row, col, style);
        }
        self
    }

    /// Style a whole row the way Excel does when its header is painted:
    /// `<row s=".." customFormat="1"/>` with no cells
    pub fn row_style(mut self, row: u32, style: u32) -> Self {
        self.row_styles.insert(row, style);
        self
    }

    fn to_xml(&self) -> String {
        let mut rows: BTreeMap<u32, Vec<&str>> = BTreeMap::new();
        for (&(row, _), cell) in &self.cells {
            rows.entry(row).or_default().push(cell);
        }
        for &row in self.row_styles.keys() {
            rows.entry(row).or_default();
        }

        let mut xml = String::from(
            r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
        );
        for (row, cells) in rows {
            let style = self
                .row_styles
                .get(&row)
                .map(|s| format!(r#" s="{}" customFormat="1""#, s))
                .unwrap_or_default();
            if cells.is_empty() {
                xml.push_str(&format!(r#"<row r="{}"{}/>"#, row + 1, style));
            } else {
                xml.push_str(&format!(r#"<row r="{}"{}>"#, row + 1, style));
                xml.extend(cells);
                xml.push_str("</row>");
            }
        }
        xml.push_str("</sheetData></worksheet>");
        xml
    }
}

/// Zip the sheets into an XLSX buffer
pub fn build_xlsx(sheets: &[SheetXml]) -> Vec<u8> {
    let mut content_types = String::from(
        r#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    );
    let mut workbook = String::from(
        r#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    let mut rels = String::from(
        r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );

    for (i, sheet) in sheets.iter().enumerate() {
        let n = i + 1;
        content_types.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            n
        ));
        workbook.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}"{} r:id="rId{}"/>"#,
            escape(&sheet.name),
            n,
            if sheet.hidden { r#" state="hidden""# } else { "" },
            n
        ));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            n, n
        ));
    }
    rels.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        sheets.len() + 1
    ));
    content_types.push_str("</Types>");
    workbook.push_str("</sheets></workbook>");
    rels.push_str("</Relationships>");

    let mut parts = vec![
        ("[Content_Types].xml".to_string(), content_types),
        ("xl/workbook.xml".to_string(), workbook),
        ("xl/_rels/workbook.xml.rels".to_string(), rels),
        ("xl/styles.xml".to_string(), STYLES.to_string()),
    ];
    for (i, sheet) in sheets.iter().enumerate() {
        parts.push((format!("xl/worksheets/sheet{}.xml", i + 1), sheet.to_xml()));
    }

    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options = zip::write::SimpleFileOptions::default();
        for (name, body) in &parts {
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buf
}

fn cell_ref(row: u32, col: u16) -> String {
    CellAddress::new(row, col).to_a1_string()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
