//! Reading hand-assembled XLSX packages

use std::io::{Cursor, Write};

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rota_core::{CellValue, Color, FillStyle};
use rota_xlsx::{XlsxError, XlsxReader};

const CONTENT_TYPES: &str = r#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/sheet2.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0"?><styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fills count="3"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill><fill><patternFill patternType="solid"><fgColor rgb="FF808080"/><bgColor indexed="64"/></patternFill></fill></fills><cellXfs count="3"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/><xf numFmtId="0" fontId="0" fillId="2" borderId="0" applyFill="1"/><xf numFmtId="14" fontId="0" fillId="0" borderId="0" applyNumberFormat="1"/></cellXfs></styleSheet>"#;

const SHARED_STRINGS: &str = r#"<?xml version="1.0"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="3" uniqueCount="3"><si><t>12 High Street_x000a_Leeds LS1 4AB</t></si><si><r><t xml:space="preserve">John </t></r><r><rPr><b/></rPr><t>Smith</t></r></si><si/></sst>"#;

const SHEET1: &str = r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" s="2"><v>45000</v></c><c r="C1"><v>45001</v></c></row>
<row r="2"><c r="A2" s="1"/><c r="B2" s="1"/><c r="C2" t="inlineStr"><is><t>Tel: 07700 900123</t></is></c></row>
<row r="3"><c r="A3" t="s"><v>1</v></c><c r="B3" t="b"><v>1</v></c><c r="C3" t="e"><v>#N/A</v></c><c r="D3"><f>SUM(B1:C1)</f><v>90001</v></c></row>
</sheetData></worksheet>"#;

const SHEET2: &str = r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1" t="str"><v>hidden</v></c></row></sheetData></worksheet>"#;

/// Whole-row and whole-column formats, plus a cell pointing past `cellXfs`
const FORMATTED_SHEET: &str = r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><cols><col min="3" max="4" width="9.5" style="1" customWidth="1"/></cols><sheetData>
<row r="1" s="1" customFormat="1"/>
<row r="2"><c r="A2" t="inlineStr"><is><t>site</t></is></c><c r="B2"><v>45000</v></c></row>
<row r="3" s="2" customFormat="1"><c r="A3"><v>45001</v></c></row>
<row r="4" s="1"><c r="A4" s="42" t="inlineStr"><is><t>stray</t></is></c></row>
</sheetData></worksheet>"#;

fn build_package(workbook_xml: &str) -> Vec<u8> {
    build_package_with(workbook_xml, SHEET1)
}

fn build_package_with(workbook_xml: &str, sheet1: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let cursor = Cursor::new(&mut buf);
        let mut zip = zip::ZipWriter::new(cursor);
        let options = zip::write::SimpleFileOptions::default();

        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("xl/workbook.xml", workbook_xml),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
            ("xl/styles.xml", STYLES),
            ("xl/sharedStrings.xml", SHARED_STRINGS),
            ("xl/worksheets/sheet1.xml", sheet1),
            ("xl/worksheets/sheet2.xml", SHEET2),
        ];
        for (name, body) in parts {
            zip.start_file(name, options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buf
}

fn workbook_xml(date1904: bool) -> String {
    format!(
        r#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><workbookPr date1904="{}"/><sheets><sheet name="UNITAS" sheetId="1" r:id="rId1"/><sheet name="Old" sheetId="2" state="hidden" r:id="rId2"/></sheets></workbook>"#,
        if date1904 { 1 } else { 0 }
    )
}

#[test]
fn test_read_sheets_and_visibility() {
    let workbook = XlsxReader::read_bytes(&build_package(&workbook_xml(false))).unwrap();

    assert_eq!(workbook.sheet_count(), 2);
    let names: Vec<_> = workbook.worksheets().map(|ws| ws.name()).collect();
    assert_eq!(names, vec!["UNITAS", "Old"]);
    assert!(workbook.worksheet(0).unwrap().is_visible());
    assert!(!workbook.worksheet(1).unwrap().is_visible());
    assert_eq!(
        workbook.worksheet(1).unwrap().get_value("A1").unwrap(),
        CellValue::from("hidden")
    );
}

#[test]
fn test_read_cell_values() {
    let workbook = XlsxReader::read_bytes(&build_package(&workbook_xml(false))).unwrap();
    let sheet = workbook.worksheet_by_name("UNITAS").unwrap();

    assert_eq!(
        sheet.get_value("A1").unwrap(),
        CellValue::from("12 High Street\nLeeds LS1 4AB")
    );
    // Rich text runs are concatenated with their spacing intact
    assert_eq!(sheet.get_value("A3").unwrap(), CellValue::from("John Smith"));
    assert_eq!(
        sheet.get_value("C2").unwrap(),
        CellValue::from("Tel: 07700 900123")
    );
    assert_eq!(sheet.get_value("B3").unwrap(), CellValue::Boolean(true));
    assert_eq!(sheet.get_value("C3").unwrap().display_text(), "#N/A");

    let formula = sheet.get_value("D3").unwrap();
    assert!(formula.is_formula());
    assert_eq!(formula.as_number(), Some(90001.0));
}

#[test]
fn test_date_formatted_serial_becomes_date() {
    let workbook = XlsxReader::read_bytes(&build_package(&workbook_xml(false))).unwrap();
    let sheet = workbook.worksheet(0).unwrap();

    let expected = NaiveDate::from_ymd_opt(2023, 3, 15)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(sheet.get_value("B1").unwrap(), CellValue::DateTime(expected));
    // Same kind of number without a date format stays numeric
    assert_eq!(sheet.get_value("C1").unwrap(), CellValue::Number(45001.0));
}

#[test]
fn test_date1904_shifts_serials() {
    let workbook = XlsxReader::read_bytes(&build_package(&workbook_xml(true))).unwrap();
    assert!(workbook.settings().date_1904);

    let value = workbook.worksheet(0).unwrap().get_value("B1").unwrap();
    assert_eq!(
        value.as_datetime().unwrap().date(),
        NaiveDate::from_ymd_opt(2027, 3, 16).unwrap()
    );
}

#[test]
fn test_styled_blank_cells_keep_fill() {
    let workbook = XlsxReader::read_bytes(&build_package(&workbook_xml(false))).unwrap();
    let sheet = workbook.worksheet(0).unwrap();

    let grey = FillStyle::solid(Color::argb(0xFF, 0x80, 0x80, 0x80));
    assert!(sheet.get_value_at(1, 0).is_empty());
    assert_eq!(sheet.cell_fill_at(1, 0), &grey);
    assert_eq!(sheet.cell_fill_at(1, 1), &grey);
    assert!(sheet.cell_fill_at(0, 0).is_none());
    assert_eq!(sheet.used_range().unwrap().to_a1_string(), "A1:D3");
}

#[test]
fn test_row_and_column_formats() {
    let bytes = build_package_with(&workbook_xml(false), FORMATTED_SHEET);
    let workbook = XlsxReader::read_bytes(&bytes).unwrap();
    let sheet = workbook.worksheet(0).unwrap();

    let grey = FillStyle::solid(Color::argb(0xFF, 0x80, 0x80, 0x80));
    // <row s customFormat="1"/> paints the whole row without storing cells
    assert_eq!(sheet.cell_fill_at(0, 0), &grey);
    assert_eq!(sheet.cell_fill_at(0, 30), &grey);
    // Without customFormat the row's s is ignored
    assert!(sheet.cell_fill_at(3, 1).is_none());
    // <col min="3" max="4" style="1"> covers C and D only
    assert_eq!(sheet.cell_fill_at(1, 2), &grey);
    assert_eq!(sheet.cell_fill_at(9, 3), &grey);
    assert!(sheet.cell_fill_at(1, 1).is_none());
    assert!(sheet.cell_fill_at(1, 4).is_none());

    // A cell without s takes its row's number format
    let expected = NaiveDate::from_ymd_opt(2023, 3, 16)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(sheet.get_value("A3").unwrap(), CellValue::DateTime(expected));
    assert_eq!(sheet.get_value("B2").unwrap(), CellValue::Number(45000.0));
}

#[test]
fn test_unknown_style_index_reads_unstyled() {
    let bytes = build_package_with(&workbook_xml(false), FORMATTED_SHEET);
    let workbook = XlsxReader::read_bytes(&bytes).unwrap();
    let sheet = workbook.worksheet(0).unwrap();

    assert_eq!(sheet.get_value("A4").unwrap(), CellValue::from("stray"));
    assert!(sheet.cell_style_at(3, 0).is_none());
    assert!(sheet.cell_fill_at(3, 0).is_none());
    assert_eq!(sheet.get_value("A2").unwrap(), CellValue::from("site"));
}

#[test]
fn test_rejects_non_xlsx() {
    assert!(matches!(
        XlsxReader::read_bytes(b"definitely not a zip"),
        Err(XlsxError::Zip(_))
    ));

    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        zip.start_file("readme.txt", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"hello").unwrap();
        zip.finish().unwrap();
    }
    assert!(matches!(
        XlsxReader::read_bytes(&buf),
        Err(XlsxError::InvalidFormat(_))
    ));
}
