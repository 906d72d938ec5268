//! Full pipeline runs: XLSX bytes in, `ParseResult` out

mod common;

use chrono::NaiveDate;
use common::{build_xlsx, SheetXml, DATE, GREY, WHITE, YELLOW};
use pretty_assertions::assert_eq;
use rota_gas::{
    parse_gas_bytes, parse_workbook_by_type, FailureReason, GasConfig, GasParser, ImportError,
    ImportType, ParseResult, ShiftType,
};

const WIDTH: u16 = 4;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn shifts(result: &ParseResult) -> Vec<(String, String, String, String)> {
    result
        .parsed
        .iter()
        .map(|s| {
            (
                s.site_address.clone(),
                s.shift_date.to_string(),
                s.operative_name_raw.clone(),
                s.source.cell_ref.clone(),
            )
        })
        .collect()
}

fn row(site: &str, date: &str, name: &str, cell: &str) -> (String, String, String, String) {
    (site.into(), date.into(), name.into(), cell.into())
}

/// Divider, filled address, a date row, operatives, divider
fn small_rota(dates: &[&str]) -> SheetXml {
    let mut sheet = SheetXml::new("UNITAS")
        .divider(0, WIDTH, GREY)
        .styled_text(1, 0, "123 Main St", YELLOW);
    for (i, date) in dates.iter().enumerate() {
        sheet = sheet.text(2, 1 + i as u16, date);
    }
    sheet
        .text(3, 0, "456 Oak Ave")
        .text(3, 1, "John Doe")
        .text(3, 2, "John Doe")
        .divider(4, WIDTH, GREY)
}

#[test]
fn test_end_to_end_two_dates() {
    let bytes = build_xlsx(&[small_rota(&["16/06/2025", "17/06/2025"])]);

    // Two dates never make a run of three
    let strict = parse_gas_bytes(&bytes).unwrap();
    assert!(strict.parsed.is_empty());
    assert_eq!(strict.failures.len(), 1);
    assert_eq!(strict.failures[0].reason, FailureReason::DateRowNotFound);
    assert_eq!(strict.failures[0].site_address.as_deref(), Some("123 Main St"));

    let config = GasConfig {
        min_date_run: 2,
        ..GasConfig::default()
    };
    let result = parse_workbook_by_type(&bytes, ImportType::Gas, &config).unwrap();
    assert_eq!(
        shifts(&result),
        vec![
            row("123 Main St", "2025-06-16", "John Doe", "B4"),
            row("123 Main St", "2025-06-17", "John Doe", "C4"),
        ]
    );
    assert!(result.failures.is_empty());

    let shift = &result.parsed[0];
    assert_eq!(shift.task, "TBC");
    assert_eq!(shift.department, "GAS");
    assert_eq!(shift.shift_type, ShiftType::AllDay);
    assert_eq!(shift.import_type, ImportType::Gas);
    assert_eq!(shift.source.sheet_name, "UNITAS");
}

#[test]
fn test_end_to_end_three_dates() {
    let bytes = build_xlsx(&[small_rota(&["16/06/2025", "17/06/2025", "18/06/2025"])]);
    let result = parse_gas_bytes(&bytes).unwrap();

    assert_eq!(
        shifts(&result),
        vec![
            row("123 Main St", "2025-06-16", "John Doe", "B4"),
            row("123 Main St", "2025-06-17", "John Doe", "C4"),
        ]
    );
    assert!(result.failures.is_empty());
}

#[test]
fn test_json_output_shape() {
    let bytes = build_xlsx(&[small_rota(&["16/06/2025", "17/06/2025", "18/06/2025"])]);
    let result = parse_gas_bytes(&bytes).unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(
        json["parsed"][0],
        serde_json::json!({
            "siteAddress": "123 Main St",
            "shiftDate": "2025-06-16",
            "operativeNameRaw": "John Doe",
            "task": "TBC",
            "type": "all-day",
            "department": "GAS",
            "importType": "GAS",
            "source": { "sheetName": "UNITAS", "cellRef": "B4" }
        })
    );
    assert_eq!(json["failures"], serde_json::json!([]));
}

#[test]
fn test_parsing_is_deterministic() {
    let sheet = small_rota(&["16/06/2025", "17/06/2025", "18/06/2025"])
        .text(5, 0, "9 Elm Road, York YO1 7HH")
        .text(6, 1, "Ann, Bob")
        .divider(7, WIDTH, GREY);
    let bytes = build_xlsx(&[sheet]);

    let first = serde_json::to_string(&parse_gas_bytes(&bytes).unwrap()).unwrap();
    let second = serde_json::to_string(&parse_gas_bytes(&bytes).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_multiple_sites_keep_scan_order() {
    let sheet = SheetXml::new("UNITAS")
        .divider(0, 5, GREY)
        .styled_text(1, 0, "12 High Street, Leeds LS1 4AB", YELLOW)
        .text(2, 1, "Mon 16/06/25")
        .text(2, 2, "Tue 17/06/25")
        .text(2, 3, "Wed 18/06/25")
        .text(2, 4, "Thu 19/06/25")
        .text(3, 1, "Ann & Bob")
        .text(3, 4, "Cy")
        .divider(4, 5, GREY)
        .divider(5, 5, GREY)
        .styled_text(6, 0, "7 Mill Lane, Hull HU1 2AA", YELLOW)
        .text(7, 2, "16 June 2025")
        .text(7, 3, "17 June 2025")
        .text(7, 4, "18 June 2025")
        .text(8, 3, "Dee")
        .divider(9, 5, GREY);
    let result = parse_gas_bytes(&build_xlsx(&[sheet])).unwrap();

    assert_eq!(
        shifts(&result),
        vec![
            row("12 High Street, Leeds LS1 4AB", "2025-06-16", "Ann", "B4"),
            row("12 High Street, Leeds LS1 4AB", "2025-06-16", "Bob", "B4"),
            row("12 High Street, Leeds LS1 4AB", "2025-06-19", "Cy", "E4"),
            row("7 Mill Lane, Hull HU1 2AA", "2025-06-17", "Dee", "D9"),
        ]
    );
    assert!(result.failures.is_empty());
}

#[test]
fn test_divider_symmetry() {
    for gap in [1, 2, 3] {
        let sheet = SheetXml::new("UNITAS")
            .divider(0, WIDTH, GREY)
            .divider(gap + 1, WIDTH, GREY);
        let result = parse_gas_bytes(&build_xlsx(&[sheet])).unwrap();
        assert!(result.is_empty(), "gap of {} rows: {:?}", gap, result);
    }
}

#[test]
fn test_serial_dates() {
    // Plain numbers inside the serial window
    let plain = SheetXml::new("UNITAS")
        .divider(0, WIDTH, GREY)
        .styled_text(1, 0, "123 Main St", YELLOW)
        .number(2, 1, 45000.0, 0)
        .number(2, 2, 45001.0, 0)
        .number(2, 3, 45002.0, 0)
        .text(3, 1, "Eve")
        .divider(4, WIDTH, GREY);
    let result = parse_gas_bytes(&build_xlsx(&[plain])).unwrap();
    assert_eq!(result.parsed.len(), 1);
    assert_eq!(result.parsed[0].shift_date, ymd(2023, 3, 15));

    // Date-formatted serials arrive as native dates
    let formatted = SheetXml::new("UNITAS")
        .divider(0, WIDTH, GREY)
        .styled_text(1, 0, "123 Main St", YELLOW)
        .number(2, 1, 45000.0, DATE)
        .number(2, 2, 45001.0, DATE)
        .number(2, 3, 45002.0, DATE)
        .text(3, 3, "Eve")
        .divider(4, WIDTH, GREY);
    let result = parse_gas_bytes(&build_xlsx(&[formatted])).unwrap();
    assert_eq!(result.parsed.len(), 1);
    assert_eq!(result.parsed[0].shift_date, ymd(2023, 3, 17));
}

#[test]
fn test_name_splitting() {
    let sheet = small_rota(&["16/06/2025", "17/06/2025", "18/06/2025"])
        .text(3, 1, "John Smith, Jane Doe")
        .text(3, 2, "");
    let result = parse_gas_bytes(&build_xlsx(&[sheet])).unwrap();

    let names: Vec<_> = result
        .parsed
        .iter()
        .map(|s| s.operative_name_raw.as_str())
        .collect();
    assert_eq!(names, vec!["John Smith", "Jane Doe"]);
    assert!(result.parsed.iter().all(|s| s.source.cell_ref == "B4"));
}

#[test]
fn test_blank_run_termination() {
    let sheet = SheetXml::new("UNITAS")
        .divider(0, WIDTH, GREY)
        .styled_text(1, 0, "123 Main St", YELLOW)
        .text(2, 1, "16/06/2025")
        .text(2, 2, "17/06/2025")
        .text(2, 3, "18/06/2025")
        .text(3, 1, "Ann")
        .text(4, 1, "Bob")
        .text(8, 1, "Late Entry")
        .divider(10, WIDTH, GREY);
    let result = parse_gas_bytes(&build_xlsx(&[sheet])).unwrap();

    let names: Vec<_> = result
        .parsed
        .iter()
        .map(|s| s.operative_name_raw.as_str())
        .collect();
    assert_eq!(names, vec!["Ann", "Bob"]);
    assert!(result.failures.is_empty());
}

#[test]
fn test_metadata_is_filtered_silently() {
    let sheet = small_rota(&["16/06/2025", "17/06/2025", "18/06/2025"])
        .text(3, 1, "Job Manager")
        .text(3, 2, "07700 900123")
        .text(3, 3, "Scheme: ECO4");
    let result = parse_gas_bytes(&build_xlsx(&[sheet])).unwrap();
    assert!(result.is_empty(), "{:?}", result);
}

#[test]
fn test_white_rows_do_not_divide() {
    let sheet = small_rota(&["16/06/2025", "17/06/2025", "18/06/2025"])
        .divider(4, WIDTH, WHITE);
    let result = parse_gas_bytes(&build_xlsx(&[sheet])).unwrap();

    assert!(result.parsed.is_empty());
    assert_eq!(result.failures[0].reason, FailureReason::InsufficientDividers);
}

#[test]
fn test_row_styled_dividers() {
    // Dividers painted from the row header carry no cells at all
    let sheet = SheetXml::new("UNITAS")
        .row_style(0, GREY)
        .styled_text(1, 0, "123 Main St", YELLOW)
        .text(2, 1, "16/06/2025")
        .text(2, 2, "17/06/2025")
        .text(2, 3, "18/06/2025")
        .text(3, 1, "John Doe")
        .row_style(4, GREY);
    let result = parse_gas_bytes(&build_xlsx(&[sheet])).unwrap();

    assert_eq!(
        shifts(&result),
        vec![row("123 Main St", "2025-06-16", "John Doe", "B4")]
    );
    assert!(result.failures.is_empty());
}

#[test]
fn test_unknown_style_index_keeps_shifts() {
    // J10 points past the styles table
    let sheet = small_rota(&["16/06/2025", "17/06/2025", "18/06/2025"]).fill(9, 9, 42);
    let result = parse_gas_bytes(&build_xlsx(&[sheet])).unwrap();

    assert_eq!(
        shifts(&result),
        vec![
            row("123 Main St", "2025-06-16", "John Doe", "B4"),
            row("123 Main St", "2025-06-17", "John Doe", "C4"),
        ]
    );
    assert!(result.failures.is_empty());
}

#[test]
fn test_sheet_selection() {
    let other = SheetXml::new("Notes").text(0, 0, "nothing to see");
    let rota = small_rota(&["16/06/2025", "17/06/2025", "18/06/2025"]);

    // Preferred name wins even when listed second
    let result = parse_gas_bytes(&build_xlsx(&[other.clone(), rota])).unwrap();
    assert_eq!(result.shift_count(), 2);

    // Otherwise the first visible sheet is used
    let renamed = small_rota(&["16/06/2025", "17/06/2025", "18/06/2025"]).renamed("June");
    let result = parse_gas_bytes(&build_xlsx(&[other.hidden(), renamed])).unwrap();
    assert_eq!(result.shift_count(), 2);
    assert!(result.parsed.iter().all(|s| s.source.sheet_name == "June"));
}

#[test]
fn test_fatal_failures() {
    let result = parse_gas_bytes(&build_xlsx(&[])).unwrap();
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].reason, FailureReason::NoWorksheetFound);

    let result = parse_gas_bytes(&build_xlsx(&[SheetXml::new("UNITAS")])).unwrap();
    assert_eq!(result.failures[0].reason, FailureReason::SheetAppearsEmpty);
    assert_eq!(result.failures[0].sheet_name.as_deref(), Some("UNITAS"));

    let one_divider = SheetXml::new("UNITAS")
        .divider(0, WIDTH, GREY)
        .styled_text(1, 0, "123 Main St", YELLOW)
        .text(2, 1, "John Doe");
    let result = parse_gas_bytes(&build_xlsx(&[one_divider])).unwrap();
    assert!(result.parsed.is_empty());
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].reason, FailureReason::InsufficientDividers);
}

#[test]
fn test_partial_results_survive_block_failures() {
    let sheet = small_rota(&["16/06/2025", "17/06/2025", "18/06/2025"])
        .text(5, 1, "just a note")
        .divider(7, WIDTH, GREY);
    let result = parse_gas_bytes(&build_xlsx(&[sheet])).unwrap();

    assert_eq!(result.shift_count(), 2);
    assert_eq!(result.failure_count(), 1);
    assert_eq!(result.failures[0].reason, FailureReason::AddressNotFound);
    assert_eq!(
        result.failures[0].to_string(),
        "UNITAS!A6: no site address found in rows 6-7"
    );
}

#[test]
fn test_load_and_routing_errors() {
    assert!(matches!(
        parse_gas_bytes(b"PK\x03\x04 truncated"),
        Err(ImportError::Load(_))
    ));

    let bytes = build_xlsx(&[small_rota(&["16/06/2025", "17/06/2025", "18/06/2025"])]);
    assert!(matches!(
        parse_workbook_by_type(&bytes, ImportType::Build, &GasConfig::default()),
        Err(ImportError::UnsupportedImportType(ImportType::Build))
    ));

    let bad = GasConfig {
        divider_colour_consistency: -0.1,
        ..GasConfig::default()
    };
    assert!(matches!(GasParser::new(bad), Err(ImportError::Config(_))));
}
