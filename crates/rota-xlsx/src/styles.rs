//! XLSX styles (styles.xml) reader
//!
//! Resolves every `cellXfs/xf` entry into a [`CellStyle`] carrying the fill
//! and number format. Fonts, borders and alignment are skipped.

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use rota_core::style::{CellStyle, Color, FillStyle, NumberFormat, PatternType};

pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<Vec<CellStyle>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();

    let mut numfmts: HashMap<u32, String> = HashMap::new();
    let mut fills: Vec<FillStyle> = Vec::new();
    let mut cell_xfs: Vec<CellStyle> = Vec::new();

    // Current fill while parsing
    let mut in_fill = false;
    let mut in_gradient = false;
    let mut current_fill_pattern: Option<PatternType> = None;
    let mut current_fill_fg = Color::Auto;
    let mut current_fill_bg = Color::Auto;
    let mut gradient_stops: Vec<Color> = Vec::new();

    // Differential formats also contain <fill>/<xf>-like children; skip them
    let mut in_dxfs = false;
    let mut in_cell_xfs = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"dxfs" => in_dxfs = true,
                b"cellXfs" => in_cell_xfs = true,

                b"fill" if !in_dxfs => {
                    in_fill = true;
                    in_gradient = false;
                    current_fill_pattern = None;
                    current_fill_fg = Color::Auto;
                    current_fill_bg = Color::Auto;
                    gradient_stops.clear();
                }
                b"patternFill" if in_fill => {
                    current_fill_pattern = pattern_type_attr(&e);
                }
                b"gradientFill" if in_fill => {
                    in_gradient = true;
                }
                b"fgColor" if in_fill => current_fill_fg = parse_color_attrs(&e),
                b"bgColor" if in_fill => current_fill_bg = parse_color_attrs(&e),

                b"xf" if in_cell_xfs => {
                    cell_xfs.push(resolve_xf(&e, &numfmts, &fills));
                }
                _ => {}
            },

            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"numFmt" => {
                    let mut id = None;
                    let mut code = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"numFmtId" => {
                                id = attr.unescape_value().ok().and_then(|s| s.parse().ok())
                            }
                            b"formatCode" => {
                                code = attr.unescape_value().ok().map(|s| s.to_string())
                            }
                            _ => {}
                        }
                    }
                    if let (Some(id), Some(code)) = (id, code) {
                        numfmts.insert(id, code);
                    }
                }
                b"patternFill" if in_fill => {
                    current_fill_pattern = pattern_type_attr(&e);
                }
                b"fgColor" if in_fill => current_fill_fg = parse_color_attrs(&e),
                b"bgColor" if in_fill => current_fill_bg = parse_color_attrs(&e),
                // <stop position=".."><color .../></stop>
                b"color" if in_gradient => gradient_stops.push(parse_color_attrs(&e)),

                b"xf" if in_cell_xfs => {
                    cell_xfs.push(resolve_xf(&e, &numfmts, &fills));
                }
                _ => {}
            },

            Ok(Event::End(e)) => match e.name().as_ref() {
                b"dxfs" => in_dxfs = false,
                b"cellXfs" => in_cell_xfs = false,
                b"fill" if in_fill => {
                    let fill = if in_gradient {
                        FillStyle::Gradient {
                            stops: std::mem::take(&mut gradient_stops),
                        }
                    } else {
                        finalize_fill(current_fill_pattern, current_fill_fg, current_fill_bg)
                    };
                    fills.push(fill);
                    in_fill = false;
                    in_gradient = false;
                }
                _ => {}
            },

            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }

        buf.clear();
    }

    if cell_xfs.is_empty() {
        cell_xfs.push(CellStyle::default());
    }
    Ok(cell_xfs)
}

fn resolve_xf(e: &BytesStart<'_>, numfmts: &HashMap<u32, String>, fills: &[FillStyle]) -> CellStyle {
    let mut num_fmt_id = 0u32;
    let mut fill_id = 0u32;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"numFmtId" => {
                num_fmt_id = attr
                    .unescape_value()
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0);
            }
            b"fillId" => {
                fill_id = attr
                    .unescape_value()
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0);
            }
            _ => {}
        }
    }

    CellStyle {
        fill: fills.get(fill_id as usize).cloned().unwrap_or_default(),
        number_format: NumberFormat::from_id(
            num_fmt_id,
            numfmts.get(&num_fmt_id).map(String::as_str),
        ),
    }
}

fn pattern_type_attr(e: &BytesStart<'_>) -> Option<PatternType> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"patternType")
        .and_then(|attr| attr.unescape_value().ok().and_then(|v| PatternType::from_xlsx(&v)))
}

fn finalize_fill(pattern: Option<PatternType>, fg: Color, bg: Color) -> FillStyle {
    match pattern.unwrap_or(PatternType::None) {
        PatternType::None => FillStyle::None,
        PatternType::Solid => FillStyle::Solid { color: fg },
        // Reserved placeholder fill; Excel never paints it
        PatternType::Gray125 => FillStyle::None,
        p => FillStyle::Pattern {
            pattern: p,
            foreground: fg,
            background: bg,
        },
    }
}

pub(crate) fn parse_color_attrs(e: &BytesStart<'_>) -> Color {
    // Priority: rgb > theme > indexed > auto
    let mut rgb: Option<String> = None;
    let mut theme: Option<u8> = None;
    let mut tint: Option<f64> = None;
    let mut indexed: Option<u8> = None;

    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"rgb" => {
                rgb = attr.unescape_value().ok().map(|s| s.to_string());
            }
            b"theme" => {
                theme = attr
                    .unescape_value()
                    .ok()
                    .and_then(|s| s.parse::<u8>().ok());
            }
            b"tint" => {
                tint = attr
                    .unescape_value()
                    .ok()
                    .and_then(|s| s.parse::<f64>().ok());
            }
            b"indexed" => {
                indexed = attr
                    .unescape_value()
                    .ok()
                    .and_then(|s| s.parse::<u8>().ok());
            }
            _ => {}
        }
    }

    if let Some(color) = rgb.as_deref().and_then(Color::from_hex) {
        return color;
    }

    if let Some(index) = theme {
        let tint = tint
            .map(|t| (t.clamp(-1.0, 1.0) * 100.0).round() as i8)
            .unwrap_or(0);
        return Color::Theme { index, tint };
    }

    if let Some(i) = indexed {
        return Color::Indexed(i);
    }

    Color::Auto
}
