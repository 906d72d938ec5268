//! Fill colour predicates
//!
//! Divider detection treats fill as "painted or not" rather than as colour
//! semantics, because the divider colour differs between company versions
//! of the same template. These predicates work on plain colour slices so
//! the thresholds can be exercised without a grid.

use rota_core::Color;

/// True when a fill should count as "unfilled".
///
/// No fill, automatic colour, white (`FFFFFFFF` and the near-white
/// `FFFFFFFE` some exporters write) and fully transparent ARGB colours are
/// all white-like. Theme and palette colours are resolved through the
/// default Office palette, so `theme:0` and indexed white count too.
pub fn is_white_like(fill: Option<&Color>) -> bool {
    match fill {
        None | Some(Color::Auto) => true,
        Some(Color::Argb { a: 0, .. }) => true,
        Some(color) => matches!(color.to_rgb(), (0xFF, 0xFF, 0xFF) | (0xFF, 0xFF, 0xFE)),
    }
}

/// Code used to compare two fills for equality
pub fn colour_code(color: &Color) -> String {
    color.code()
}

/// Fraction of cells whose fill is not white-like; 0 for an empty row
pub fn fill_coverage(fills: &[Option<Color>]) -> f64 {
    if fills.is_empty() {
        return 0.0;
    }
    let filled = fills.iter().filter(|f| !is_white_like(f.as_ref())).count();
    filled as f64 / fills.len() as f64
}

/// Among filled cells, the fraction painted with the first filled colour.
///
/// Equality is exact on [`colour_code`]; there is no colour-distance
/// tolerance. Returns 0 when nothing is filled.
pub fn colour_consistency(fills: &[Option<Color>]) -> f64 {
    let mut filled = fills.iter().flatten().filter(|c| !is_white_like(Some(*c)));
    let Some(first) = filled.next() else {
        return 0.0;
    };
    let first = colour_code(first);

    let (mut same, mut total) = (1usize, 1usize);
    for color in filled {
        total += 1;
        if colour_code(color) == first {
            same += 1;
        }
    }
    same as f64 / total as f64
}
