//! # Module Renderer
//!
//! Turns a payload into a 1-bit barcode image (plain PBM, `P1`).
//!
//! ```text
//! payload ──► module row  [1,0,1,0,0,1,1,...]   one entry per bar/space module
//!                 │
//!                 ▼  × scale horizontally, × height vertically, quiet zones
//!             "P1\n{w} {h}\n0 0 1 1 0 0 ..."
//! ```
//!
//! EAN payloads with a bad check digit are rejected so the fallback chain in
//! [`tally_core::symbology::generate`] retries them as Code128. Code128 uses
//! code set B and accepts printable ASCII only.

use tally_core::symbology::has_valid_check_digit;
use tally_core::{BarcodeRenderer, RenderError, Symbology};

/// Quiet zone on each side, in modules.
const QUIET_ZONE: usize = 10;

// =============================================================================
// EAN tables
// =============================================================================

const EAN_GUARD: &[u8] = &[1, 0, 1];
const EAN_CENTER: &[u8] = &[0, 1, 0, 1, 0];

/// Left-hand odd parity (set A) patterns for digits 0-9.
const EAN_L: [[u8; 7]; 10] = [
    [0, 0, 0, 1, 1, 0, 1],
    [0, 0, 1, 1, 0, 0, 1],
    [0, 0, 1, 0, 0, 1, 1],
    [0, 1, 1, 1, 1, 0, 1],
    [0, 1, 0, 0, 0, 1, 1],
    [0, 1, 1, 0, 0, 0, 1],
    [0, 1, 0, 1, 1, 1, 1],
    [0, 1, 1, 1, 0, 1, 1],
    [0, 1, 1, 0, 1, 1, 1],
    [0, 0, 0, 1, 0, 1, 1],
];

/// EAN-13 parity of the six left digits, selected by the leading digit.
/// `true` = even parity (set B).
const EAN13_PARITY: [[bool; 6]; 10] = [
    [false, false, false, false, false, false],
    [false, false, true, false, true, true],
    [false, false, true, true, false, true],
    [false, false, true, true, true, false],
    [false, true, false, false, true, true],
    [false, true, true, false, false, true],
    [false, true, true, true, false, false],
    [false, true, false, true, false, true],
    [false, true, false, true, true, false],
    [false, true, true, false, true, false],
];

fn ean_left(digit: usize, even: bool) -> [u8; 7] {
    if even {
        // Set B is set C mirrored
        let mut g = ean_right(digit);
        g.reverse();
        g
    } else {
        EAN_L[digit]
    }
}

fn ean_right(digit: usize) -> [u8; 7] {
    EAN_L[digit].map(|m| 1 - m)
}

fn ean_modules(payload: &str, symbology: Symbology) -> Result<Vec<u8>, RenderError> {
    let expected = match symbology {
        Symbology::Ean13 => 13,
        _ => 8,
    };
    if payload.len() != expected || !payload.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RenderError::new(
            symbology,
            format!("expected {expected} digits"),
        ));
    }
    if !has_valid_check_digit(payload) {
        return Err(RenderError::new(symbology, "check digit mismatch"));
    }

    let digits: Vec<usize> = payload.bytes().map(|b| usize::from(b - b'0')).collect();

    // EAN-13 encodes its first digit in the parity of the left half
    let (parity, left, right) = match symbology {
        Symbology::Ean13 => (EAN13_PARITY[digits[0]], &digits[1..7], &digits[7..13]),
        _ => ([false; 6], &digits[0..4], &digits[4..8]),
    };

    let mut modules = Vec::with_capacity(95);
    modules.extend_from_slice(EAN_GUARD);
    for (i, d) in left.iter().enumerate() {
        modules.extend_from_slice(&ean_left(*d, parity[i]));
    }
    modules.extend_from_slice(EAN_CENTER);
    for d in right {
        modules.extend_from_slice(&ean_right(*d));
    }
    modules.extend_from_slice(EAN_GUARD);

    Ok(modules)
}

// =============================================================================
// Code128
// =============================================================================

/// Bar/space widths for symbol values 0-105, then STOP.
const CODE128_WIDTHS: [&str; 107] = [
    "212222", "222122", "222221", "121223", "121322", "131222", "122213", "122312", "132212",
    "221213", "221312", "231212", "112232", "122132", "122231", "113222", "123122", "123221",
    "223211", "221132", "221231", "213212", "223112", "312131", "311222", "321122", "321221",
    "312212", "322112", "322211", "212123", "212321", "232121", "111323", "131123", "131321",
    "112313", "132113", "132311", "211313", "231113", "231311", "112133", "112331", "132131",
    "113123", "113321", "133121", "313121", "211331", "231131", "213113", "213311", "213131",
    "311123", "311321", "331121", "312113", "312311", "332111", "314111", "221411", "431111",
    "111224", "111422", "121124", "121421", "141122", "141221", "112214", "112412", "122114",
    "122411", "142112", "142211", "241211", "221114", "413111", "241112", "134111", "111242",
    "121142", "121241", "114212", "124112", "124211", "411212", "421112", "421211", "212141",
    "214121", "412121", "111143", "111341", "131141", "114113", "114311", "411113", "411311",
    "113141", "114131", "311141", "411131", "211412", "211214", "211232", "2331112",
];

const CODE128_START_B: usize = 104;
const CODE128_STOP: usize = 106;

fn push_widths(modules: &mut Vec<u8>, widths: &str) {
    for (i, w) in widths.bytes().enumerate() {
        let bar = if i % 2 == 0 { 1 } else { 0 };
        modules.extend(std::iter::repeat(bar).take(usize::from(w - b'0')));
    }
}

fn code128_modules(payload: &str) -> Result<Vec<u8>, RenderError> {
    let values = payload
        .chars()
        .map(|c| match c {
            ' '..='~' => Ok(c as usize - 32),
            _ => Err(RenderError::new(
                Symbology::Code128,
                format!("character {c:?} is not printable ASCII"),
            )),
        })
        .collect::<Result<Vec<usize>, _>>()?;

    if values.is_empty() {
        return Err(RenderError::new(Symbology::Code128, "empty payload"));
    }

    let checksum = values
        .iter()
        .enumerate()
        .fold(CODE128_START_B, |acc, (i, v)| acc + v * (i + 1))
        % 103;

    let mut modules = Vec::with_capacity((values.len() + 3) * 11 + 2);
    push_widths(&mut modules, CODE128_WIDTHS[CODE128_START_B]);
    for v in &values {
        push_widths(&mut modules, CODE128_WIDTHS[*v]);
    }
    push_widths(&mut modules, CODE128_WIDTHS[checksum]);
    push_widths(&mut modules, CODE128_WIDTHS[CODE128_STOP]);

    Ok(modules)
}

// =============================================================================
// Renderer
// =============================================================================

/// Pixel renderer used by the barcode worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleRenderer {
    scale: u32,
    height: u32,
}

impl ModuleRenderer {
    pub fn new(scale: u32, height: u32) -> Self {
        ModuleRenderer {
            scale: scale.max(1),
            height: height.max(1),
        }
    }

    /// The bar/space module row for `payload`, without quiet zones.
    pub fn modules(&self, payload: &str, symbology: Symbology) -> Result<Vec<u8>, RenderError> {
        match symbology {
            Symbology::Ean13 | Symbology::Ean8 => ean_modules(payload, symbology),
            Symbology::Code128 => code128_modules(payload),
        }
    }

    fn to_pbm(&self, modules: &[u8]) -> Vec<u8> {
        let scale = self.scale as usize;
        let mut row = Vec::with_capacity((modules.len() + 2 * QUIET_ZONE) * scale);
        row.extend(std::iter::repeat(0u8).take(QUIET_ZONE * scale));
        for m in modules {
            row.extend(std::iter::repeat(*m).take(scale));
        }
        row.extend(std::iter::repeat(0u8).take(QUIET_ZONE * scale));

        let line: String = row
            .iter()
            .map(|m| if *m == 1 { "1" } else { "0" })
            .collect::<Vec<_>>()
            .join(" ");

        let mut out = format!("P1\n{} {}\n", row.len(), self.height);
        for _ in 0..self.height {
            out.push_str(&line);
            out.push('\n');
        }
        out.into_bytes()
    }
}

impl BarcodeRenderer for ModuleRenderer {
    fn render(&self, payload: &str, symbology: Symbology) -> Result<Vec<u8>, RenderError> {
        let modules = self.modules(payload, symbology)?;
        Ok(self.to_pbm(&modules))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::symbology::generate;
    use tally_core::CoreError;

    fn renderer() -> ModuleRenderer {
        ModuleRenderer::new(1, 2)
    }

    #[test]
    fn test_ean13_has_95_modules() {
        let modules = renderer().modules("8801047019510", Symbology::Ean13).unwrap();
        assert_eq!(modules.len(), 95);
        assert_eq!(&modules[..3], EAN_GUARD);
        assert_eq!(&modules[45..50], EAN_CENTER);
        assert_eq!(&modules[92..], EAN_GUARD);
    }

    #[test]
    fn test_ean8_has_67_modules() {
        let modules = renderer().modules("88011745", Symbology::Ean8).unwrap();
        assert_eq!(modules.len(), 67);
        assert_eq!(&modules[31..36], EAN_CENTER);
    }

    #[test]
    fn test_ean_digit_patterns_have_two_bars() {
        for d in 0..10 {
            for pattern in [ean_left(d, false), ean_left(d, true), ean_right(d)] {
                let bars = pattern.windows(2).filter(|w| w[0] == 0 && w[1] == 1).count()
                    + usize::from(pattern[0] == 1);
                assert_eq!(bars, 2, "digit {d}");
            }
        }
    }

    #[test]
    fn test_bad_check_digit_falls_back_to_code128() {
        let rendered = generate(&renderer(), "8801116000194").unwrap();
        assert_eq!(rendered.requested, Symbology::Ean13);
        assert_eq!(rendered.symbology, Symbology::Code128);
        assert!(rendered.fell_back());
    }

    #[test]
    fn test_code128_widths_are_consistent() {
        for (i, w) in CODE128_WIDTHS.iter().enumerate() {
            let total: u32 = w.bytes().map(|b| u32::from(b - b'0')).sum();
            let expected = if i == CODE128_STOP { 13 } else { 11 };
            assert_eq!(total, expected, "symbol {i}");
        }
    }

    #[test]
    fn test_code128_length() {
        // start + 5 data + checksum = 7 × 11, stop = 13
        let modules = renderer().modules("SHOP1", Symbology::Code128).unwrap();
        assert_eq!(modules.len(), 7 * 11 + 13);
    }

    #[test]
    fn test_non_ascii_fails_everywhere() {
        let err = generate(&renderer(), "말보루").unwrap_err();
        assert!(matches!(err, CoreError::BarcodeGenerationFailed { .. }));
    }

    #[test]
    fn test_pbm_header_and_size() {
        let r = ModuleRenderer::new(2, 3);
        let bytes = r.render("88011745", Symbology::Ean8).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("P1"));
        let width = (67 + 2 * QUIET_ZONE) * 2;
        assert_eq!(lines.next(), Some(format!("{width} 3").as_str()));
        assert_eq!(lines.count(), 3);
    }
}
