//! RDS character repertoire decoding.
//!
//! RDS program-service names and radio text are transmitted in one of
//! three 8-bit EBU character repertoires (G0, G1, G2). Each byte indexes a
//! 16x16 table: the high nibble selects the row, the low nibble the
//! column. The first two rows of every table are control codes and render
//! as spaces.

use std::fmt;

/// Placeholder returned when the driver reports a repertoire code this
/// decoder does not know.
pub const UNKNOWN_REPERTOIRE_PLACEHOLDER: &str = "???????????";

/// An RDS character repertoire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repertoire {
    /// EBU Latin-based repertoire G0 (the common broadcast default).
    G0,
    /// EBU Latin-based repertoire G1.
    G1,
    /// EBU Latin/Greek repertoire G2.
    G2,
}

impl Repertoire {
    /// Map a raw driver repertoire code.
    pub fn from_raw(raw: u8) -> Option<Repertoire> {
        match raw {
            0 => Some(Repertoire::G0),
            1 => Some(Repertoire::G1),
            2 => Some(Repertoire::G2),
            _ => None,
        }
    }

    fn table(&self) -> &'static [[char; 16]; 16] {
        match self {
            Repertoire::G0 => &TABLE_G0,
            Repertoire::G1 => &TABLE_G1,
            Repertoire::G2 => &TABLE_G2,
        }
    }

    /// Decode one repertoire byte to a character.
    pub fn decode_byte(&self, byte: u8) -> char {
        let row = (byte >> 4) as usize;
        let col = (byte & 0x0F) as usize;
        self.table()[row][col]
    }
}

impl fmt::Display for Repertoire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repertoire::G0 => write!(f, "G0"),
            Repertoire::G1 => write!(f, "G1"),
            Repertoire::G2 => write!(f, "G2"),
        }
    }
}

/// Decode repertoire-encoded text bytes into a `String`.
///
/// Decoding stops at the first NUL or carriage-return terminator. An
/// unrecognized `repertoire_code` yields
/// [`UNKNOWN_REPERTOIRE_PLACEHOLDER`].
pub fn decode_text(bytes: &[u8], repertoire_code: u8) -> String {
    let Some(repertoire) = Repertoire::from_raw(repertoire_code) else {
        return UNKNOWN_REPERTOIRE_PLACEHOLDER.to_string();
    };
    bytes
        .iter()
        .take_while(|&&b| b != 0x00 && b != 0x0D)
        .map(|&b| repertoire.decode_byte(b))
        .collect()
}

// Rows 0 and 1 of all three tables are control codes; they render as
// spaces so partial transmissions stay printable.
const CONTROL_ROW: [char; 16] = [' '; 16];

/// EBU Latin-based repertoire G0 (EN 50067 figure E.1).
static TABLE_G0: [[char; 16]; 16] = [
    CONTROL_ROW,
    CONTROL_ROW,
    [' ', '!', '"', '#', '¤', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/'],
    ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', ';', '<', '=', '>', '?'],
    ['@', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O'],
    ['P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '[', '\\', ']', '―', '_'],
    ['‖', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o'],
    ['p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', '{', '|', '}', '¯', ' '],
    ['á', 'à', 'é', 'è', 'í', 'ì', 'ó', 'ò', 'ú', 'ù', 'Ñ', 'Ç', 'Ş', 'β', '¡', 'Ĳ'],
    ['â', 'ä', 'ê', 'ë', 'î', 'ï', 'ô', 'ö', 'û', 'ü', 'ñ', 'ç', 'ş', 'ğ', 'ı', 'ĳ'],
    ['ª', 'α', '©', '‰', 'Ǧ', 'ě', 'ň', 'ő', 'π', '€', '£', '$', '←', '↑', '→', '↓'],
    ['º', '¹', '²', '³', '±', 'İ', 'ń', 'ű', 'µ', '¿', '÷', '°', '¼', '½', '¾', '§'],
    ['Á', 'À', 'É', 'È', 'Í', 'Ì', 'Ó', 'Ò', 'Ú', 'Ù', 'Ř', 'Č', 'Š', 'Ž', 'Ð', 'Ŀ'],
    ['Â', 'Ä', 'Ê', 'Ë', 'Î', 'Ï', 'Ô', 'Ö', 'Û', 'Ü', 'ř', 'č', 'š', 'ž', 'đ', 'ŀ'],
    ['Ã', 'Å', 'Æ', 'Œ', 'ŷ', 'ý', 'Õ', 'Ø', 'Þ', 'Ŋ', 'Ŕ', 'Ć', 'Ś', 'Ź', 'Ŧ', 'ð'],
    ['ã', 'å', 'æ', 'œ', 'ŵ', 'ý', 'õ', 'ø', 'þ', 'ŋ', 'ŕ', 'ć', 'ś', 'ź', 'ŧ', ' '],
];

/// EBU Latin-based repertoire G1 (EN 50067 figure E.2).
static TABLE_G1: [[char; 16]; 16] = [
    CONTROL_ROW,
    CONTROL_ROW,
    [' ', '!', '"', '#', '¤', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/'],
    ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', ';', '<', '=', '>', '?'],
    ['@', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O'],
    ['P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '[', '\\', ']', '―', '_'],
    ['‖', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o'],
    ['p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', '{', '|', '}', '¯', ' '],
    ['ạ', 'ḅ', 'ḍ', 'ẹ', 'ḥ', 'ị', 'ḷ', 'ṃ', 'ṇ', 'ọ', 'ṛ', 'ṣ', 'ṭ', 'ụ', 'ẓ', '̣'],
    ['Ạ', 'Ḅ', 'Ḍ', 'Ẹ', 'Ḥ', 'Ị', 'Ḷ', 'Ṃ', 'Ṇ', 'Ọ', 'Ṛ', 'Ṣ', 'Ṭ', 'Ụ', 'Ẓ', '̄'],
    ['ĉ', 'ĝ', 'ĥ', 'ĵ', 'ŝ', 'ŭ', 'ć', 'ǵ', 'ḱ', 'ĺ', 'ḿ', 'ń', 'ṕ', 'ŕ', 'ś', 'ź'],
    ['Ĉ', 'Ĝ', 'Ĥ', 'Ĵ', 'Ŝ', 'Ŭ', 'Ć', 'Ǵ', 'Ḱ', 'Ĺ', 'Ḿ', 'Ń', 'Ṕ', 'Ŕ', 'Ś', 'Ź'],
    ['ā', 'ē', 'ī', 'ō', 'ū', 'ȳ', 'ǣ', 'ż', 'ċ', 'ġ', 'ṁ', 'ṗ', 'ṡ', 'ṫ', 'ẇ', 'ẋ'],
    ['Ā', 'Ē', 'Ī', 'Ō', 'Ū', 'Ȳ', 'Ǣ', 'Ż', 'Ċ', 'Ġ', 'Ṁ', 'Ṗ', 'Ṡ', 'Ṫ', 'Ẇ', 'Ẋ'],
    ['ĕ', 'ğ', 'ĭ', 'ŏ', 'ŭ', 'ǎ', 'ě', 'ǐ', 'ǒ', 'ǔ', 'ȃ', 'ȇ', 'ȋ', 'ȏ', 'ȗ', '˘'],
    ['Ĕ', 'Ğ', 'Ĭ', 'Ŏ', 'Ŭ', 'Ǎ', 'Ě', 'Ǐ', 'Ǒ', 'Ǔ', 'Ȃ', 'Ȇ', 'Ȋ', 'Ȏ', 'Ȗ', ' '],
];

/// EBU Latin/Greek repertoire G2 (EN 50067 figure E.3).
static TABLE_G2: [[char; 16]; 16] = [
    CONTROL_ROW,
    CONTROL_ROW,
    [' ', '!', '"', '#', '¤', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/'],
    ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', ';', '<', '=', '>', '?'],
    ['@', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O'],
    ['P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '[', '\\', ']', '―', '_'],
    ['‖', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o'],
    ['p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', '{', '|', '}', '¯', ' '],
    ['Α', 'Β', 'Γ', 'Δ', 'Ε', 'Ζ', 'Η', 'Θ', 'Ι', 'Κ', 'Λ', 'Μ', 'Ν', 'Ξ', 'Ο', 'Π'],
    ['Ρ', 'Σ', 'Τ', 'Υ', 'Φ', 'Χ', 'Ψ', 'Ω', 'Ϊ', 'Ϋ', 'ά', 'έ', 'ή', 'ί', 'ό', 'ύ'],
    ['α', 'β', 'γ', 'δ', 'ε', 'ζ', 'η', 'θ', 'ι', 'κ', 'λ', 'μ', 'ν', 'ξ', 'ο', 'π'],
    ['ρ', 'σ', 'ς', 'τ', 'υ', 'φ', 'χ', 'ψ', 'ω', 'ϊ', 'ϋ', 'ΰ', 'ώ', '΄', '΅', '·'],
    ['Á', 'À', 'É', 'È', 'Í', 'Ì', 'Ó', 'Ò', 'Ú', 'Ù', 'Ř', 'Č', 'Š', 'Ž', 'Ð', 'Ŀ'],
    ['Â', 'Ä', 'Ê', 'Ë', 'Î', 'Ï', 'Ô', 'Ö', 'Û', 'Ü', 'ř', 'č', 'š', 'ž', 'đ', 'ŀ'],
    ['Ã', 'Å', 'Æ', 'Œ', 'ŷ', 'ý', 'Õ', 'Ø', 'Þ', 'Ŋ', 'Ŕ', 'Ć', 'Ś', 'Ź', 'Ŧ', 'ð'],
    ['ã', 'å', 'æ', 'œ', 'ŵ', 'ý', 'õ', 'ø', 'þ', 'ŋ', 'ŕ', 'ć', 'ś', 'ź', 'ŧ', ' '],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn g0_ascii_region_matches_ascii() {
        assert_eq!(Repertoire::G0.decode_byte(0x41), 'A');
        assert_eq!(Repertoire::G0.decode_byte(0x61), 'a');
        assert_eq!(Repertoire::G0.decode_byte(0x30), '0');
        assert_eq!(Repertoire::G0.decode_byte(0x20), ' ');
    }

    #[test]
    fn g0_high_rows_are_accented() {
        // 0x8A: row 8, column 10.
        assert_eq!(Repertoire::G0.decode_byte(0x8A), 'Ñ');
        assert_eq!(Repertoire::G0.decode_byte(0xA9), '€');
    }

    #[test]
    fn g2_high_rows_are_greek() {
        assert_eq!(Repertoire::G2.decode_byte(0x80), 'Α');
        assert_eq!(Repertoire::G2.decode_byte(0xA8), 'ι');
        assert_eq!(Repertoire::G2.decode_byte(0xB8), 'ω');
    }

    #[test]
    fn control_rows_render_as_spaces() {
        assert_eq!(Repertoire::G0.decode_byte(0x05), ' ');
        assert_eq!(Repertoire::G1.decode_byte(0x1F), ' ');
    }

    #[test]
    fn decode_text_basic() {
        assert_eq!(decode_text(b"RADIO 1", 0), "RADIO 1");
    }

    #[test]
    fn decode_text_stops_at_terminator() {
        assert_eq!(decode_text(b"ABC\x00DEF", 0), "ABC");
        assert_eq!(decode_text(b"ABC\x0DDEF", 0), "ABC");
    }

    #[test]
    fn unknown_repertoire_yields_placeholder() {
        assert_eq!(decode_text(b"RADIO 1", 9), UNKNOWN_REPERTOIRE_PLACEHOLDER);
        assert_eq!(Repertoire::from_raw(3), None);
    }

    #[test]
    fn repertoire_from_raw() {
        assert_eq!(Repertoire::from_raw(0), Some(Repertoire::G0));
        assert_eq!(Repertoire::from_raw(1), Some(Repertoire::G1));
        assert_eq!(Repertoire::from_raw(2), Some(Repertoire::G2));
    }
}
