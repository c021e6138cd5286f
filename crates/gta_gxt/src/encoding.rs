//! Text codecs for the string data blocks.
//!
//! Strings are stored zero terminated, either as little endian 16 bit code units or as
//! single bytes mapped through a fixed Western-European table.

use std::{collections::HashMap, sync::LazyLock};

use derive_more::derive::Display;
use widestring::U16String;

use crate::error::{Error, FormatError, Result};

/// Character encoding used by a file's `TDAT` blocks
#[derive(Debug, Display, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    /// Little endian 16 bit code units
    #[display("UTF-16LE")]
    Utf16,

    /// One byte per character, Windows-1252 with the unassigned slots passed through
    #[display("Windows-1252")]
    Windows1252,
}

impl TextEncoding {
    /// Size in bytes of a single code unit, and therefore of the terminator
    pub const fn unit_size(&self) -> usize {
        match self {
            TextEncoding::Utf16 => 2,
            TextEncoding::Windows1252 => 1,
        }
    }

    /// Bits per character as stored in the high half of a hashed file's version field
    pub const fn bits_per_char(&self) -> u32 {
        (self.unit_size() * 8) as u32
    }

    /// Decode a region, stopping at the first zero code unit inside it.
    ///
    /// The region may be padded beyond the terminator; anything after it is ignored.
    /// Decoding never fails: a trailing odd byte is dropped and a lone surrogate is the
    /// only input that can not be represented exactly.
    pub fn decode(&self, region: &[u8]) -> String {
        match self {
            TextEncoding::Utf16 => {
                let units = region
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .take_while(|&unit| unit != 0)
                    .collect::<Vec<_>>();
                U16String::from_vec(units).to_string_lossy()
            }
            TextEncoding::Windows1252 => region
                .iter()
                .take_while(|&&b| b != 0)
                .map(|&b| WINDOWS_1252[b as usize])
                .collect(),
        }
    }

    /// Decode the zero terminated string starting at `offset` within `block`.
    pub fn decode_terminated(&self, block: &[u8], offset: usize) -> Result<String> {
        let region = block.get(offset..).ok_or(FormatError::Truncated)?;
        let unit = self.unit_size();
        let terminated = region
            .chunks_exact(unit)
            .any(|chunk| chunk.iter().all(|&b| b == 0));
        if !terminated {
            return Err(FormatError::Truncated.into());
        }
        Ok(self.decode(region))
    }

    /// Encode a string including its zero terminator.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        if text.contains('\0') {
            return Err(Error::Unencodable {
                ch: '\0',
                encoding: *self,
            });
        }

        match self {
            TextEncoding::Utf16 => {
                let units = U16String::from_str(text).into_vec();
                let mut out = Vec::with_capacity((units.len() + 1) * 2);
                for unit in units.into_iter().chain([0]) {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
                Ok(out)
            }
            TextEncoding::Windows1252 => {
                let mut out = Vec::with_capacity(text.len() + 1);
                for ch in text.chars() {
                    let byte = WINDOWS_1252_REVERSE
                        .get(&ch)
                        .copied()
                        .ok_or(Error::Unencodable { ch, encoding: *self })?;
                    out.push(byte);
                }
                out.push(0);
                Ok(out)
            }
        }
    }

    /// Size in bytes [`TextEncoding::encode`] will produce, terminator included.
    pub fn encoded_len(&self, text: &str) -> usize {
        match self {
            TextEncoding::Utf16 => (text.encode_utf16().count() + 1) * 2,
            TextEncoding::Windows1252 => text.chars().count() + 1,
        }
    }
}

static WINDOWS_1252_REVERSE: LazyLock<HashMap<char, u8>> = LazyLock::new(|| {
    WINDOWS_1252
        .iter()
        .enumerate()
        .map(|(byte, &ch)| (ch, byte as u8))
        .collect()
});

#[rustfmt::skip]
const WINDOWS_1252: [char; 256] = [
    '\u{0000}', '\u{0001}', '\u{0002}', '\u{0003}', '\u{0004}', '\u{0005}', '\u{0006}', '\u{0007}',
    '\u{0008}', '\u{0009}', '\u{000A}', '\u{000B}', '\u{000C}', '\u{000D}', '\u{000E}', '\u{000F}',
    '\u{0010}', '\u{0011}', '\u{0012}', '\u{0013}', '\u{0014}', '\u{0015}', '\u{0016}', '\u{0017}',
    '\u{0018}', '\u{0019}', '\u{001A}', '\u{001B}', '\u{001C}', '\u{001D}', '\u{001E}', '\u{001F}',
    ' ', '!', '"', '#', '$', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/',
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', ';', '<', '=', '>', '?',
    '@', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O',
    'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '[', '\\', ']', '^', '_',
    '`', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o',
    'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', '{', '|', '}', '~', '\u{007F}',
    '€', '\u{0081}', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', '\u{008D}', 'Ž', '\u{008F}',
    '\u{0090}', '‘', '’', '“', '”', '•', '–', '—', '˜', '™', 'š', '›', 'œ', '\u{009D}', 'ž', 'Ÿ',
    '\u{00A0}', '¡', '¢', '£', '¤', '¥', '¦', '§', '¨', '©', 'ª', '«', '¬', '\u{00AD}', '®', '¯',
    '°', '±', '²', '³', '´', 'µ', '¶', '·', '¸', '¹', 'º', '»', '¼', '½', '¾', '¿',
    'À', 'Á', 'Â', 'Ã', 'Ä', 'Å', 'Æ', 'Ç', 'È', 'É', 'Ê', 'Ë', 'Ì', 'Í', 'Î', 'Ï',
    'Ð', 'Ñ', 'Ò', 'Ó', 'Ô', 'Õ', 'Ö', '×', 'Ø', 'Ù', 'Ú', 'Û', 'Ü', 'Ý', 'Þ', 'ß',
    'à', 'á', 'â', 'ã', 'ä', 'å', 'æ', 'ç', 'è', 'é', 'ê', 'ë', 'ì', 'í', 'î', 'ï',
    'ð', 'ñ', 'ò', 'ó', 'ô', 'õ', 'ö', '÷', 'ø', 'ù', 'ú', 'û', 'ü', 'ý', 'þ', 'ÿ',
];

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{TextEncoding, WINDOWS_1252, WINDOWS_1252_REVERSE};
    use crate::error::{Error, FormatError};

    #[test]
    fn single_byte_table_is_a_bijection() {
        assert_eq!(WINDOWS_1252_REVERSE.len(), 256);
        for (byte, ch) in WINDOWS_1252.iter().enumerate() {
            assert_ne!(*ch, char::REPLACEMENT_CHARACTER);
            assert_eq!(WINDOWS_1252_REVERSE[ch] as usize, byte);
        }
    }

    #[test]
    fn single_byte_decodes_every_value() {
        let all = (1u8..=255).collect::<Vec<_>>();
        let text = TextEncoding::Windows1252.decode(&all);

        assert_eq!(text.chars().count(), 255);
        assert!(!text.contains(char::REPLACEMENT_CHARACTER));
        assert_eq!(text.chars().nth(0x80 - 1), Some('€'));
        assert_eq!(text.chars().nth(0x81 - 1), Some('\u{0081}'));
    }

    #[test]
    fn single_byte_encode() -> crate::error::Result<()> {
        assert_eq!(
            TextEncoding::Windows1252.encode("Caf\u{e9} ~r~")?,
            vec![0x43, 0x61, 0x66, 0xE9, 0x20, 0x7E, 0x72, 0x7E, 0x00]
        );
        Ok(())
    }

    #[test]
    fn single_byte_rejects_unknown_characters() {
        let result = TextEncoding::Windows1252.encode("\u{3042}");
        assert!(matches!(
            result,
            Err(Error::Unencodable { ch: '\u{3042}', .. })
        ));
    }

    #[test]
    fn utf16_stops_at_first_zero_unit() {
        #[rustfmt::skip]
        let region = [
            0x48, 0x00, 0x69, 0x00,
            0x00, 0x00,
            0x58, 0x00, 0x00, 0x00,
        ];
        assert_eq!(TextEncoding::Utf16.decode(&region), "Hi");
    }

    #[test]
    fn utf16_encode_appends_terminator() -> crate::error::Result<()> {
        assert_eq!(
            TextEncoding::Utf16.encode("Hi")?,
            vec![0x48, 0x00, 0x69, 0x00, 0x00, 0x00]
        );
        assert_eq!(TextEncoding::Utf16.encoded_len("Hi"), 6);
        assert_eq!(TextEncoding::Utf16.encode("")?, vec![0x00, 0x00]);
        Ok(())
    }

    #[test]
    fn embedded_terminator_is_rejected() {
        for encoding in [TextEncoding::Utf16, TextEncoding::Windows1252] {
            assert!(matches!(
                encoding.encode("a\0b"),
                Err(Error::Unencodable { ch: '\0', .. })
            ));
        }
    }

    #[test]
    fn terminated_string_inside_block() -> crate::error::Result<()> {
        let block = b"ONE\0TWO\0";
        assert_eq!(TextEncoding::Windows1252.decode_terminated(block, 4)?, "TWO");

        let missing = TextEncoding::Windows1252.decode_terminated(b"ABC", 0);
        assert!(matches!(
            missing,
            Err(Error::Format(FormatError::Truncated))
        ));
        Ok(())
    }
}
