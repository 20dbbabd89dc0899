//! Shift-JIS codec boundary.
//!
//! Shop exports arrive as Shift-JIS. Outputs are either Shift-JIS with CRLF
//! (for the Windows label software) or UTF-8 with `\n`.

use crate::utils::error::{Result, ShipmentError};
use csv::Terminator;
use encoding_rs::{DecoderResult, SHIFT_JIS};
use std::borrow::Cow;

/// Selector value that switches the output to Shift-JIS + CRLF.
pub const WINDOWS_SELECTOR: &str = "win";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputEncoding {
    /// Shift-JIS with CRLF line endings.
    ShiftJisCrlf,
    /// UTF-8 with `\n` line endings.
    #[default]
    Utf8,
}

impl OutputEncoding {
    pub fn from_selector(selector: &str) -> Self {
        if selector == WINDOWS_SELECTOR {
            OutputEncoding::ShiftJisCrlf
        } else {
            OutputEncoding::Utf8
        }
    }

    pub fn terminator(self) -> Terminator {
        match self {
            OutputEncoding::ShiftJisCrlf => Terminator::CRLF,
            OutputEncoding::Utf8 => Terminator::Any(b'\n'),
        }
    }

    /// Encodes already-rendered UTF-8 text. Fails with a reason when a
    /// character has no representation in the target encoding.
    pub fn encode<'a>(self, text: &'a str) -> std::result::Result<Cow<'a, [u8]>, String> {
        match self {
            OutputEncoding::Utf8 => Ok(Cow::Borrowed(text.as_bytes())),
            OutputEncoding::ShiftJisCrlf => {
                let (bytes, _, had_errors) = SHIFT_JIS.encode(text);
                if had_errors {
                    let unmappable: String = text
                        .chars()
                        .filter(|c| {
                            let mut buf = [0u8; 4];
                            SHIFT_JIS.encode(c.encode_utf8(&mut buf)).2
                        })
                        .collect();
                    return Err(format!(
                        "characters {:?} cannot be represented in Shift_JIS",
                        unmappable
                    ));
                }
                Ok(bytes)
            }
        }
    }
}

/// Decodes a whole Shift-JIS payload without replacement characters.
pub fn decode_shift_jis(bytes: &[u8]) -> Result<String> {
    let mut decoder = SHIFT_JIS.new_decoder_without_bom_handling();
    let capacity = decoder
        .max_utf8_buffer_length_without_replacement(bytes.len())
        .unwrap_or(bytes.len() * 3);
    let mut text = String::with_capacity(capacity);
    let mut consumed = 0;

    loop {
        let (result, read) =
            decoder.decode_to_string_without_replacement(&bytes[consumed..], &mut text, true);
        consumed += read;

        match result {
            DecoderResult::InputEmpty => return Ok(text),
            DecoderResult::OutputFull => {
                let remaining = bytes.len() - consumed;
                text.reserve(
                    decoder
                        .max_utf8_buffer_length_without_replacement(remaining)
                        .unwrap_or(remaining * 3)
                        .max(4),
                );
            }
            DecoderResult::Malformed(bad, extra) => {
                let offset = consumed - bad as usize - extra as usize;
                return Err(ShipmentError::DecodeError { offset });
            }
        }
    }
}
