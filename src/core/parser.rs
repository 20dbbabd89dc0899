use crate::core::encoding::decode_shift_jis;
use crate::domain::model::{RawRow, RAW_FIELD_COUNT};
use crate::utils::error::{Result, ShipmentError};
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;

/// Reads a Shift-JIS order export into raw rows.
///
/// Rows with an empty order timestamp are separators and are dropped here.
/// The header row is returned like any other row; the aggregator discards it.
pub fn parse_rows<R: Read>(mut input: R) -> Result<Vec<RawRow>> {
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes)?;
    let text = decode_shift_jis(&bytes)?;
    check_quoting(&text)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut lines = LineCounter::new(text.as_bytes());
    let mut rows = Vec::new();
    let mut blank = 0usize;
    let mut record = StringRecord::new();

    loop {
        let more = reader
            .read_record(&mut record)
            .map_err(|e| ShipmentError::RecordSyntaxError {
                line: e
                    .position()
                    .map(|p| lines.line_at(p.byte() as usize))
                    .unwrap_or(0),
                message: e.to_string(),
            })?;
        if !more {
            break;
        }

        let line = record
            .position()
            .map(|p| lines.line_at(p.byte() as usize))
            .unwrap_or(0);
        let row = to_raw_row(&record, line)?;
        if row.is_blank() {
            blank += 1;
            continue;
        }
        rows.push(row);
    }

    tracing::debug!("Parsed {} rows ({} blank rows skipped)", rows.len(), blank);
    Ok(rows)
}

fn to_raw_row(record: &StringRecord, line: u64) -> Result<RawRow> {
    if record.len() != RAW_FIELD_COUNT {
        return Err(ShipmentError::MalformedRecord {
            line,
            expected: RAW_FIELD_COUNT,
            found: record.len(),
        });
    }

    let mut row: RawRow =
        record
            .deserialize(None)
            .map_err(|e| ShipmentError::RecordSyntaxError {
                line,
                message: e.to_string(),
            })?;
    row.line = line;
    Ok(row)
}

/// Maps byte offsets to 1-based line numbers by counting `\n`, so CRLF and
/// LF exports number their lines the same way. Offsets must not decrease.
struct LineCounter<'a> {
    text: &'a [u8],
    offset: usize,
    line: u64,
}

impl<'a> LineCounter<'a> {
    fn new(text: &'a [u8]) -> Self {
        Self {
            text,
            offset: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, byte: usize) -> u64 {
        let end = byte.min(self.text.len());
        if end > self.offset {
            let newlines = self.text[self.offset..end]
                .iter()
                .filter(|&&b| b == b'\n')
                .count();
            self.line += newlines as u64;
            self.offset = end;
        }
        self.line
    }
}

/// Rejects quoting the csv reader would otherwise accept: a `"` inside an
/// unquoted field, text after a closing quote, or a quoted field that never
/// closes.
fn check_quoting(text: &str) -> Result<()> {
    let syntax = |line: u64, message: &str| ShipmentError::RecordSyntaxError {
        line,
        message: message.to_string(),
    };

    let bytes = text.as_bytes();
    let mut line = 1u64;
    let mut field_start = true;
    let mut i = 0;

    while i < bytes.len() {
        if field_start && bytes[i] == b'"' {
            let opened_at = line;
            i += 1;
            loop {
                match bytes.get(i) {
                    None => return Err(syntax(opened_at, "quoted field is never closed")),
                    Some(b'"') if bytes.get(i + 1) == Some(&b'"') => i += 2,
                    Some(b'"') => {
                        i += 1;
                        match bytes.get(i) {
                            None | Some(b',') | Some(b'\n') => break,
                            Some(b'\r') if matches!(bytes.get(i + 1), None | Some(b'\n')) => break,
                            _ => return Err(syntax(line, "extraneous `\"` after quoted field")),
                        }
                    }
                    Some(b'\n') => {
                        line += 1;
                        i += 1;
                    }
                    Some(_) => i += 1,
                }
            }
            field_start = false;
            continue;
        }

        match bytes[i] {
            b',' => field_start = true,
            b'\n' => {
                line += 1;
                field_start = true;
            }
            b'"' => return Err(syntax(line, "bare `\"` in unquoted field")),
            _ => field_start = false,
        }
        i += 1;
    }
    Ok(())
}
