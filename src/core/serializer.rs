//! CSV renderers for the label printer and the packing summary.

use crate::core::encoding::OutputEncoding;
use crate::domain::model::Order;
use crate::utils::error::{Result, ShipmentError};
use csv::{QuoteStyle, Writer, WriterBuilder};
use std::borrow::Cow;
use std::io::Write;

const LABEL_HEADER: &[&str] = &[
    "お届け先郵便番号",
    "お届け先氏名",
    "お届け先敬称",
    "お届け先住所1行目",
    "お届け先住所2行目",
    "お届け先住所3行目",
    "お届け先住所4行目",
    "内容品",
];

const SUMMARY_HEADER: &[&str] = &[
    "注文番号",
    "注文時間",
    "郵便番号",
    "都道府県",
    "住所1",
    "住所2",
    "氏名",
    "商品",
    "総商品数",
];

const HONORIFIC: &str = "様";
const LABEL_CONTENTS: &str = "CD";
const QUANTITY_UNIT: &str = "個/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Click Post label sheet.
    Label,
    /// One line per order with every item spelled out.
    Summary,
}

impl OutputFormat {
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Label => "label",
            OutputFormat::Summary => "summary",
        }
    }

    pub fn header(self) -> &'static [&'static str] {
        match self {
            OutputFormat::Label => LABEL_HEADER,
            OutputFormat::Summary => SUMMARY_HEADER,
        }
    }

    pub fn render(self, order: &Order) -> Vec<String> {
        match self {
            OutputFormat::Label => label_row(order),
            OutputFormat::Summary => summary_row(order),
        }
    }
}

fn label_row(order: &Order) -> Vec<String> {
    vec![
        order.postal_code.clone(),
        order.recipient_name(),
        HONORIFIC.to_string(),
        order.prefecture.clone(),
        order.address1.clone(),
        order.address2.clone(),
        String::new(),
        LABEL_CONTENTS.to_string(),
    ]
}

fn summary_row(order: &Order) -> Vec<String> {
    vec![
        order.order_id.clone(),
        order.ordered_at.clone(),
        order.postal_code.clone(),
        order.prefecture.clone(),
        order.address1.clone(),
        order.address2.clone(),
        order.recipient_name(),
        describe_items(order),
        order.total_quantity().to_string(),
    ]
}

/// `" <name> <qty>個/"` per item, concatenated. The leading space is part of
/// the format the packing staff are used to.
pub fn describe_items(order: &Order) -> String {
    order
        .items()
        .iter()
        .map(|item| format!(" {} {}{}", item.name, item.quantity, QUANTITY_UNIT))
        .collect()
}

/// Writes the header and one row per order, then flushes `out`.
pub fn write_orders<'a, W, I>(
    mut out: W,
    orders: I,
    format: OutputFormat,
    encoding: OutputEncoding,
) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Order>,
{
    let mut rows = RowWriter::new(format, encoding);

    let header: Vec<String> = format.header().iter().map(|s| s.to_string()).collect();
    rows.write(&mut out, header)?;

    let mut written = 0usize;
    for order in orders {
        rows.write(&mut out, format.render(order))?;
        written += 1;
    }

    out.flush()?;
    tracing::debug!(
        "Wrote {} {} rows ({:?})",
        written,
        format.name(),
        encoding
    );
    Ok(())
}

pub fn write_label_format<'a, W, I>(out: W, orders: I, encoding: OutputEncoding) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Order>,
{
    write_orders(out, orders, OutputFormat::Label, encoding)
}

pub fn write_summary_format<'a, W, I>(out: W, orders: I, encoding: OutputEncoding) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Order>,
{
    write_orders(out, orders, OutputFormat::Summary, encoding)
}

/// Renders rows into one UTF-8 buffer, then encodes each new row and copies
/// it to the output.
///
/// Quoting is decided here instead of by the csv writer: a field is quoted
/// when it contains a delimiter, quote or line break, starts with whitespace,
/// or is exactly `\.`.
struct RowWriter {
    format: OutputFormat,
    encoding: OutputEncoding,
    csv: Writer<Vec<u8>>,
    rendered: usize,
}

impl RowWriter {
    fn new(format: OutputFormat, encoding: OutputEncoding) -> Self {
        let csv = WriterBuilder::new()
            .quote_style(QuoteStyle::Never)
            .terminator(encoding.terminator())
            .from_writer(Vec::new());
        Self {
            format,
            encoding,
            csv,
            rendered: 0,
        }
    }

    fn write<W: Write>(&mut self, out: &mut W, fields: Vec<String>) -> Result<()> {
        let crlf = self.encoding == OutputEncoding::ShiftJisCrlf;
        let recorded = {
            let quoted: Vec<Cow<'_, str>> = fields.iter().map(|f| quote_field(f, crlf)).collect();
            self.csv.write_record(quoted.iter().map(|f| f.as_bytes()))
        };
        if let Err(e) = recorded {
            return Err(self.fail(fields, e.to_string()));
        }
        if let Err(e) = self.csv.flush() {
            return Err(self.fail(fields, e.to_string()));
        }

        let buffer = self.csv.get_ref();
        let line = &buffer[self.rendered..];
        self.rendered = buffer.len();

        let text = match std::str::from_utf8(line) {
            Ok(text) => text,
            Err(e) => return Err(self.fail(fields, e.to_string())),
        };
        let bytes = match self.encoding.encode(text) {
            Ok(bytes) => bytes,
            Err(reason) => return Err(self.fail(fields, reason)),
        };
        if let Err(e) = out.write_all(&bytes) {
            return Err(self.fail(fields, e.to_string()));
        }
        Ok(())
    }

    fn fail(&self, row: Vec<String>, reason: String) -> ShipmentError {
        ShipmentError::SerializationWriteError {
            format: self.format.name(),
            row,
            reason,
        }
    }
}

fn needs_quotes(field: &str) -> bool {
    if field.is_empty() {
        return false;
    }
    if field == "\\." {
        return true;
    }
    if field.contains([',', '"', '\r', '\n']) {
        return true;
    }
    field.chars().next().is_some_and(char::is_whitespace)
}

/// Quotes and escapes one field. Inside quotes, line breaks follow the row
/// terminator: CRLF output turns `\n` into `\r\n` and drops bare `\r`.
fn quote_field(field: &str, crlf: bool) -> Cow<'_, str> {
    if !needs_quotes(field) {
        return Cow::Borrowed(field);
    }

    let mut quoted = String::with_capacity(field.len() + 2);
    quoted.push('"');
    for c in field.chars() {
        match c {
            '"' => quoted.push_str("\"\""),
            '\r' if crlf => {}
            '\n' if crlf => quoted.push_str("\r\n"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    Cow::Owned(quoted)
}
