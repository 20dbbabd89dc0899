use serde::{Deserialize, Serialize};

/// Order-id value the shop export uses for "same as above" rows.
pub const CONTINUATION_MARKER: &str = "--- 同上 ---";

/// Number of positional columns in one export record.
pub const RAW_FIELD_COUNT: usize = 17;

/// One export record, deserialized positionally from the CSV.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    pub order_id: String,
    pub ordered_at: String,
    pub first_name: String,
    pub last_name: String,
    pub carrier_id: String,
    pub order_number: String,
    pub message_template_id: String,
    pub postal_code: String,
    pub prefecture: String,
    pub address1: String,
    pub address2: String,
    pub phone_number: String,
    pub note: String,
    pub item_code: String,
    pub item_name: String,
    pub item_variant: String,
    pub item_quantity: String,
    /// 1-based line in the source file, for diagnostics only.
    #[serde(skip)]
    pub line: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    NewOrder,
    Continuation,
}

impl RawRow {
    pub fn kind(&self) -> RowKind {
        if self.order_id == CONTINUATION_MARKER {
            RowKind::Continuation
        } else {
            RowKind::NewOrder
        }
    }

    pub fn is_blank(&self) -> bool {
        self.ordered_at.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub code: String,
    pub name: String,
    pub variant: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub order_id: String,
    pub ordered_at: String,
    pub order_number: String,
    pub first_name: String,
    pub last_name: String,
    pub postal_code: String,
    pub prefecture: String,
    pub address1: String,
    pub address2: String,
    total_quantity: u64,
    items: Vec<LineItem>,
}

impl Order {
    /// Opens an order from its first row; the row's item becomes the first line item.
    pub fn open(row: RawRow, quantity: u64) -> Self {
        let item = LineItem {
            code: row.item_code,
            name: row.item_name,
            variant: row.item_variant,
            quantity,
        };
        Self {
            order_id: row.order_id,
            ordered_at: row.ordered_at,
            order_number: row.order_number,
            first_name: row.first_name,
            last_name: row.last_name,
            postal_code: row.postal_code,
            prefecture: row.prefecture,
            address1: row.address1,
            address2: row.address2,
            total_quantity: quantity,
            items: vec![item],
        }
    }

    /// Appends an item and grows the total. Returns the item back if the
    /// total would overflow, leaving the order unchanged.
    pub fn push_item(&mut self, item: LineItem) -> std::result::Result<(), LineItem> {
        match self.total_quantity.checked_add(item.quantity) {
            Some(total) => {
                self.total_quantity = total;
                self.items.push(item);
                Ok(())
            }
            None => Err(item),
        }
    }

    pub fn total_quantity(&self) -> u64 {
        self.total_quantity
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Recipient name as printed on labels: last name followed by first name.
    pub fn recipient_name(&self) -> String {
        format!("{}{}", self.last_name, self.first_name)
    }
}

/// File names written inside the date directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputFiles {
    /// Label format, orders at or below the threshold.
    pub label: String,
    /// Summary format, orders above the threshold.
    pub large: String,
    /// Summary format, every order.
    pub summary: String,
}

impl Default for OutputFiles {
    fn default() -> Self {
        Self {
            label: "clickpost.csv".to_string(),
            large: "other.csv".to_string(),
            summary: "summary.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub orders: Vec<Order>,
    pub row_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputReport {
    pub directory: String,
    pub files: Vec<String>,
    pub order_count: usize,
    pub small_order_count: usize,
    pub large_order_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(order_id: &str, quantity: &str) -> RawRow {
        RawRow {
            order_id: order_id.to_string(),
            ordered_at: "2019-03-01 10:00:00".to_string(),
            first_name: "山田".to_string(),
            last_name: "太郎".to_string(),
            item_name: "Widget".to_string(),
            item_quantity: quantity.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_row_kind() {
        assert_eq!(row("A001", "1").kind(), RowKind::NewOrder);
        assert_eq!(row(CONTINUATION_MARKER, "1").kind(), RowKind::Continuation);
        assert_eq!(row("--- 同上", "1").kind(), RowKind::NewOrder);
    }

    #[test]
    fn test_push_item_keeps_total_in_sync() {
        let mut order = Order::open(row("A001", "3"), 3);
        order.push_item(LineItem {
            code: "G".to_string(),
            name: "Gadget".to_string(),
            variant: String::new(),
            quantity: 2,
        })
        .unwrap();

        assert_eq!(order.items().len(), 2);
        assert_eq!(order.total_quantity(), 5);
        assert_eq!(
            order.total_quantity(),
            order.items().iter().map(|i| i.quantity).sum::<u64>()
        );
    }

    #[test]
    fn test_push_item_rejects_overflowing_total() {
        let mut order = Order::open(row("A001", "1"), u64::MAX);
        let rejected = order
            .push_item(LineItem {
                code: "G".to_string(),
                name: "Gadget".to_string(),
                variant: String::new(),
                quantity: 1,
            })
            .unwrap_err();

        assert_eq!(rejected.quantity, 1);
        assert_eq!(order.total_quantity(), u64::MAX);
        assert_eq!(order.items().len(), 1);
    }

    #[test]
    fn test_recipient_name_is_last_then_first() {
        let order = Order::open(row("A001", "1"), 1);
        assert_eq!(order.recipient_name(), "太郎山田");
    }
}
