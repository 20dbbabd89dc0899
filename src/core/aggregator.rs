use crate::domain::model::{LineItem, Order, RawRow, RowKind};
use crate::utils::error::{Result, ShipmentError};

/// Folds raw rows into orders in a single left-to-right pass.
///
/// The most recently started order stays open in `current` so continuation
/// rows can extend it; it is moved into `orders` once the next order starts
/// or the input ends.
#[derive(Debug, Default)]
pub struct OrderAggregator {
    orders: Vec<Order>,
    current: Option<Order>,
}

impl OrderAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: RawRow) -> Result<()> {
        let quantity = parse_quantity(&row)?;

        match row.kind() {
            RowKind::Continuation => {
                let order = self
                    .current
                    .as_mut()
                    .ok_or(ShipmentError::ContinuationWithoutPredecessor { line: row.line })?;
                let item = LineItem {
                    code: row.item_code,
                    name: row.item_name,
                    variant: row.item_variant,
                    quantity,
                };
                order
                    .push_item(item)
                    .map_err(|item| ShipmentError::QuantityOverflow {
                        line: row.line,
                        order_id: order.order_id.clone(),
                        value: item.quantity,
                    })?;
            }
            RowKind::NewOrder => {
                if let Some(done) = self.current.replace(Order::open(row, quantity)) {
                    self.orders.push(done);
                }
            }
        }
        Ok(())
    }

    /// Order still accepting continuation rows.
    pub fn current(&self) -> Option<&Order> {
        self.current.as_ref()
    }

    pub fn finish(mut self) -> Vec<Order> {
        if let Some(done) = self.current.take() {
            self.orders.push(done);
        }
        self.orders
    }
}

/// Groups parsed rows into orders.
///
/// The first row is always treated as the export header and dropped, even if
/// blank-row filtering already removed the real header. Downstream tools rely
/// on this exact behavior, so it is only logged, not corrected.
pub fn aggregate_orders<I>(rows: I) -> Result<Vec<Order>>
where
    I: IntoIterator<Item = RawRow>,
{
    let mut rows = rows.into_iter();

    if let Some(header) = rows.next() {
        if header.item_quantity.trim().parse::<u64>().is_ok() {
            tracing::warn!(
                line = header.line,
                order_id = %header.order_id,
                "Discarding first row as header, but it looks like an order row"
            );
        }
    }

    let mut aggregator = OrderAggregator::new();
    for row in rows {
        aggregator.push(row)?;
    }
    let orders = aggregator.finish();

    tracing::debug!("Aggregated {} orders", orders.len());
    Ok(orders)
}

fn parse_quantity(row: &RawRow) -> Result<u64> {
    row.item_quantity
        .parse::<u64>()
        .map_err(|_| ShipmentError::InvalidQuantity {
            line: row.line,
            value: row.item_quantity.clone(),
        })
}
