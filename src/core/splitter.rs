use crate::domain::model::Order;

/// Orders above this total go to the summary file instead of label printing.
pub const DEFAULT_QUANTITY_THRESHOLD: u64 = 4;

#[derive(Debug)]
pub struct QuantitySplit<'a> {
    /// Total quantity at or below the threshold.
    pub small: Vec<&'a Order>,
    /// Total quantity above the threshold.
    pub large: Vec<&'a Order>,
}

pub fn split_by_quantity(orders: &[Order], threshold: u64) -> QuantitySplit<'_> {
    let (small, large) = orders
        .iter()
        .partition(|order| order.total_quantity() <= threshold);
    QuantitySplit { small, large }
}
