pub mod aggregator;
pub mod encoding;
pub mod etl;
pub mod parser;
pub mod pipeline;
pub mod serializer;
pub mod splitter;

pub use crate::domain::model::{LineItem, Order, RawRow, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
