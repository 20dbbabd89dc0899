use crate::core::aggregator::aggregate_orders;
use crate::core::encoding::OutputEncoding;
use crate::core::parser::parse_rows;
use crate::core::serializer::{write_label_format, write_summary_format};
use crate::core::splitter::split_by_quantity;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{OutputReport, RawRow, TransformResult};
use crate::utils::error::Result;
use chrono::{Local, NaiveDate};

/// Runs one uploaded export through parse, aggregate, split and render.
pub struct ShipmentPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    input: Vec<u8>,
    run_date: Option<NaiveDate>,
}

impl<S: Storage, C: ConfigProvider> ShipmentPipeline<S, C> {
    pub fn new(storage: S, config: C, input: Vec<u8>) -> Self {
        Self {
            storage,
            config,
            input,
            run_date: None,
        }
    }

    /// Pins the date directory instead of using today's local date.
    pub fn with_run_date(mut self, date: NaiveDate) -> Self {
        self.run_date = Some(date);
        self
    }

    fn date_dir(&self) -> String {
        self.run_date
            .unwrap_or_else(|| Local::now().date_naive())
            .format("%Y%m%d")
            .to_string()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ShipmentPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<RawRow>> {
        tracing::debug!("Parsing {} input bytes", self.input.len());
        parse_rows(self.input.as_slice())
    }

    async fn transform(&self, rows: Vec<RawRow>) -> Result<TransformResult> {
        let row_count = rows.len();
        let orders = aggregate_orders(rows)?;
        Ok(TransformResult { orders, row_count })
    }

    async fn load(&self, result: TransformResult) -> Result<OutputReport> {
        let threshold = self.config.quantity_threshold();
        let encoding = OutputEncoding::from_selector(self.config.target_os());
        let split = split_by_quantity(&result.orders, threshold);

        tracing::debug!(
            "Split {} orders at threshold {}: {} small, {} large",
            result.orders.len(),
            threshold,
            split.small.len(),
            split.large.len()
        );

        // Render everything before touching storage so a bad row leaves no files.
        let mut label = Vec::new();
        write_label_format(&mut label, split.small.iter().copied(), encoding)?;
        let mut large = Vec::new();
        write_summary_format(&mut large, split.large.iter().copied(), encoding)?;
        let mut summary = Vec::new();
        write_summary_format(&mut summary, &result.orders, encoding)?;

        let dir = self.date_dir();
        let names = self.config.output_files();
        let mut files = Vec::with_capacity(3);
        for (name, data) in [
            (&names.label, &label),
            (&names.large, &large),
            (&names.summary, &summary),
        ] {
            let path = format!("{}/{}", dir, name);
            tracing::debug!("Writing {} ({} bytes)", path, data.len());
            self.storage.write_file(&path, data).await?;
            files.push(format!("{}/{}", self.config.output_path(), path));
        }

        Ok(OutputReport {
            directory: format!("{}/{}", self.config.output_path(), dir),
            files,
            order_count: result.orders.len(),
            small_order_count: split.small.len(),
            large_order_count: split.large.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::OutputFiles;
    use crate::utils::error::ShipmentError;
    use encoding_rs::SHIFT_JIS;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        target_os: String,
        output_files: OutputFiles,
    }

    impl MockConfig {
        fn new(target_os: &str) -> Self {
            Self {
                target_os: target_os.to_string(),
                output_files: OutputFiles::default(),
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn output_path(&self) -> &str {
            "test_output"
        }

        fn quantity_threshold(&self) -> u64 {
            4
        }

        fn target_os(&self) -> &str {
            &self.target_os
        }

        fn output_files(&self) -> &OutputFiles {
            &self.output_files
        }
    }

    fn export(lines: &[&str]) -> Vec<u8> {
        let header = "注文ID,注文日時,氏(配送先),名(配送先),配送業者ID,伝票番号,メッセージテンプレートID,郵便番号(配送先),都道府県(配送先),住所(配送先),住所2(配送先),電話番号(配送先),備考,商品コード,商品名,バリエーション,数量";
        let mut text = String::from(header);
        for line in lines {
            text.push('\n');
            text.push_str(line);
        }
        text.push('\n');
        SHIFT_JIS.encode(&text).0.into_owned()
    }

    fn sample() -> Vec<u8> {
        export(&[
            "A001,2019-03-01 10:00,山田,太郎,1,,,100-0001,東京都,千代田区1-1,,03,,W,Widget,,3",
            "--- 同上 ---,2019-03-01 10:00,,,,,,,,,,,,G,Gadget,,2",
            "A002,2019-03-02 11:00,佐藤,花子,1,,,530-0001,大阪府,北区2-2,,06,,B,Bolt,,10",
        ])
    }

    fn pipeline(storage: MockStorage, input: Vec<u8>) -> ShipmentPipeline<MockStorage, MockConfig> {
        ShipmentPipeline::new(storage, MockConfig::new("mac"), input)
            .with_run_date(NaiveDate::from_ymd_opt(2019, 3, 2).unwrap())
    }

    #[tokio::test]
    async fn test_transform_merges_continuation_rows() {
        let pipeline = pipeline(MockStorage::default(), sample());

        let rows = pipeline.extract().await.unwrap();
        assert_eq!(rows.len(), 4);

        let result = pipeline.transform(rows).await.unwrap();
        assert_eq!(result.row_count, 4);
        let totals: Vec<u64> = result.orders.iter().map(|o| o.total_quantity()).collect();
        assert_eq!(totals, vec![5, 10]);
    }

    #[tokio::test]
    async fn test_load_writes_three_files_under_date_dir() {
        let storage = MockStorage::default();
        let pipeline = pipeline(storage.clone(), sample());

        let rows = pipeline.extract().await.unwrap();
        let result = pipeline.transform(rows).await.unwrap();
        let report = pipeline.load(result).await.unwrap();

        assert_eq!(report.directory, "test_output/20190302");
        assert_eq!(report.order_count, 2);
        assert_eq!(report.small_order_count, 0);
        assert_eq!(report.large_order_count, 2);

        let label = storage.get_file("20190302/clickpost.csv").await.unwrap();
        let label = String::from_utf8(label).unwrap();
        assert_eq!(label.lines().count(), 1);

        let other = String::from_utf8(storage.get_file("20190302/other.csv").await.unwrap()).unwrap();
        assert!(other.contains("A001"));
        assert!(other.contains(" Widget 3個/ Gadget 2個/"));
        assert!(other.contains("A002"));

        let summary = storage.get_file("20190302/summary.csv").await.unwrap();
        assert_eq!(String::from_utf8(summary).unwrap(), other);
    }

    #[tokio::test]
    async fn test_load_writes_nothing_when_a_row_cannot_be_encoded() {
        let storage = MockStorage::default();
        let input = export(&["A001,2019-03-01,山田,太郎,,,,100-0001,東京都,x,,,,W,Widget,,1"]);
        let pipeline = ShipmentPipeline::new(storage.clone(), MockConfig::new("win"), input)
            .with_run_date(NaiveDate::from_ymd_opt(2019, 3, 2).unwrap());

        let rows = pipeline.extract().await.unwrap();
        let mut result = pipeline.transform(rows).await.unwrap();
        // Inject a character Shift-JIS cannot carry.
        result.orders.push(result.orders[0].clone());
        result.orders[0].prefecture = "🗾".to_string();
        let err = pipeline.load(result).await.unwrap_err();

        assert!(matches!(err, ShipmentError::SerializationWriteError { .. }));
        assert!(storage.files.lock().await.is_empty());
    }
}
