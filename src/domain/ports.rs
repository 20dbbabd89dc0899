use crate::domain::model::{OutputFiles, OutputReport, RawRow, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Destination for rendered output files, addressed by relative path.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn output_path(&self) -> &str;
    fn quantity_threshold(&self) -> u64;
    /// Encoding selector; `"win"` picks Shift-JIS with CRLF.
    fn target_os(&self) -> &str;
    fn output_files(&self) -> &OutputFiles;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawRow>>;
    async fn transform(&self, rows: Vec<RawRow>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<OutputReport>;
}
