use crate::core::Pipeline;
use crate::domain::model::OutputReport;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<OutputReport> {
        let started = Instant::now();
        tracing::info!("Starting shipment export");

        // Extract
        let phase = Instant::now();
        let rows = self.pipeline.extract().await?;
        tracing::info!("Parsed {} rows in {:?}", rows.len(), phase.elapsed());

        // Transform
        let phase = Instant::now();
        let result = self.pipeline.transform(rows).await?;
        tracing::info!(
            "Aggregated {} rows into {} orders in {:?}",
            result.row_count,
            result.orders.len(),
            phase.elapsed()
        );

        // Load
        let phase = Instant::now();
        let report = self.pipeline.load(result).await?;
        tracing::info!(
            "Wrote {} files to {} in {:?} ({} label orders, {} large orders)",
            report.files.len(),
            report.directory,
            phase.elapsed(),
            report.small_order_count,
            report.large_order_count
        );

        tracing::info!("Shipment export finished in {:?}", started.elapsed());
        Ok(report)
    }
}
