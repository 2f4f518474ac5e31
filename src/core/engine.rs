use crate::domain::model::LoadSummary;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct RenderEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> RenderEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<LoadSummary> {
        let started = Instant::now();
        tracing::info!("Starting render pass...");

        // Extract
        let documents = self.pipeline.extract().await?;
        tracing::info!("Extracted {} documents", documents.len());

        // Transform
        let result = self.pipeline.transform(documents).await?;
        tracing::info!(
            "Rendered {} widgets, skipped {}",
            result.widgets_applied(),
            result.widgets_skipped()
        );

        // Load
        let summary = self.pipeline.load(result).await?;
        tracing::info!(
            "Wrote {} outputs in {:?}",
            summary.outputs.len(),
            started.elapsed()
        );

        Ok(summary)
    }
}
