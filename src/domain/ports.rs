use crate::core::renderer::RenderOptions;
use crate::domain::model::{LoadSummary, RenderResult, SourceDocument};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn inputs(&self) -> &[String];
    fn output_dir(&self) -> &str;
    fn in_place(&self) -> bool;
    fn dry_run(&self) -> bool;
    fn report_formats(&self) -> &[String];
    fn archive(&self) -> Option<&str>;
    fn timeout_seconds(&self) -> u64;
    fn extensions(&self) -> &[String];
    fn render_options(&self) -> Result<RenderOptions>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<SourceDocument>>;
    async fn transform(&self, documents: Vec<SourceDocument>) -> Result<RenderResult>;
    async fn load(&self, result: RenderResult) -> Result<LoadSummary>;
}
