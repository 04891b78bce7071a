use crate::domain::model::{BackgroundAsset, GenerationOutput, Roster};
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
    fn roster_path(&self) -> &str;
    fn background_path(&self) -> &str;
    fn output_path(&self) -> &str;
    /// Host the frontend is served from; decides which backend base is used.
    fn serving_host(&self) -> &str;
    /// Explicit backend base, bypassing host-based resolution.
    fn endpoint_override(&self) -> Option<&str>;
    fn bundle_enabled(&self) -> bool;
}

/// Observer invoked after every completed certificate with the run progress
/// as a percentage.
pub type ProgressSink<'a> = &'a mut (dyn FnMut(f64) + Send);

#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Read and validate the roster CSV and background image.
    async fn gather(&self) -> Result<(Roster, BackgroundAsset)>;

    /// Render one certificate per record, strictly sequentially, failing the
    /// whole run on the first error.
    async fn render(
        &self,
        roster: &Roster,
        background: Option<&BackgroundAsset>,
        on_progress: ProgressSink<'_>,
    ) -> Result<GenerationOutput>;

    /// Write the rendered certificates and run artifacts to the output
    /// directory, returning its path.
    async fn deliver(&self, roster: &Roster, output: &GenerationOutput) -> Result<String>;
}
