use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::models::{AnalysisResult, ImageBlob};
use crate::services::{interpreter, GroqVisionClient, ImageHost, ImgBbClient, VisionService};

/// Progress milestone emitted at each stage boundary.
///
/// Stages take wildly different real-world time, so observers must not
/// assume uniform pacing between milestones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    Hosting,
    Classifying,
    Interpreting,
}

impl AnalysisStage {
    pub fn percent(self) -> u8 {
        match self {
            AnalysisStage::Hosting => 33,
            AnalysisStage::Classifying => 66,
            AnalysisStage::Interpreting => 100,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AnalysisStage::Hosting => "Uploading image",
            AnalysisStage::Classifying => "Analyzing food",
            AnalysisStage::Interpreting => "Reading results",
        }
    }
}

/// Orchestrates host → classify → interpret for one image.
///
/// Each invocation is self-contained: no state is shared between runs, and
/// the three network-bound stages run strictly in sequence because each
/// depends on the previous stage's output.
pub struct AnalysisPipeline {
    host: Arc<dyn ImageHost>,
    vision: Arc<dyn VisionService>,
}

impl AnalysisPipeline {
    pub fn new(host: Arc<dyn ImageHost>, vision: Arc<dyn VisionService>) -> Self {
        Self { host, vision }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(ImgBbClient::new(
                config.imgbb_api_key.clone(),
                config.imgbb_endpoint.clone(),
            )),
            Arc::new(GroqVisionClient::new(
                config.groq_api_key.clone(),
                config.models.clone(),
                config.groq_endpoint.clone(),
            )),
        )
    }

    pub async fn analyze(&self, blob: &ImageBlob) -> Result<AnalysisResult, PipelineError> {
        self.analyze_with_progress(blob, |_| {}).await
    }

    /// Run the full pipeline, invoking `on_progress` at each stage boundary.
    pub async fn analyze_with_progress<F>(
        &self,
        blob: &ImageBlob,
        mut on_progress: F,
    ) -> Result<AnalysisResult, PipelineError>
    where
        F: FnMut(AnalysisStage),
    {
        on_progress(AnalysisStage::Hosting);
        let image_ref = self.host.host_image(blob).await;

        on_progress(AnalysisStage::Classifying);
        let raw = self.vision.classify_food(&image_ref).await?;

        on_progress(AnalysisStage::Interpreting);
        Ok(interpreter::interpret(&raw))
    }

    /// Display policy: people looking at a result card should see "nothing
    /// detected" rather than raw error text. The precise failure is still
    /// logged for diagnostics.
    pub async fn analyze_or_no_food<F>(&self, blob: &ImageBlob, on_progress: F) -> AnalysisResult
    where
        F: FnMut(AnalysisStage),
    {
        match self.analyze_with_progress(blob, on_progress).await {
            Ok(result) => result,
            Err(err) => {
                log::error!("❌ Analysis failed: {}", err);
                AnalysisResult::NoFood
            }
        }
    }
}
