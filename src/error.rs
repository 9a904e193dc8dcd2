use thiserror::Error;

/// Failure taxonomy for one analysis run.
///
/// `TransportFailure` never escapes the pipeline: the image host absorbs it
/// by falling back to an inline data URL. The other variants reach the
/// orchestrator, which logs them and degrades to a "no food" outcome rather
/// than surfacing raw error text to the person looking at the screen.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no usable API credential is configured")]
    ConfigurationMissing,

    #[error("image hosting failed: {0}")]
    TransportFailure(String),

    #[error("all candidate models exhausted, last error: {last_error}")]
    ModelFailure { last_error: String },
}
