use thiserror::Error;

/// Conditions that stop the pipeline and produce exit status 1.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no records found")]
    NoRecords,
    #[error("error during scraping: {0:#}")]
    Extraction(anyhow::Error),
}
