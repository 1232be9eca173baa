use thiserror::Error;

/// Why an endpoint page contributed nothing because it could not be read.
/// A page that loads fine but has no support table is not a skip.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("page did not finish loading: {0}")]
    Load(String),

    #[error("could not read page content: {0}")]
    Content(String),
}
