use crate::error::Result;
use crate::types::FeatureRow;

/// Batched binary classifier. Both operations return one value per input
/// row, index-aligned with `batch`.
pub trait Classifier: Send + Sync {
    /// Short identifier for logs and /health.
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    /// Hard labels, 0 or 1.
    fn predict(&self, batch: &[FeatureRow]) -> Result<Vec<u8>>;

    /// Positive-class probability in [0, 1].
    fn predict_probability(&self, batch: &[FeatureRow]) -> Result<Vec<f64>>;
}
