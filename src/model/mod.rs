pub mod classifier;
pub mod loader;

pub use classifier::Classifier;
pub use loader::LogisticModel;
