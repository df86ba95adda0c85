pub mod model;
pub mod persistence;

pub use model::{DoublingPredictor, TrainingReport};
pub use persistence::ModelStore;
