pub mod settings;

pub use settings::{AppConfig, DatasetSettings, TrainerSettings};
