use std::sync::Arc;

use crate::config::Config;
use crate::ocr::ExtractionProvider;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub extractor: ExtractionProvider,
}

impl AppState {
    pub fn new(config: Config, extractor: ExtractionProvider) -> Self {
        Self {
            config: Arc::new(config),
            extractor,
        }
    }

    /// Build the extraction provider from `config.gemini`.
    pub fn from_config(config: Config) -> Self {
        let extractor = ExtractionProvider::new(&config.gemini);
        Self::new(config, extractor)
    }
}
