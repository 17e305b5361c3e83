pub mod input_loader;
pub mod normalizer;
pub mod profile_scraper;
pub mod record_store;
pub mod pipeline;
pub mod launcher;
pub mod delay_manager;
pub mod logger;

// Exporting types for convenience
pub use input_loader::InputError;
pub use normalizer::ParseError;
pub use profile_scraper::{FollowerPage, HttpFollowerPage, ProfileScraper};
pub use record_store::{FollowerRecord, Followers, RecordStore};
pub use pipeline::{PipelineConfig, RunSummary};
