use follower_bot_lib::{logger, pipeline};
use follower_bot_lib::{HttpFollowerPage, PipelineConfig, ProfileScraper, RecordStore};

use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use log::{info, warn};

fn main() -> Result<(), Box<dyn Error>> {
    logger::init();
    info!("Starting TikTok follower scrape...");

    // Input list and results table live in the working directory.
    let base_dir = std::env::current_dir()?;
    let config = PipelineConfig::in_dir(&base_dir);
    let store = RecordStore::new(&config.output_file);

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || {
            warn!("Interrupt received. Finishing the in-flight username, then saving and exiting...");
            stop.store(true, Ordering::SeqCst);
        })?;
    }

    // The HTTP session is owned by this scope and dropped on every exit path.
    let scraper = ProfileScraper::new(HttpFollowerPage::new());

    let summary = pipeline::run(&config, &scraper, &store, &stop)?;

    if summary.interrupted {
        info!("Run interrupted by user. Progress saved; rerun to resume.");
    }
    info!(
        "Scraping completed! Total accounts scanned: {}/{}.",
        summary.total_scanned, summary.total_usernames
    );
    Ok(())
}
