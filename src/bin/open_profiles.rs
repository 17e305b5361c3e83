use follower_bot_lib::{launcher, logger};
use follower_bot_lib::launcher::LaunchFilter;
use follower_bot_lib::pipeline::DEFAULT_OUTPUT_FILE;
use follower_bot_lib::RecordStore;

use std::error::Error;
use std::io::{self, Write};
use log::{error, info};

fn prompt(message: &str) -> io::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}

fn main() -> Result<(), Box<dyn Error>> {
    logger::init();

    let min_followers =
        launcher::parse_min_followers(&prompt("Enter the minimum number of followers: ")?);
    let max_followers = launcher::parse_max_followers(&prompt(
        "Enter the maximum number of followers (0 for unlimited): ",
    )?);
    let delay_secs = launcher::parse_delay_secs(&prompt(
        "Enter the delay between openings in seconds \
         (at least 2 seconds is recommended to avoid traffic blocks): ",
    )?);

    let store = RecordStore::new(std::env::current_dir()?.join(DEFAULT_OUTPUT_FILE));
    if !store.exists() {
        error!(
            "The file {:?} was not found. Run the scraper first to produce it.",
            store.path()
        );
        return Ok(());
    }

    let records = store.read_all()?;
    let filter = LaunchFilter {
        min_followers,
        max_followers,
    };
    let profiles = launcher::filter_and_sort(records, &filter);
    info!(
        "{} profiles in range. Opening with a {:.1}s delay between tabs...",
        profiles.len(),
        delay_secs
    );

    launcher::launch(&profiles, delay_secs);
    Ok(())
}
