use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use log::{info, warn, error};

use crate::input_loader::{self, InputError};
use crate::profile_scraper::{FollowerPage, ProfileScraper};
use crate::record_store::{FollowerRecord, RecordStore};

pub const DEFAULT_INPUT_FILE: &str = "Follower.txt";
pub const DEFAULT_OUTPUT_FILE: &str = "TikTok_Followers.csv";

pub struct PipelineConfig {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
}

impl PipelineConfig {
    /// Input and output live beside each other in one base directory.
    pub fn in_dir(base: &Path) -> Self {
        PipelineConfig {
            input_file: base.join(DEFAULT_INPUT_FILE),
            output_file: base.join(DEFAULT_OUTPUT_FILE),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total_usernames: usize,
    /// Processed this run plus previously processed.
    pub scanned_count: usize,
    /// Rows accounted for in the output file, skipped ones included.
    pub total_scanned: usize,
    pub newly_processed: usize,
    pub skipped: usize,
    pub interrupted: bool,
}

/// One resumable scrape run: backup, load, then scrape-and-append.
///
/// Only a failed input load aborts. Store write failures are logged and the
/// run continues; per-username scrape failures come back as data from the
/// scraper and are appended like any other result.
pub fn run<P: FollowerPage>(
    config: &PipelineConfig,
    scraper: &ProfileScraper<P>,
    store: &RecordStore,
    stop: &AtomicBool,
) -> Result<RunSummary, InputError> {
    store.backup();

    let usernames = input_loader::load_usernames(&config.input_file)?;
    let total_usernames = usernames.len();

    // Point-in-time snapshot, not updated as the run appends. The input list
    // is expected deduplicated; a username listed twice gets scraped twice.
    let processed: HashSet<String> = store.load_processed_usernames();
    let already_processed = processed.len();
    info!("Skipping {} previously checked usernames.", already_processed);

    let mut summary = RunSummary {
        total_usernames,
        scanned_count: already_processed,
        total_scanned: already_processed,
        ..Default::default()
    };

    for username in &usernames {
        if stop.load(Ordering::SeqCst) {
            warn!("Interrupt received. Stopping before {}.", username);
            summary.interrupted = true;
            break;
        }

        if processed.contains(username) {
            info!("Skipping already processed username: {}", username);
            summary.skipped += 1;
            continue;
        }

        let followers = scraper.fetch(username);
        let record = FollowerRecord {
            username: username.clone(),
            followers,
        };
        // Flushed per username: a crash loses at most the in-flight result.
        if let Err(e) = store.append(&record) {
            error!("Failed to write record for {}: {}", username, e);
        }

        summary.newly_processed += 1;
        summary.scanned_count += 1;
        summary.total_scanned += 1;
        info!(
            "Scanned: {}/{} accounts. Total in file: {}",
            summary.scanned_count, total_usernames, summary.total_scanned
        );
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile_scraper::FetchError;
    use crate::record_store::Followers;
    use std::collections::HashMap;
    use std::fs;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    /// Page fake scripted per username; missing usernames always fail.
    /// Optionally trips a stop flag when a given username is fetched, to
    /// simulate an interrupt arriving mid-run.
    struct ScriptedPage {
        texts: HashMap<String, String>,
        stop_on: Option<(String, Arc<AtomicBool>)>,
    }

    impl ScriptedPage {
        fn new(entries: &[(&str, &str)]) -> Self {
            ScriptedPage {
                texts: entries
                    .iter()
                    .map(|(u, t)| (u.to_string(), t.to_string()))
                    .collect(),
                stop_on: None,
            }
        }
    }

    impl FollowerPage for ScriptedPage {
        fn fetch_follower_text(&self, username: &str) -> Result<String, FetchError> {
            if let Some((trigger, flag)) = &self.stop_on {
                if trigger == username {
                    flag.store(true, Ordering::SeqCst);
                }
            }
            self.texts
                .get(username)
                .cloned()
                .ok_or(FetchError::ElementMissing)
        }
    }

    struct Fixture {
        dir: tempfile::TempDir,
        config: PipelineConfig,
    }

    fn fixture(input_lines: &[&str]) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::in_dir(dir.path());
        let mut content = String::new();
        for name in input_lines {
            content.push_str(&format!("Username: {}\n", name));
        }
        fs::write(&config.input_file, content).unwrap();
        Fixture { dir, config }
    }

    fn scraper(page: ScriptedPage) -> ProfileScraper<ScriptedPage> {
        ProfileScraper::new(page).with_backoff_secs(0.0, 0.0)
    }

    #[test]
    fn fresh_run_appends_one_row_per_username_in_order() {
        let fx = fixture(&["alice", "bob", "carol"]);
        let store = RecordStore::new(&fx.config.output_file);
        let s = scraper(ScriptedPage::new(&[
            ("alice", "10K"),
            ("bob", "3000"),
            ("carol", "7K"),
        ]));

        let summary =
            run(&fx.config, &s, &store, &AtomicBool::new(false)).unwrap();

        assert_eq!(summary.newly_processed, 3);
        assert_eq!(summary.scanned_count, 3);
        assert_eq!(summary.total_scanned, 3);
        assert_eq!(summary.skipped, 0);
        assert!(!summary.interrupted);

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].username, "alice");
        assert_eq!(records[0].followers, Followers::Count(10_000));
        assert_eq!(records[1].username, "bob");
        assert_eq!(records[2].username, "carol");
    }

    #[test]
    fn second_run_appends_nothing() {
        let fx = fixture(&["alice", "bob"]);
        let store = RecordStore::new(&fx.config.output_file);
        let s = scraper(ScriptedPage::new(&[("alice", "1K"), ("bob", "2K")]));

        run(&fx.config, &s, &store, &AtomicBool::new(false)).unwrap();

        // Everything from run 1 must be in the snapshot before run 2 scrapes.
        let processed = store.load_processed_usernames();
        assert!(processed.contains("alice") && processed.contains("bob"));

        let summary =
            run(&fx.config, &s, &store, &AtomicBool::new(false)).unwrap();
        assert_eq!(summary.newly_processed, 0);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.scanned_count, 2);
        assert_eq!(store.read_all().unwrap().len(), 2);
    }

    #[test]
    fn resume_scrapes_only_the_new_usernames() {
        let fx = fixture(&["alice", "bob"]);
        let store = RecordStore::new(&fx.config.output_file);
        let s = scraper(ScriptedPage::new(&[("alice", "1K"), ("bob", "2K")]));
        run(&fx.config, &s, &store, &AtomicBool::new(false)).unwrap();

        // Same list plus one new name.
        fs::write(
            &fx.config.input_file,
            "Username: alice\nUsername: bob\nUsername: carol\n",
        )
        .unwrap();
        let s = scraper(ScriptedPage::new(&[("carol", "3K")]));
        let summary =
            run(&fx.config, &s, &store, &AtomicBool::new(false)).unwrap();

        assert_eq!(summary.newly_processed, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.scanned_count, 3);

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].username, "carol");
        assert_eq!(records[2].followers, Followers::Count(3_000));
    }

    #[test]
    fn failed_username_is_recorded_and_does_not_abort() {
        let fx = fixture(&["alice", "ghost", "carol"]);
        let store = RecordStore::new(&fx.config.output_file);
        // "ghost" is unscripted, so every attempt fails.
        let s = scraper(ScriptedPage::new(&[("alice", "10"), ("carol", "30")]));

        let summary =
            run(&fx.config, &s, &store, &AtomicBool::new(false)).unwrap();
        assert_eq!(summary.newly_processed, 3);

        let records = store.read_all().unwrap();
        assert_eq!(records[1].username, "ghost");
        assert_eq!(records[1].followers, Followers::Failed);
        assert_eq!(records[2].followers, Followers::Count(30));
    }

    #[test]
    fn failed_username_is_not_rescraped_on_resume() {
        let fx = fixture(&["ghost"]);
        let store = RecordStore::new(&fx.config.output_file);
        let s = scraper(ScriptedPage::new(&[]));
        run(&fx.config, &s, &store, &AtomicBool::new(false)).unwrap();

        let summary =
            run(&fx.config, &s, &store, &AtomicBool::new(false)).unwrap();
        assert_eq!(summary.newly_processed, 0);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn interrupt_mid_run_keeps_completed_records_only() {
        let fx = fixture(&["alice", "bob", "carol"]);
        let store = RecordStore::new(&fx.config.output_file);
        let stop = Arc::new(AtomicBool::new(false));
        let mut page = ScriptedPage::new(&[
            ("alice", "1K"),
            ("bob", "2K"),
            ("carol", "3K"),
        ]);
        // Interrupt arrives while bob is in flight: bob's fetch completes
        // and is written, carol is never started.
        page.stop_on = Some(("bob".to_string(), stop.clone()));
        let s = scraper(page);

        let summary = run(&fx.config, &s, &store, &stop).unwrap();
        assert!(summary.interrupted);
        assert_eq!(summary.newly_processed, 2);

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].followers, Followers::Count(1_000));
        assert_eq!(records[1].followers, Followers::Count(2_000));
    }

    #[test]
    fn interrupt_before_run_scrapes_nothing() {
        let fx = fixture(&["alice"]);
        let store = RecordStore::new(&fx.config.output_file);
        let s = scraper(ScriptedPage::new(&[("alice", "1K")]));

        let summary =
            run(&fx.config, &s, &store, &AtomicBool::new(true)).unwrap();
        assert!(summary.interrupted);
        assert_eq!(summary.newly_processed, 0);
        assert!(!store.exists());
    }

    #[test]
    fn missing_input_list_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::in_dir(dir.path());
        let store = RecordStore::new(&config.output_file);
        let s = scraper(ScriptedPage::new(&[]));

        assert!(run(&config, &s, &store, &AtomicBool::new(false)).is_err());
        assert!(!store.exists());
    }

    #[test]
    fn run_backs_up_an_existing_table_first() {
        let fx = fixture(&["alice"]);
        let store = RecordStore::new(&fx.config.output_file);
        let s = scraper(ScriptedPage::new(&[("alice", "1K")]));
        run(&fx.config, &s, &store, &AtomicBool::new(false)).unwrap();

        run(&fx.config, &s, &store, &AtomicBool::new(false)).unwrap();

        let backups = fs::read_dir(fx.dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_name().to_string_lossy().contains("_backup_")
            })
            .count();
        assert_eq!(backups, 1);
    }
}
