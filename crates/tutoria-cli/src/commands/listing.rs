//! The `tutoria listing` command.

use std::path::PathBuf;

use anyhow::Result;

use tutoria_core::config::load_config_from;
use tutoria_core::traits::{ListingKind, ListingStore};
use tutoria_store::FileStore;

pub fn execute(kind: ListingKind, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = FileStore::new(&config.data_dir);

    let listing = store.load(kind)?;
    if listing.is_empty() {
        eprintln!("No saved {kind} in {}", store.dir().display());
    } else {
        println!("{listing}");
    }

    Ok(())
}
