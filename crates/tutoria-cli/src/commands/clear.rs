//! The `tutoria clear` command.

use std::path::PathBuf;

use anyhow::Result;

use tutoria_core::config::load_config_from;
use tutoria_core::marketplace::Marketplace;
use tutoria_store::FileStore;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = FileStore::new(&config.data_dir);

    let mut market = Marketplace::new(&config)?;
    market.clear(&store)?;
    println!("Cleared saved listings in {}", store.dir().display());

    Ok(())
}
