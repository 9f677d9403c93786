use camino::Utf8PathBuf;
use chrono::Utc;
use clap::Parser;
use f1db::Result;
use f1db::api::JolpicaClient;
use f1db::config::Config;
use f1db::sync::{SyncEngine, SyncOptions};
use f1db::tables::{Catalog, Table, TableStore};

#[derive(Parser, Debug)]
pub struct UpdateArgs {
    /// Directory holding the CSV tables
    #[arg(long, short = 'd', value_name = "PATH")]
    pub directory: Utf8PathBuf,
}

pub async fn update(args: &UpdateArgs, config: &Config) -> Result<()> {
    let api = JolpicaClient::from_config(config)?;
    let store = TableStore::new(args.directory.as_std_path(), Catalog::from_config(config));
    let mut engine = SyncEngine::new(api, store, SyncOptions::from_config(config), Utc::now())?;

    engine.update().await?;

    let store = engine.store();
    println!(
        "Updated {}: {} races, {} driver standings, {} constructor standings",
        args.directory,
        store.races().map_or(0, Table::len),
        store.drivers_standings().map_or(0, Table::len),
        store.constructors_standings().map_or(0, Table::len)
    );

    Ok(())
}
