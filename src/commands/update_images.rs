use camino::Utf8PathBuf;
use clap::Parser;
use f1db::Result;
use f1db::config::Config;
use f1db::images::{ImageReport, ImagesDb};
use f1db::tables::{Catalog, TableStore};

#[derive(Parser, Debug)]
pub struct UpdateImagesArgs {
    /// Directory the images are stored in
    #[arg(long, value_name = "PATH")]
    pub images_directory: Utf8PathBuf,

    /// Directory holding the CSV tables
    #[arg(long, value_name = "PATH")]
    pub data_directory: Utf8PathBuf,

    /// Earliest season whose drivers and constructors get images [default: images_start_season setting]
    #[arg(long, value_name = "SEASON")]
    pub start_season: Option<i32>,
}

pub async fn update_images(args: &UpdateImagesArgs, config: &Config) -> Result<()> {
    let start_season = args.start_season.unwrap_or(config.images_start_season);

    let mut store = TableStore::new(args.data_directory.as_std_path(), Catalog::from_config(config));
    let drivers = store.get_drivers(start_season)?;
    let constructors = store.get_constructors(start_season)?;

    let images = ImagesDb::from_config(args.images_directory.as_std_path(), config)?;
    print_report("drivers", images.update_images_drivers(&drivers).await?);
    print_report("constructors", images.update_images_constructors(&constructors).await?);

    Ok(())
}

fn print_report(kind: &str, report: ImageReport) {
    println!(
        "{kind}: {} saved, {} already present, {} without image, {} failed",
        report.saved, report.skipped, report.missing, report.failed
    );
}
