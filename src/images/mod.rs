//! Portraits for drivers and logos for constructors.
//!
//! Driver portraits come from the infobox of the driver's Wikipedia article, constructor logos from the first
//! Seeklogo search result for the constructor's name. Every image is stored as a square PNG named after the
//! entity's identifier. The job is best-effort: a failure for one entity is logged and the job moves on.

mod format;
mod scrape;

pub use format::square_thumbnail;
pub use scrape::{seeklogo_logo, wikipedia_infobox_image};

use crate::Result;
use crate::api::resilient_get;
use crate::config::Config;
use crate::tables::{Constructor, Driver};
use core::time::Duration;
use indicatif::{ProgressBar, ProgressStyle};
use ohno::{IntoAppError, bail};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use std::fs;
use std::path::PathBuf;
use strum::{Display, IntoStaticStr};
use url::Url;

/// Log target for the image job
const LOG_TARGET: &str = "    images";

const SEEKLOGO_SEARCH_URL: &str = "https://seeklogo.com/search";

const PROGRESS_TEMPLATE: &str = "{prefix:>12} [{bar:25}] {pos}/{len} {msg}";

/// The kind of entity an image belongs to, which is also the subdirectory it is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ImageKind {
    Drivers,
    Constructors,
}

/// Where the image of one entity is looked up.
#[derive(Debug)]
enum Source<'a> {
    /// A Wikipedia article whose infobox holds the image.
    Wikipedia(&'a str),

    /// A name to search logos for.
    Seeklogo(&'a str),
}

#[derive(Debug)]
struct Subject<'a> {
    id: &'a str,
    source: Source<'a>,
}

/// Outcome counts of one image job run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageReport {
    /// Images downloaded and stored.
    pub saved: usize,

    /// Entities that already had an image.
    pub skipped: usize,

    /// Entities whose page had no image.
    pub missing: usize,

    /// Entities for which a request, the decoding or the write failed.
    pub failed: usize,
}

/// Downloads and stores entity images under a directory.
#[derive(Debug, Clone)]
pub struct ImagesDb {
    directory: PathBuf,
    client: reqwest::Client,
    size: u32,
    timeout: Duration,
    max_retries: u32,
    search_url: Url,
}

impl ImagesDb {
    /// Creates an image store rooted at `directory` producing `size` × `size` images.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(directory: impl Into<PathBuf>, size: u32, timeout: Duration, max_retries: u32) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8"),
        );
        let _ = headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = reqwest::Client::builder()
            .user_agent(concat!("f1db/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .into_app_err("unable to create HTTP client")?;

        Ok(Self {
            directory: directory.into(),
            client,
            size,
            timeout,
            max_retries,
            search_url: Url::parse(SEEKLOGO_SEARCH_URL).into_app_err("invalid logo search URL")?,
        })
    }

    /// Creates an image store using the `image_size`, `request_timeout_secs` and `max_retries` settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(directory: impl Into<PathBuf>, config: &Config) -> Result<Self> {
        Self::new(
            directory,
            config.image_size,
            Duration::from_secs(config.request_timeout_secs),
            config.max_retries,
        )
    }

    /// Searches logos at `search_url` instead of Seeklogo.
    #[must_use]
    pub fn with_search_url(mut self, search_url: Url) -> Self {
        self.search_url = search_url;
        self
    }

    /// Where the image of the entity `id` is stored.
    #[must_use]
    pub fn image_path(&self, kind: ImageKind, id: &str) -> PathBuf {
        self.directory.join(<&'static str>::from(kind)).join(format!("{id}.png"))
    }

    /// Stores a portrait for every driver that does not have one yet.
    ///
    /// # Errors
    ///
    /// Returns an error only if the drivers image directory cannot be created.
    pub async fn update_images_drivers(&self, drivers: &[Driver]) -> Result<ImageReport> {
        let subjects = drivers
            .iter()
            .map(|driver| Subject {
                id: &driver.driver_id,
                source: Source::Wikipedia(&driver.url),
            })
            .collect();

        self.update_images(ImageKind::Drivers, subjects).await
    }

    /// Stores a logo for every constructor that does not have one yet.
    ///
    /// # Errors
    ///
    /// Returns an error only if the constructors image directory cannot be created.
    pub async fn update_images_constructors(&self, constructors: &[Constructor]) -> Result<ImageReport> {
        let subjects = constructors
            .iter()
            .map(|constructor| Subject {
                id: &constructor.constructor_id,
                source: Source::Seeklogo(&constructor.name),
            })
            .collect();

        self.update_images(ImageKind::Constructors, subjects).await
    }

    async fn update_images(&self, kind: ImageKind, subjects: Vec<Subject<'_>>) -> Result<ImageReport> {
        let directory = self.directory.join(<&'static str>::from(kind));
        fs::create_dir_all(&directory).into_app_err_with(|| format!("unable to create directory '{}'", directory.display()))?;

        let total = subjects.len();
        let pending: Vec<_> = subjects
            .into_iter()
            .filter(|subject| !self.image_path(kind, subject.id).exists())
            .collect();

        let mut report = ImageReport {
            skipped: total - pending.len(),
            ..ImageReport::default()
        };

        log::info!(target: LOG_TARGET, "Fetching {} {kind} images ({} already stored)", pending.len(), report.skipped);

        let bar = progress_bar(kind, pending.len());
        for subject in &pending {
            bar.set_message(subject.id.to_string());

            match self.fetch_image(subject).await {
                Ok(Some(png)) => {
                    let path = self.image_path(kind, subject.id);
                    match fs::write(&path, png) {
                        Ok(()) => report.saved += 1,
                        Err(e) => {
                            log::warn!(target: LOG_TARGET, "Could not write '{}': {e}", path.display());
                            report.failed += 1;
                        }
                    }
                }
                Ok(None) => {
                    log::info!(target: LOG_TARGET, "No image found for {kind} '{}'", subject.id);
                    report.missing += 1;
                }
                Err(e) => {
                    log::warn!(target: LOG_TARGET, "Could not get an image for {kind} '{}': {e:#}", subject.id);
                    report.failed += 1;
                }
            }

            bar.inc(1);
        }
        bar.finish_and_clear();

        log::info!(
            target: LOG_TARGET,
            "{kind} images: {} saved, {} skipped, {} missing, {} failed",
            report.saved,
            report.skipped,
            report.missing,
            report.failed
        );

        Ok(report)
    }

    /// Finds the image of one entity and returns it as a thumbnail, or `None` if its page has no image.
    async fn fetch_image(&self, subject: &Subject<'_>) -> Result<Option<Vec<u8>>> {
        let page_url = match subject.source {
            Source::Wikipedia(url) if url.trim().is_empty() => return Ok(None),
            Source::Wikipedia(url) => Url::parse(url).into_app_err_with(|| format!("invalid article URL '{url}'"))?,
            Source::Seeklogo(name) => {
                let mut url = self.search_url.clone();
                let _ = url.query_pairs_mut().append_pair("q", name);
                url
            }
        };

        let html = self.get(&page_url).await?.text().await.into_app_err("unable to read page")?;

        let src = match subject.source {
            Source::Wikipedia(_) => wikipedia_infobox_image(&html),
            Source::Seeklogo(_) => seeklogo_logo(&html),
        };
        let Some(src) = src else {
            return Ok(None);
        };

        let image_url = page_url.join(&src).into_app_err_with(|| format!("invalid image source '{src}'"))?;
        log::debug!(target: LOG_TARGET, "Downloading {image_url} for '{}'", subject.id);

        let data = self.get(&image_url).await?.bytes().await.into_app_err("unable to read image")?;
        square_thumbnail(&data, self.size).map(Some)
    }

    async fn get(&self, url: &Url) -> Result<reqwest::Response> {
        let response = resilient_get(&self.client, url.as_str(), self.max_retries, self.timeout).await?;
        let status = response.status();
        if !status.is_success() {
            bail!("GET {url} returned status {status}");
        }

        Ok(response)
    }
}

fn progress_bar(kind: ImageKind, len: usize) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template(PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar.set_prefix(kind.to_string());
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_image_path() {
        let images = ImagesDb::new("/data/images", 250, Duration::from_secs(5), 0).unwrap();
        assert_eq!(
            images.image_path(ImageKind::Drivers, "hamilton"),
            Path::new("/data/images").join("drivers").join("hamilton.png")
        );
        assert_eq!(
            images.image_path(ImageKind::Constructors, "ferrari"),
            Path::new("/data/images").join("constructors").join("ferrari.png")
        );
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            image_size: 64,
            ..Config::default()
        };
        let images = ImagesDb::from_config("images", &config).unwrap();
        assert_eq!(images.size, 64);
        assert_eq!(images.search_url.as_str(), SEEKLOGO_SEARCH_URL);
        assert_eq!(images.directory, Path::new("images"));
        assert_eq!(images.timeout, Duration::from_secs(config.request_timeout_secs));
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn test_driver_without_url_is_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let images = ImagesDb::new(tmp.path(), 16, Duration::from_secs(5), 0).unwrap();
        let driver = Driver {
            driver_id: "unknown".to_string(),
            url: String::new(),
            given_name: "Un".to_string(),
            family_name: "Known".to_string(),
            date_of_birth: None,
            nationality: String::new(),
            code: None,
        };

        let report = images.update_images_drivers(&[driver]).await.unwrap();
        assert_eq!(report, ImageReport { missing: 1, ..ImageReport::default() });
        assert!(tmp.path().join("drivers").is_dir());
    }
}
