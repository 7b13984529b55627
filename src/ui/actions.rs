//! Browser driver actions
//!
//! Thin wrappers over a WebDriver session shared by every page object:
//! navigation, element lookup with an explicit wait, input, and failure
//! screenshots.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use thirtyfour::prelude::*;
use tokio::time::sleep;

/// How long `find` keeps retrying before giving up
const FIND_TIMEOUT: Duration = Duration::from_secs(10);
/// Pause between lookup attempts
const FIND_INTERVAL: Duration = Duration::from_millis(500);

/// Base driver actions shared by all pages
#[derive(Clone)]
pub struct BaseActions {
    driver: WebDriver,
    screenshot_dir: PathBuf,
}

impl BaseActions {
    /// Start a headless Chrome session against the given WebDriver
    /// endpoint.
    pub async fn new(webdriver_url: &str, screenshot_dir: PathBuf) -> Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        caps.set_headless()
            .context("Failed to configure headless Chrome")?;
        let driver = WebDriver::new(webdriver_url, caps)
            .await
            .with_context(|| format!("Failed to start WebDriver session at {}", webdriver_url))?;

        Ok(Self {
            driver,
            screenshot_dir,
        })
    }

    /// Wrap an existing session (used when a scenario drives several
    /// pages through one browser)
    pub fn from_driver(driver: WebDriver, screenshot_dir: PathBuf) -> Self {
        Self {
            driver,
            screenshot_dir,
        }
    }

    /// Navigate to a URL
    pub async fn navigate(&self, url: &str) -> Result<()> {
        tracing::debug!("navigating to {}", url);
        self.driver
            .goto(url)
            .await
            .with_context(|| format!("Failed to open {}", url))
    }

    /// Current page title
    pub async fn title(&self) -> Result<String> {
        self.driver.title().await.context("Failed to read page title")
    }

    /// Find an element, retrying until it appears or the wait budget
    /// runs out.
    pub async fn find(&self, by: By) -> Result<WebElement> {
        let deadline = tokio::time::Instant::now() + FIND_TIMEOUT;
        loop {
            match self.driver.find(by.clone()).await {
                Ok(element) => return Ok(element),
                Err(_) if tokio::time::Instant::now() < deadline => {
                    sleep(FIND_INTERVAL).await;
                }
                Err(err) => {
                    tracing::error!("element {:?} not found: {}", by, err);
                    return Err(err).with_context(|| format!("element {:?} never appeared", by));
                }
            }
        }
    }

    /// Click an element
    pub async fn click(&self, by: By) -> Result<()> {
        let element = self.find(by.clone()).await?;
        element
            .click()
            .await
            .with_context(|| format!("Failed to click {:?}", by))
    }

    /// Clear a field and type into it
    pub async fn type_into(&self, by: By, text: &str) -> Result<()> {
        let element = self.find(by.clone()).await?;
        element.clear().await.ok();
        element
            .send_keys(text)
            .await
            .with_context(|| format!("Failed to type into {:?}", by))
    }

    /// Save a screenshot named after the failed verification; returns
    /// the file path.
    pub async fn screenshot(&self, name: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.screenshot_dir)
            .context("Failed to create screenshot directory")?;

        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let file_name = format!("{}-{}.png", slugify(name), stamp);
        let path = self.screenshot_dir.join(file_name);

        self.driver
            .screenshot(&path)
            .await
            .context("Failed to capture screenshot")?;
        tracing::info!("screenshot saved to {}", path.display());
        Ok(path)
    }

    /// End the browser session
    pub async fn quit(self) -> Result<()> {
        self.driver.quit().await.context("Failed to end WebDriver session")
    }
}

/// Reduce a verification message to a safe file-name stem
fn slugify(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    slug.trim_matches('-')
        .chars()
        .take(60)
        .collect::<String>()
}
