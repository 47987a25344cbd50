//! Release listing and asset download from the GitHub releases API

use crate::config::SdkConfig;
use crate::error::{Result, SdkError};
use crate::platform::Platform;
use crate::prompt::{select_numbered, Prompt};
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use url::Url;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// A downloadable archive for one platform of a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
}

/// A published, tagged engine version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    #[serde(rename = "tag_name")]
    pub tag: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// Which release the caller wants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelector {
    /// A specific tag, e.g. `v0.1.0`
    Pinned(String),
    /// Ask the user to pick from the published releases
    Interactive,
}

impl VersionSelector {
    pub fn from_option(tag: Option<String>) -> Self {
        match tag {
            Some(tag) => VersionSelector::Pinned(tag),
            None => VersionSelector::Interactive,
        }
    }
}

/// Remote source of releases
#[allow(async_fn_in_trait)]
pub trait ReleaseIndex {
    /// List published releases, newest first as the index reports them
    async fn list_releases(&self) -> Result<Vec<Release>>;

    /// Download `asset` to `destination`
    async fn download(&self, asset: &ReleaseAsset, destination: &Path) -> Result<()>;
}

/// Pick the asset for `platform` from a release.
///
/// Matching is a case-sensitive substring test on the asset name. When more
/// than one asset matches, the first in index order wins.
pub fn select_asset(release: &Release, platform: Platform) -> Result<&ReleaseAsset> {
    let token = platform.release_token();
    release
        .assets
        .iter()
        .find(|asset| asset.name.contains(token))
        .ok_or_else(|| SdkError::UnsupportedPlatform {
            tag: release.tag.clone(),
            platform: token.to_string(),
        })
}

/// Resolve `selector` against the listed releases, prompting when needed
pub fn select_release<'a, P: Prompt + ?Sized>(
    releases: &'a [Release],
    selector: &VersionSelector,
    prompt: &mut P,
) -> Result<&'a Release> {
    match selector {
        VersionSelector::Pinned(tag) => releases
            .iter()
            .find(|r| r.tag == *tag)
            .ok_or_else(|| {
                let available: Vec<&str> = releases.iter().map(|r| r.tag.as_str()).collect();
                SdkError::acquisition(format!(
                    "NovelRT {} was not found. Available versions: {}",
                    tag,
                    available.join(", ")
                ))
            }),
        VersionSelector::Interactive => {
            let tags: Vec<String> = releases.iter().map(|r| r.tag.clone()).collect();
            let index = select_numbered(
                prompt,
                "Select a version and press enter (Q to quit): ",
                &tags,
            )?;
            Ok(&releases[index])
        }
    }
}

/// HTTP client for the GitHub releases endpoint
pub struct ReleaseIndexClient {
    releases_url: Url,
    client: reqwest::Client,
}

impl ReleaseIndexClient {
    /// Create a new client with a custom user agent
    pub fn new(releases_url: &str, user_agent: &str) -> Result<Self> {
        let releases_url = Url::parse(releases_url).map_err(|e| {
            SdkError::acquisition_with(format!("Invalid releases URL: {}", releases_url), e)
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .map_err(|e| SdkError::acquisition_with("Failed to create HTTP client", e))?;

        Ok(Self {
            releases_url,
            client,
        })
    }

    pub fn from_config(config: &SdkConfig) -> Result<Self> {
        Self::new(&config.releases_url, &config.user_agent)
    }

    pub fn releases_url(&self) -> &Url {
        &self.releases_url
    }
}

impl ReleaseIndex for ReleaseIndexClient {
    async fn list_releases(&self) -> Result<Vec<Release>> {
        debug!("Sending request to {}...", self.releases_url);

        let response = self
            .client
            .get(self.releases_url.clone())
            .send()
            .await
            .map_err(|e| {
                SdkError::acquisition_with(
                    format!("Failed to fetch releases from {}", self.releases_url),
                    e,
                )
            })?;

        if !response.status().is_success() {
            return Err(SdkError::acquisition(format!(
                "Failed to fetch releases from {}: HTTP {}",
                self.releases_url,
                response.status()
            )));
        }

        let releases: Vec<Release> = response.json().await.map_err(|e| {
            SdkError::acquisition_with(
                format!("Failed to parse releases from {}", self.releases_url),
                e,
            )
        })?;

        debug!("Received {} releases", releases.len());
        Ok(releases)
    }

    async fn download(&self, asset: &ReleaseAsset, destination: &Path) -> Result<()> {
        info!("Downloading {}...", asset.name);
        debug!(
            "Fetching {} into {}",
            asset.download_url,
            destination.display()
        );

        let download_error = |e: reqwest::Error| {
            SdkError::acquisition_with(
                format!(
                    "Unable to download release asset {} from {}",
                    asset.name, asset.download_url
                ),
                e,
            )
        };

        let response = self
            .client
            .get(&asset.download_url)
            .send()
            .await
            .map_err(download_error)?;

        if !response.status().is_success() {
            return Err(SdkError::acquisition(format!(
                "Unable to download release asset {} from {}: HTTP {}",
                asset.name,
                asset.download_url,
                response.status()
            )));
        }

        let bytes = response.bytes().await.map_err(download_error)?;
        fs::write(destination, &bytes).await.map_err(|e| {
            SdkError::acquisition_with(
                format!(
                    "Unable to save release asset {} to {}",
                    asset.name,
                    destination.display()
                ),
                e,
            )
        })?;

        debug!("Download successful ({} bytes)", bytes.len());
        Ok(())
    }
}
