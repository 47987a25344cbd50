//! Resolve an engine version and make sure it is available locally

use super::cache::ArtifactCache;
use super::index::{select_asset, select_release, ReleaseIndex, VersionSelector};
use crate::error::{Result, SdkError};
use crate::platform::Platform;
use crate::prompt::Prompt;
use log::{debug, info};
use std::path::PathBuf;

/// An engine release present in the local cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredEngine {
    pub tag: String,
    pub path: PathBuf,
    /// False when the cache already held the release
    pub downloaded: bool,
}

pub struct ReleaseAcquirer<I: ReleaseIndex> {
    index: I,
    cache: ArtifactCache,
    platform: Platform,
}

impl<I: ReleaseIndex> ReleaseAcquirer<I> {
    pub fn new(index: I, cache: ArtifactCache, platform: Platform) -> Self {
        Self {
            index,
            cache,
            platform,
        }
    }

    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    /// Return the local path of the selected release, downloading it if needed.
    ///
    /// A pinned tag that is already cached never touches the index. Downloads
    /// are not retried; the error names the asset and URL.
    pub async fn acquire<P: Prompt + ?Sized>(
        &self,
        selector: &VersionSelector,
        prompt: &mut P,
    ) -> Result<AcquiredEngine> {
        if let VersionSelector::Pinned(tag) = selector {
            if self.cache.has(tag) {
                return Ok(self.cached(tag));
            }
        }

        info!("Getting available NovelRT releases...");
        let releases = self.index.list_releases().await?;
        if releases.is_empty() {
            return Err(SdkError::acquisition("No NovelRT releases were found"));
        }

        let release = select_release(&releases, selector, prompt)?;
        if self.cache.has(&release.tag) {
            return Ok(self.cached(&release.tag));
        }

        let asset = select_asset(release, self.platform)?;

        let staging = tempfile::tempdir()
            .map_err(|e| SdkError::acquisition_with("Failed to create a download directory", e))?;
        let archive = staging.path().join(&asset.name);

        self.index.download(asset, &archive).await?;
        let path = self.cache.store(&release.tag, &archive)?;

        info!("NovelRT {} is available at {}", release.tag, path.display());
        Ok(AcquiredEngine {
            tag: release.tag.clone(),
            path,
            downloaded: true,
        })
    }

    fn cached(&self, tag: &str) -> AcquiredEngine {
        let path = self.cache.path(tag);
        debug!("Using cached NovelRT {} at {}", tag, path.display());
        AcquiredEngine {
            tag: tag.to_string(),
            path,
            downloaded: false,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::CacheValidation;
    use crate::prompt::ScriptedPrompt;
    use crate::release::cache::tests::write_zip;
    use crate::release::index::{Release, ReleaseAsset};
    use std::cell::Cell;
    use std::path::Path;
    use tempfile::TempDir;

    /// Index fake that counts requests and serves a zip for any asset
    pub(crate) struct FakeIndex {
        pub releases: Vec<Release>,
        pub list_calls: Cell<usize>,
        pub download_calls: Cell<usize>,
        pub fail_download: bool,
    }

    impl FakeIndex {
        pub(crate) fn new(tags: &[&str]) -> Self {
            let releases = tags
                .iter()
                .map(|tag| Release {
                    tag: tag.to_string(),
                    assets: ["Windows", "Ubuntu", "macOS"]
                        .iter()
                        .map(|os| ReleaseAsset {
                            name: format!("NovelRT-{}-{}.zip", tag, os),
                            download_url: format!("https://example.com/{}/{}.zip", tag, os),
                        })
                        .collect(),
                })
                .collect();
            Self {
                releases,
                list_calls: Cell::new(0),
                download_calls: Cell::new(0),
                fail_download: false,
            }
        }

        pub(crate) fn requests(&self) -> usize {
            self.list_calls.get() + self.download_calls.get()
        }
    }

    impl ReleaseIndex for FakeIndex {
        async fn list_releases(&self) -> Result<Vec<Release>> {
            self.list_calls.set(self.list_calls.get() + 1);
            Ok(self.releases.clone())
        }

        async fn download(&self, asset: &ReleaseAsset, destination: &Path) -> Result<()> {
            self.download_calls.set(self.download_calls.get() + 1);
            if self.fail_download {
                return Err(SdkError::acquisition(format!(
                    "Unable to download release asset {} from {}",
                    asset.name, asset.download_url
                )));
            }
            write_zip(destination, &[("lib/NovelRT.cmake", "# engine")]);
            Ok(())
        }
    }

    fn acquirer(tmp: &TempDir, index: FakeIndex) -> ReleaseAcquirer<FakeIndex> {
        let cache = ArtifactCache::new(tmp.path().join("Engine"), CacheValidation::TrustExistence);
        ReleaseAcquirer::new(index, cache, Platform::Linux)
    }

    #[tokio::test]
    async fn test_cached_pinned_tag_makes_no_requests() {
        let tmp = TempDir::new().unwrap();
        let acquirer = acquirer(&tmp, FakeIndex::new(&["v0.1.0"]));
        std::fs::create_dir_all(acquirer.cache().path("v0.1.0")).unwrap();

        let mut prompt = ScriptedPrompt::default();
        let engine = acquirer
            .acquire(&VersionSelector::Pinned("v0.1.0".to_string()), &mut prompt)
            .await
            .unwrap();

        assert_eq!(acquirer.index.requests(), 0);
        assert_eq!(engine.path, acquirer.cache().path("v0.1.0"));
        assert!(!engine.downloaded);
    }

    #[tokio::test]
    async fn test_uncached_tag_is_downloaded_and_extracted() {
        let tmp = TempDir::new().unwrap();
        let acquirer = acquirer(&tmp, FakeIndex::new(&["v0.1.0", "v0.0.5"]));

        let mut prompt = ScriptedPrompt::default();
        let engine = acquirer
            .acquire(&VersionSelector::Pinned("v0.1.0".to_string()), &mut prompt)
            .await
            .unwrap();

        assert!(engine.downloaded);
        assert!(engine.path.join("lib/NovelRT.cmake").is_file());
        assert_eq!(acquirer.index.download_calls.get(), 1);

        // Second run is served from the cache
        let again = acquirer
            .acquire(&VersionSelector::Pinned("v0.1.0".to_string()), &mut prompt)
            .await
            .unwrap();
        assert!(!again.downloaded);
        assert_eq!(acquirer.index.download_calls.get(), 1);
    }

    #[tokio::test]
    async fn test_interactive_selection_of_cached_release_skips_download() {
        let tmp = TempDir::new().unwrap();
        let acquirer = acquirer(&tmp, FakeIndex::new(&["v0.1.0", "v0.0.5"]));
        std::fs::create_dir_all(acquirer.cache().path("v0.0.5")).unwrap();

        let mut prompt = ScriptedPrompt::new(["2"]);
        let engine = acquirer
            .acquire(&VersionSelector::Interactive, &mut prompt)
            .await
            .unwrap();

        assert_eq!(engine.tag, "v0.0.5");
        assert_eq!(acquirer.index.download_calls.get(), 0);
    }

    #[tokio::test]
    async fn test_quit_during_selection_cancels() {
        let tmp = TempDir::new().unwrap();
        let acquirer = acquirer(&tmp, FakeIndex::new(&["v0.1.0"]));

        let mut prompt = ScriptedPrompt::new(["q"]);
        let err = acquirer
            .acquire(&VersionSelector::Interactive, &mut prompt)
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::UserCancelled));
    }

    #[tokio::test]
    async fn test_failed_download_reports_asset() {
        let tmp = TempDir::new().unwrap();
        let mut index = FakeIndex::new(&["v0.1.0"]);
        index.fail_download = true;
        let acquirer = acquirer(&tmp, index);

        let mut prompt = ScriptedPrompt::default();
        let err = acquirer
            .acquire(&VersionSelector::Pinned("v0.1.0".to_string()), &mut prompt)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("NovelRT-v0.1.0-Ubuntu.zip"));
        assert!(!acquirer.cache().has("v0.1.0"));
    }

    #[tokio::test]
    async fn test_empty_index_is_acquisition_error() {
        let tmp = TempDir::new().unwrap();
        let acquirer = acquirer(&tmp, FakeIndex::new(&[]));

        let mut prompt = ScriptedPrompt::default();
        let err = acquirer
            .acquire(&VersionSelector::Interactive, &mut prompt)
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Acquisition { .. }));
    }
}
