//! Registry enrichment: latest versions and per-version metadata.

use crate::batch::{with_deadline, BatchScheduler};
use crate::dedupe::unique_names;
use crate::types::{Dependency, EnrichedInfo};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use vetter_info::RegistrySource;

/// `latest` dist-tag per package name; `None` when the lookup failed.
pub type LatestVersions = HashMap<String, Option<String>>;

/// Enriched metadata per `name@version`.
pub type EnrichedInfos = HashMap<String, EnrichedInfo>;

/// Look up the `latest` dist-tag once per distinct name.
pub async fn fetch_latest_versions<R: RegistrySource>(
    registry: &R,
    dependencies: &[Dependency],
    concurrency: usize,
    timeout: Duration,
) -> LatestVersions {
    let names = unique_names(dependencies);

    BatchScheduler::new(concurrency)
        .run(names, |name| async move {
            // The deadline covers the lookup, not the wait for a rate-limit slot
            registry.ready().await;
            let latest = match with_deadline(
                "dist-tags lookup",
                timeout,
                registry.latest_version(&name),
            )
            .await
            {
                Ok(latest) => latest,
                Err(e) => {
                    debug!(package = %name, error = %e, "dist-tags lookup failed");
                    None
                }
            };
            Ok((name, latest))
        })
        .await
        .into_iter()
        .collect()
}

/// Fetch and normalize version metadata once per `name@version`.
///
/// Every key gets an entry: failed lookups map to [`EnrichedInfo::failed`].
pub async fn fetch_enriched_infos<R: RegistrySource>(
    registry: &R,
    dependencies: &[Dependency],
    concurrency: usize,
    timeout: Duration,
) -> EnrichedInfos {
    BatchScheduler::new(concurrency)
        .run(dependencies, |dep| async move {
            registry.ready().await;
            let info = match with_deadline(
                "version metadata lookup",
                timeout,
                registry.version_metadata(&dep.name, &dep.version),
            )
            .await
            {
                Ok(meta) => EnrichedInfo::from(meta),
                Err(e) => {
                    debug!(package = %dep.key(), error = %e, "metadata lookup failed");
                    EnrichedInfo::failed()
                }
            };
            Ok((dep.key(), info))
        })
        .await
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vetter_info::{Error, InstallHook, Result, VersionMetadata};

    #[derive(Default)]
    struct FakeRegistry {
        latest_calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl RegistrySource for FakeRegistry {
        async fn latest_version(&self, name: &str) -> Result<Option<String>> {
            self.latest_calls.fetch_add(1, Ordering::SeqCst);
            match name {
                "broken" => Err(Error::RateLimitExceeded(name.to_string())),
                "slow" => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(Some("9.9.9".into()))
                }
                _ => Ok(Some("2.0.0".into())),
            }
        }

        async fn version_metadata(&self, name: &str, _version: &str) -> Result<VersionMetadata> {
            match name {
                "broken" => Err(Error::NotFound(name.to_string())),
                "slow" => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(VersionMetadata::default())
                }
                _ => Ok(VersionMetadata {
                    license: "MIT".into(),
                    deprecated: false,
                    install_hooks: vec![InstallHook::PostInstall],
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_latest_once_per_name() {
        let registry = FakeRegistry::default();
        let deps = vec![
            Dependency::new("a", "1.0.0"),
            Dependency::new("a", "1.1.0"),
            Dependency::new("b", "1.0.0"),
            Dependency::new("broken", "1.0.0"),
        ];

        let latest = fetch_latest_versions(&registry, &deps, 8, Duration::from_secs(5)).await;
        assert_eq!(registry.latest_calls.load(Ordering::SeqCst), 3);
        assert_eq!(latest.len(), 3);
        assert_eq!(latest["a"].as_deref(), Some("2.0.0"));
        assert_eq!(latest["broken"], None);
    }

    #[tokio::test]
    async fn test_failed_metadata_is_marked() {
        let registry = FakeRegistry::default();
        let deps = vec![
            Dependency::new("ok", "1.0.0"),
            Dependency::new("broken", "1.0.0"),
        ];

        let infos = fetch_enriched_infos(&registry, &deps, 6, Duration::from_secs(5)).await;
        assert_eq!(infos.len(), 2);
        assert!(!infos["ok@1.0.0"].fetch_failed);
        assert!(infos["ok@1.0.0"].has_install_scripts());
        assert!(infos["broken@1.0.0"].fetch_failed);
    }

    /// Admits one lookup every 500ms, like a 2 rps client limiter.
    /// Lookups that were not admitted through `ready` queue for a slot.
    #[derive(Default)]
    struct PacedRegistry {
        next_slot: parking_lot::Mutex<Option<tokio::time::Instant>>,
        admitted: AtomicUsize,
    }

    impl PacedRegistry {
        const INTERVAL: Duration = Duration::from_millis(500);

        async fn wait_for_slot(&self) {
            let slot = {
                let mut next = self.next_slot.lock();
                let now = tokio::time::Instant::now();
                let slot = next.map_or(now, |next| next.max(now));
                *next = Some(slot + Self::INTERVAL);
                slot
            };
            tokio::time::sleep_until(slot).await;
        }

        async fn admit(&self) {
            let prepaid = self
                .admitted
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if !prepaid {
                self.wait_for_slot().await;
            }
        }
    }

    #[async_trait::async_trait]
    impl RegistrySource for PacedRegistry {
        async fn ready(&self) {
            self.wait_for_slot().await;
            self.admitted.fetch_add(1, Ordering::SeqCst);
        }

        async fn latest_version(&self, _name: &str) -> Result<Option<String>> {
            self.admit().await;
            Ok(Some("1.0.0".into()))
        }

        async fn version_metadata(&self, _name: &str, _version: &str) -> Result<VersionMetadata> {
            self.admit().await;
            Ok(VersionMetadata {
                license: "MIT".into(),
                ..VersionMetadata::default()
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_wait_is_outside_the_deadline() {
        let registry = PacedRegistry::default();
        let deps: Vec<Dependency> = (0..8)
            .map(|i| Dependency::new(format!("pkg-{i}"), "1.0.0"))
            .collect();
        let timeout = Duration::from_secs(5);

        // Both windows share one limiter: 8 + 6 lookups at 2 per second
        let (latest, infos) = tokio::join!(
            fetch_latest_versions(&registry, &deps, 8, timeout),
            fetch_enriched_infos(&registry, &deps[..6], 6, timeout),
        );

        assert!(latest.values().all(Option::is_some));
        assert_eq!(latest.len(), 8);
        assert_eq!(infos.len(), 6);
        assert!(infos.values().all(|info| !info.fetch_failed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_lookups_time_out() {
        let registry = FakeRegistry::default();
        let deps = vec![Dependency::new("slow", "1.0.0")];

        let latest = fetch_latest_versions(&registry, &deps, 8, Duration::from_secs(5)).await;
        assert_eq!(latest["slow"], None);

        let infos = fetch_enriched_infos(&registry, &deps, 6, Duration::from_secs(5)).await;
        assert!(infos["slow@1.0.0"].fetch_failed);
    }
}
