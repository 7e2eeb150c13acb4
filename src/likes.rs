use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use tracing::warn;

use crate::festival::PerformanceIdentity;

/// The user's set of liked slot identities, backed by one JSON blob on disk.
///
/// All mutation flows through [`LikeStore::toggle`], which writes the blob
/// back synchronously; because writes happen in call order under the caller's
/// lock, a later toggle always wins.
#[derive(Debug)]
pub struct LikeStore {
    path: PathBuf,
    set: BTreeSet<PerformanceIdentity>,
}

impl LikeStore {
    /// Hydrates the set from `path`. Missing or malformed content yields an
    /// empty set; loading never fails the caller.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let set = match fs::read_to_string(&path) {
            Ok(blob) => match serde_json::from_str::<Vec<PerformanceIdentity>>(&blob) {
                Ok(ids) => ids.into_iter().collect(),
                Err(err) => {
                    warn!(path = %path.display(), %err, "discarding malformed like data");
                    BTreeSet::new()
                }
            },
            Err(_) => BTreeSet::new(),
        };
        Self { path, set }
    }

    /// Flips the liked state of `id` and persists. Returns the new state:
    /// `true` if `id` is now liked.
    pub fn toggle(&mut self, id: &PerformanceIdentity) -> bool {
        let liked = if self.set.remove(id) {
            false
        } else {
            self.set.insert(id.clone());
            true
        };
        self.persist();
        liked
    }

    pub fn is_liked(&self, id: &PerformanceIdentity) -> bool {
        self.set.contains(id)
    }

    /// The current identities in stable order. Ordering carries no meaning,
    /// it just keeps the persisted blob deterministic.
    pub fn snapshot(&self) -> Vec<PerformanceIdentity> {
        self.set.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Fire-and-forget write of the blob; a failure loses at most the most
    /// recent toggles and must not surface to the caller.
    fn persist(&self) {
        let blob = match serde_json::to_string(&self.snapshot()) {
            Ok(blob) => blob,
            Err(err) => {
                warn!(%err, "failed to serialize like data");
                return;
            }
        };
        if let Err(err) = fs::write(&self.path, blob) {
            warn!(path = %self.path.display(), %err, "failed to persist like data");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::festival::PerformanceIdentity;
    use crate::festival::tests::two_stage_fixture;
    use crate::time::Weekday;

    fn store_in(dir: &tempfile::TempDir) -> LikeStore {
        LikeStore::load(dir.path().join("liked.json"))
    }

    #[test]
    fn test_missing_file_is_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.is_empty());
    }

    #[test]
    fn test_malformed_blob_is_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("liked.json");
        fs::write(&path, "not json {{{").unwrap();
        let store = LikeStore::load(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn test_duplicates_in_blob_are_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("liked.json");
        fs::write(&path, r#"["a::FRIDAY::19:00::X", "a::FRIDAY::19:00::X"]"#).unwrap();
        let store = LikeStore::load(&path);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_toggle_twice_restores_original_set() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        let kept: PerformanceIdentity = "Main Stage::FRIDAY::19:00::Alpha".into();
        let flipped: PerformanceIdentity = "Tent::FRIDAY::21:30::Beta".into();
        store.toggle(&kept);

        let before = store.snapshot();
        assert!(store.toggle(&flipped));
        assert!(!store.toggle(&flipped));
        assert_eq!(store.snapshot(), before);
        assert!(store.is_liked(&kept));
        assert!(!store.is_liked(&flipped));
    }

    #[test]
    fn test_like_reload_unlike_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("liked.json");
        let data = two_stage_fixture();

        let ids: Vec<PerformanceIdentity> = data
            .stages
            .iter()
            .map(|stage| {
                let performance = &stage.performances_on(Weekday::Friday)[0];
                PerformanceIdentity::derive(&stage.name, Weekday::Friday, performance)
            })
            .collect();
        assert_eq!(ids.len(), 2);

        let mut store = LikeStore::load(&path);
        for id in &ids {
            assert!(store.toggle(id));
        }
        drop(store);

        // A fresh process sees both likes.
        let mut reloaded = LikeStore::load(&path);
        assert_eq!(reloaded.len(), 2);
        assert!(ids.iter().all(|id| reloaded.is_liked(id)));

        assert!(!reloaded.toggle(&ids[0]));
        assert_eq!(reloaded.len(), 1);
        assert!(!reloaded.is_liked(&ids[0]));
        assert!(reloaded.is_liked(&ids[1]));

        // And the removal is durable too.
        let reloaded_again = LikeStore::load(&path);
        assert_eq!(reloaded_again.snapshot(), vec![ids[1].clone()]);
    }
}
