//! Per-device favorite proposals.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use econexus_store::{keys, JsonStoreExt, KvStore};
use econexus_types::{Clock, Proposal, ProposalId, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Persisted form under `econexus_favorites`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesData {
    #[serde(default)]
    pub proposals: Vec<ProposalId>,
    #[serde(default)]
    pub last_updated: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesStats {
    pub total_favorites: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<Timestamp>,
}

/// Favorite proposal ids, loaded once and written through on every change.
pub struct FavoritesManager {
    kv: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    state: Mutex<Favorites>,
}

#[derive(Default)]
struct Favorites {
    ids: BTreeSet<ProposalId>,
    last_updated: Option<Timestamp>,
}

impl FavoritesManager {
    /// Load the persisted set. An unreadable value starts an empty set.
    pub fn load(kv: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        let state = match kv.get_json::<FavoritesData>(keys::FAVORITES) {
            Ok(Some(data)) => Favorites {
                ids: data.proposals.into_iter().collect(),
                last_updated: Some(data.last_updated),
            },
            Ok(None) => Favorites::default(),
            Err(e) => {
                warn!(error = %e, "failed to load favorites, starting empty");
                Favorites::default()
            }
        };
        Self {
            kv,
            clock,
            state: Mutex::new(state),
        }
    }

    pub fn add(&self, id: ProposalId) {
        let mut state = self.lock();
        state.ids.insert(id);
        self.save(&mut state);
    }

    pub fn remove(&self, id: ProposalId) {
        let mut state = self.lock();
        state.ids.remove(&id);
        self.save(&mut state);
    }

    /// Flip `id` and return whether it is now a favorite.
    pub fn toggle(&self, id: ProposalId) -> bool {
        let mut state = self.lock();
        let now_favorite = if state.ids.remove(&id) {
            false
        } else {
            state.ids.insert(id);
            true
        };
        self.save(&mut state);
        now_favorite
    }

    pub fn is_favorite(&self, id: ProposalId) -> bool {
        self.lock().ids.contains(&id)
    }

    pub fn favorites(&self) -> Vec<ProposalId> {
        self.lock().ids.iter().copied().collect()
    }

    pub fn count(&self) -> usize {
        self.lock().ids.len()
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.ids.clear();
        self.save(&mut state);
    }

    /// The favorited subset of `proposals`, order preserved.
    pub fn filter_favorites(&self, proposals: &[Proposal]) -> Vec<Proposal> {
        let state = self.lock();
        proposals
            .iter()
            .filter(|p| state.ids.contains(&p.id))
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> FavoritesStats {
        let state = self.lock();
        FavoritesStats {
            total_favorites: state.ids.len(),
            last_updated: state.last_updated,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Favorites> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn save(&self, state: &mut Favorites) {
        let now = self.clock.now();
        let data = FavoritesData {
            proposals: state.ids.iter().copied().collect(),
            last_updated: now,
        };
        match self.kv.put_json(keys::FAVORITES, &data) {
            Ok(_) => state.last_updated = Some(now),
            Err(e) => warn!(error = %e, "failed to save favorites"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use econexus_nullables::{NullClock, NullKvStore};

    fn manager(kv: Arc<NullKvStore>) -> FavoritesManager {
        FavoritesManager::load(kv, Arc::new(NullClock::new(42)))
    }

    #[test]
    fn toggle_add_remove_round_trip_through_storage() {
        let kv = Arc::new(NullKvStore::new());
        let favs = manager(kv.clone());
        assert!(favs.toggle(ProposalId::new(7)));
        favs.add(ProposalId::new(3));
        assert!(!favs.toggle(ProposalId::new(7)));
        favs.add(ProposalId::new(9));
        favs.remove(ProposalId::new(3));

        let reloaded = manager(kv);
        assert_eq!(reloaded.favorites(), vec![ProposalId::new(9)]);
        assert_eq!(
            reloaded.stats(),
            FavoritesStats {
                total_favorites: 1,
                last_updated: Some(Timestamp::from_millis(42)),
            }
        );
    }

    #[test]
    fn corrupt_value_starts_empty() {
        let kv = Arc::new(NullKvStore::new());
        kv.put(keys::FAVORITES, "not json").unwrap();
        let favs = manager(kv);
        assert_eq!(favs.count(), 0);
        assert_eq!(favs.stats().last_updated, None);
    }

    #[test]
    fn save_failure_keeps_in_memory_state() {
        let kv = Arc::new(NullKvStore::new());
        let favs = manager(kv.clone());
        kv.set_fail_writes(true);
        favs.add(ProposalId::new(1));
        assert!(favs.is_favorite(ProposalId::new(1)));
        assert_eq!(favs.stats().last_updated, None);
        favs.clear();
        assert_eq!(favs.count(), 0);
    }
}
