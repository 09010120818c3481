//! In-memory huddle registry.
//!
//! # Responsibilities
//! - Own every active huddle record
//! - Keep channel names unique among active huddles
//! - Track participant membership without duplicates
//! - Hand out snapshots, never live references
//!
//! # Concurrency
//! A single `RwLock` guards the id map and the channel index together.
//! Lookups and listings share the lock; every mutation, including the
//! check-then-insert of `get_or_create`, runs under the write guard so no
//! caller can observe a half-applied change.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::huddle::error::{HuddleError, HuddleResult};
use crate::huddle::types::{Huddle, HuddleId};

#[derive(Debug, Default)]
struct RegistryState {
    huddles: HashMap<HuddleId, Huddle>,
    /// channel name → id of the huddle currently using it.
    channels: HashMap<String, HuddleId>,
}

impl RegistryState {
    fn insert(&mut self, huddle: Huddle) -> Huddle {
        self.channels.insert(huddle.channel_name.clone(), huddle.id);
        self.huddles.insert(huddle.id, huddle.clone());
        huddle
    }

    fn by_channel(&self, channel_name: &str) -> Option<&Huddle> {
        let id = self.channels.get(channel_name)?;
        self.huddles.get(id)
    }

    fn by_channel_mut(&mut self, channel_name: &str) -> Option<&mut Huddle> {
        let id = self.channels.get(channel_name)?;
        self.huddles.get_mut(id)
    }

    fn remove(&mut self, id: &HuddleId) -> Option<Huddle> {
        let huddle = self.huddles.remove(id)?;
        self.channels.remove(&huddle.channel_name);
        Some(huddle)
    }

    /// Fresh id whose derived channel name is not in use.
    fn unused_id(&self) -> (HuddleId, String) {
        loop {
            let id = HuddleId::new();
            let channel_name = id.derived_channel_name();
            if !self.huddles.contains_key(&id) && !self.channels.contains_key(&channel_name) {
                return (id, channel_name);
            }
        }
    }
}

/// Catalog of active huddles, shared across request handlers.
#[derive(Debug, Default)]
pub struct HuddleRegistry {
    state: RwLock<RegistryState>,
}

impl HuddleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // Every mutation validates before it touches the maps, so a poisoned
    // guard still holds consistent state.
    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new huddle on a channel derived from its id.
    pub fn create(&self, created_by: &str) -> Huddle {
        let mut state = self.write();
        let (id, channel_name) = state.unused_id();
        state.insert(Huddle::new(id, channel_name, created_by.to_string()))
    }

    /// Look up the huddle using a channel.
    pub fn get_by_channel(&self, channel_name: &str) -> Option<Huddle> {
        self.read().by_channel(channel_name).cloned()
    }

    /// Look up a huddle by id.
    pub fn get(&self, id: &HuddleId) -> Option<Huddle> {
        self.read().huddles.get(id).cloned()
    }

    /// Snapshot of every active huddle, in no particular order.
    pub fn list(&self) -> Vec<Huddle> {
        self.read().huddles.values().cloned().collect()
    }

    /// Number of active huddles.
    pub fn len(&self) -> usize {
        self.read().huddles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a participant. Joining twice is a no-op; returns whether the
    /// participant was added.
    pub fn join(&self, id: &HuddleId, user_id: &str) -> HuddleResult<bool> {
        let mut state = self.write();
        let huddle = state.huddles.get_mut(id).ok_or(HuddleError::id(*id))?;
        Ok(huddle.add_participant(user_id))
    }

    /// Add a participant to the huddle on `channel_name`, if there is one.
    ///
    /// Absence is not an error here: this runs as a side effect of token
    /// issuance. Returns `true` only when the participant was added, so an
    /// unknown channel and a repeat join both report `false`.
    pub fn join_by_channel(&self, channel_name: &str, user_id: &str) -> bool {
        self.write()
            .by_channel_mut(channel_name)
            .is_some_and(|huddle| huddle.add_participant(user_id))
    }

    /// Remove a participant, keeping the others in order.
    pub fn leave(&self, id: &HuddleId, user_id: &str) -> HuddleResult<()> {
        let mut state = self.write();
        let huddle = state.huddles.get_mut(id).ok_or(HuddleError::id(*id))?;
        if huddle.remove_participant(user_id) {
            Ok(())
        } else {
            Err(HuddleError::participant(*id, user_id))
        }
    }

    /// End a huddle. Returns the final snapshot.
    pub fn end(&self, id: &HuddleId) -> HuddleResult<Huddle> {
        self.write().remove(id).ok_or(HuddleError::id(*id))
    }

    /// End the huddle using `channel_name`. Returns the final snapshot.
    pub fn end_by_channel(&self, channel_name: &str) -> HuddleResult<Huddle> {
        let mut state = self.write();
        let id = *state
            .channels
            .get(channel_name)
            .ok_or_else(|| HuddleError::channel(channel_name))?;
        state.remove(&id).ok_or_else(|| HuddleError::channel(channel_name))
    }

    /// Return the huddle on `channel_name`, creating it for `user_id` if absent.
    ///
    /// A new huddle uses `channel_name` verbatim. Concurrent callers racing on
    /// the same unused channel all receive the single huddle that won; only
    /// the winner sees `true` in the second field.
    pub fn get_or_create(&self, channel_name: &str, user_id: &str) -> (Huddle, bool) {
        let mut state = self.write();
        if let Some(existing) = state.by_channel(channel_name) {
            return (existing.clone(), false);
        }

        let mut id = HuddleId::new();
        while state.huddles.contains_key(&id) {
            id = HuddleId::new();
        }
        let huddle = state.insert(Huddle::new(id, channel_name.to_string(), user_id.to_string()));
        (huddle, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::huddle::error::Lookup;
    use std::collections::HashSet;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_create_derives_channel_from_id() {
        let registry = HuddleRegistry::new();
        let huddle = registry.create("alice");

        let id = huddle.id.to_string();
        assert_eq!(huddle.channel_name, format!("huddle_{}", &id[..8]));
        assert_eq!(huddle.created_by, "alice");
        assert!(huddle.participants.is_empty());
        assert_eq!(registry.get(&huddle.id), Some(huddle.clone()));
        assert_eq!(registry.get_by_channel(&huddle.channel_name), Some(huddle));
    }

    #[test]
    fn test_create_skips_channel_taken_by_get_or_create() {
        let registry = HuddleRegistry::new();
        // Occupy many derived-looking names; create must never land on one
        // that is already active.
        for i in 0..50 {
            registry.get_or_create(&format!("huddle_{:08x}", i), "squatter");
        }
        for _ in 0..50 {
            registry.create("alice");
        }

        let huddles = registry.list();
        let channels: HashSet<_> = huddles.iter().map(|h| h.channel_name.clone()).collect();
        assert_eq!(huddles.len(), 100);
        assert_eq!(channels.len(), 100);
    }

    #[test]
    fn test_scenario_create_join_leave_end() {
        let registry = HuddleRegistry::new();
        let huddle = registry.create("alice");
        let id = huddle.id;

        assert!(registry.join(&id, "bob").unwrap());
        assert_eq!(registry.get(&id).unwrap().participants, vec!["bob"]);

        assert!(!registry.join(&id, "bob").unwrap());
        assert_eq!(registry.get(&id).unwrap().participants, vec!["bob"]);

        let err = registry.leave(&id, "carol").unwrap_err();
        assert_eq!(
            err,
            HuddleError::NotFound(Lookup::Participant {
                huddle_id: id,
                user_id: "carol".into()
            })
        );

        let ended = registry.end_by_channel(&huddle.channel_name).unwrap();
        assert_eq!(ended.id, id);
        assert!(registry.get(&id).is_none());
        assert!(registry.get_by_channel(&huddle.channel_name).is_none());
    }

    #[test]
    fn test_leave_removes_once_and_keeps_order() {
        let registry = HuddleRegistry::new();
        let id = registry.create("alice").id;
        for user in ["bob", "carol", "dave"] {
            registry.join(&id, user).unwrap();
        }

        registry.leave(&id, "carol").unwrap();
        assert_eq!(registry.get(&id).unwrap().participants, vec!["bob", "dave"]);
        assert!(registry.leave(&id, "carol").is_err());
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let registry = HuddleRegistry::new();
        let missing = HuddleId::new();

        assert_eq!(registry.join(&missing, "bob"), Err(HuddleError::id(missing)));
        assert_eq!(registry.leave(&missing, "bob"), Err(HuddleError::id(missing)));
        assert_eq!(registry.end(&missing), Err(HuddleError::id(missing)));
        assert_eq!(
            registry.end_by_channel("nowhere"),
            Err(HuddleError::channel("nowhere"))
        );
        assert!(registry.get(&missing).is_none());
    }

    #[test]
    fn test_end_removes_from_list() {
        let registry = HuddleRegistry::new();
        let keep = registry.create("alice");
        let gone = registry.create("bob");

        registry.end(&gone.id).unwrap();

        let ids: Vec<_> = registry.list().into_iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![keep.id]);
        assert!(registry.get(&gone.id).is_none());
        assert!(registry.get_by_channel(&gone.channel_name).is_none());
        assert_eq!(registry.end(&gone.id), Err(HuddleError::id(gone.id)));
    }

    #[test]
    fn test_get_or_create_is_stable() {
        let registry = HuddleRegistry::new();
        let (first, created) = registry.get_or_create("design-review", "alice");
        assert!(created);
        let (second, created) = registry.get_or_create("design-review", "bob");
        assert!(!created);

        assert_eq!(first.id, second.id);
        assert_eq!(second.channel_name, "design-review");
        assert_eq!(second.created_by, "alice");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_channel_reusable_after_end() {
        let registry = HuddleRegistry::new();
        let (first, _) = registry.get_or_create("design-review", "alice");
        registry.end(&first.id).unwrap();

        let (second, created) = registry.get_or_create("design-review", "bob");
        assert!(created);
        assert_ne!(first.id, second.id);
        assert_eq!(second.created_by, "bob");
    }

    #[test]
    fn test_join_by_channel_ignores_unknown_channel() {
        let registry = HuddleRegistry::new();
        assert!(!registry.join_by_channel("ghost", "bob"));
        assert!(registry.is_empty());

        let (huddle, _) = registry.get_or_create("standup", "alice");
        assert!(registry.join_by_channel("standup", "bob"));
        assert!(!registry.join_by_channel("standup", "bob"));
        assert_eq!(registry.get(&huddle.id).unwrap().participants, vec!["bob"]);
    }

    #[test]
    fn test_snapshots_are_detached() {
        let registry = HuddleRegistry::new();
        let mut snapshot = registry.create("alice");
        snapshot.participants.push("mallory".into());

        assert!(registry.get(&snapshot.id).unwrap().participants.is_empty());
    }

    #[test]
    fn test_concurrent_join_by_channel_loses_nothing() {
        let registry = Arc::new(HuddleRegistry::new());
        let (huddle, _) = registry.get_or_create("all-hands", "host");
        let barrier = Arc::new(Barrier::new(100));

        thread::scope(|s| {
            for i in 0..100 {
                let registry = registry.clone();
                let barrier = barrier.clone();
                s.spawn(move || {
                    barrier.wait();
                    assert!(registry.join_by_channel("all-hands", &format!("u{}", i)));
                });
            }
        });

        let participants = registry.get(&huddle.id).unwrap().participants;
        let unique: HashSet<_> = participants.iter().collect();
        assert_eq!(participants.len(), 100);
        assert_eq!(unique.len(), 100);
    }

    #[test]
    fn test_concurrent_get_or_create_single_winner() {
        let registry = Arc::new(HuddleRegistry::new());
        let barrier = Arc::new(Barrier::new(32));

        let results: Vec<(HuddleId, bool)> = thread::scope(|s| {
            let handles: Vec<_> = (0..32)
                .map(|i| {
                    let registry = registry.clone();
                    let barrier = barrier.clone();
                    s.spawn(move || {
                        barrier.wait();
                        let (huddle, created) =
                            registry.get_or_create("race", &format!("user-{}", i));
                        (huddle.id, created)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(registry.len(), 1);
        assert!(results.iter().all(|(id, _)| *id == results[0].0));
        assert_eq!(results.iter().filter(|(_, created)| *created).count(), 1);
    }

    #[test]
    fn test_concurrent_distinct_channels_no_lost_creations() {
        let registry = Arc::new(HuddleRegistry::new());

        thread::scope(|s| {
            for t in 0..8 {
                let registry = registry.clone();
                s.spawn(move || {
                    for i in 0..25 {
                        registry.get_or_create(&format!("room-{}-{}", t, i), "host");
                        registry.create("host");
                    }
                });
            }
        });

        let huddles = registry.list();
        let channels: HashSet<_> = huddles.iter().map(|h| h.channel_name.as_str()).collect();
        assert_eq!(huddles.len(), 400);
        assert_eq!(channels.len(), 400);
    }
}
