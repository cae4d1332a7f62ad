//! Actor registry with per-actor locks.
//!
//! Each actor sits behind its own mutex. Callers never hold two actor locks
//! at once: they lock, take an [`ActorView`] snapshot or apply a change, and
//! release before touching the next actor. The registry and party maps are
//! only held long enough to clone handles out of them.

mod actor;

pub use actor::{Actor, CastPhase, CurrentCast};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use cast_core::{ActorId, ActorView, PartyId, Position, TargetingContext};

pub type SharedActor = Arc<Mutex<Actor>>;

/// Locks an actor, recovering the data if a previous holder panicked.
pub(crate) fn lock(actor: &Mutex<Actor>) -> MutexGuard<'_, Actor> {
    actor.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub struct World {
    actors: RwLock<HashMap<ActorId, SharedActor>>,
    /// Members per party, in join order.
    parties: RwLock<HashMap<PartyId, Vec<ActorId>>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an actor, replacing any actor with the same id.
    pub fn insert(&self, actor: Actor) -> SharedActor {
        let id = actor.id;
        let party = actor.social.party;
        let shared = Arc::new(Mutex::new(actor));
        let previous = self
            .actors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::clone(&shared));
        if previous.is_some() {
            self.forget_membership(id);
        }
        if let Some(party) = party {
            self.add_member(party, id);
        }
        shared
    }

    pub fn remove(&self, id: ActorId) -> Option<SharedActor> {
        let removed = self
            .actors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        if removed.is_some() {
            self.forget_membership(id);
        }
        removed
    }

    pub fn get(&self, id: ActorId) -> Option<SharedActor> {
        self.actors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// All actor ids in ascending order.
    pub fn ids(&self) -> Vec<ActorId> {
        let mut ids: Vec<_> = self
            .actors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Runs `f` under the actor's lock.
    pub fn with_actor<R>(&self, id: ActorId, f: impl FnOnce(&mut Actor) -> R) -> Option<R> {
        let shared = self.get(id)?;
        let mut actor = lock(&shared);
        Some(f(&mut actor))
    }

    /// Moves an actor into a party, leaving any previous one.
    pub fn join_party(&self, id: ActorId, party: PartyId) -> bool {
        let joined = self
            .with_actor(id, |actor| actor.social.party = Some(party))
            .is_some();
        if joined {
            self.forget_membership(id);
            self.add_member(party, id);
        }
        joined
    }

    pub fn leave_party(&self, id: ActorId) {
        self.with_actor(id, |actor| actor.social.party = None);
        self.forget_membership(id);
    }

    fn add_member(&self, party: PartyId, id: ActorId) {
        let mut parties = self.parties.write().unwrap_or_else(PoisonError::into_inner);
        let members = parties.entry(party).or_default();
        if !members.contains(&id) {
            members.push(id);
        }
    }

    fn forget_membership(&self, id: ActorId) {
        let mut parties = self.parties.write().unwrap_or_else(PoisonError::into_inner);
        for members in parties.values_mut() {
            members.retain(|member| *member != id);
        }
        parties.retain(|_, members| !members.is_empty());
    }

    /// Handles in id order, cloned out so no registry lock is held while locking actors.
    fn handles(&self) -> Vec<SharedActor> {
        let actors = self.actors.read().unwrap_or_else(PoisonError::into_inner);
        let mut handles: Vec<_> = actors.iter().map(|(id, a)| (*id, Arc::clone(a))).collect();
        drop(actors);
        handles.sort_unstable_by_key(|(id, _)| *id);
        handles.into_iter().map(|(_, handle)| handle).collect()
    }
}

impl TargetingContext for World {
    fn view(&self, id: ActorId) -> Option<ActorView> {
        self.with_actor(id, |actor| actor.view())
    }

    fn party_members(&self, party: PartyId) -> Vec<ActorId> {
        self.parties
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&party)
            .cloned()
            .unwrap_or_default()
    }

    fn nearby(&self, center: Position, radius: u32) -> Vec<ActorView> {
        self.handles()
            .iter()
            .filter_map(|handle| {
                let actor = lock(handle);
                center
                    .within_range(actor.position, radius)
                    .then(|| actor.view())
            })
            .collect()
    }
}
