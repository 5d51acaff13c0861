use crate::di::definition::Identity;
use crate::error::{PapersheetError, Result};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

/// Which thread is building which singleton, and which singleton each
/// blocked thread is waiting for.
///
/// Before a thread blocks on a creation lock held by another thread it
/// follows the waits-for chain. If the chain leads back to itself the wait
/// could never end, so a [`PapersheetError::CircularDependency`] is returned
/// instead.
#[derive(Default)]
pub(crate) struct CreationTracker {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    builders: HashMap<Identity, ThreadId>,
    waiting: HashMap<ThreadId, Identity>,
}

impl CreationTracker {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record that the current thread is about to block on `identity`.
    pub(crate) fn wait_for(&self, identity: Identity) -> Result<()> {
        let me = thread::current().id();
        let mut state = self.state();

        let mut chain = vec![identity];
        let mut next = identity;
        while let Some(&owner) = state.builders.get(&next) {
            if owner == me {
                let cycle = std::iter::once(&next)
                    .chain(chain.iter())
                    .map(Identity::type_name)
                    .collect::<Vec<_>>()
                    .join(" -> ");
                tracing::debug!("Cross-thread dependency cycle: {}", cycle);
                return Err(PapersheetError::CircularDependency { cycle });
            }
            match state.waiting.get(&owner) {
                Some(&waited) if chain.len() <= state.builders.len() => {
                    chain.push(waited);
                    next = waited;
                }
                _ => break,
            }
        }

        state.waiting.insert(me, identity);
        Ok(())
    }

    /// Record that the current thread holds the creation lock for `identity`.
    ///
    /// The record is removed when the returned guard drops.
    pub(crate) fn building(&self, identity: Identity) -> Building<'_> {
        let me = thread::current().id();
        let mut state = self.state();
        state.waiting.remove(&me);
        state.builders.insert(identity, me);
        Building {
            tracker: self,
            identity,
        }
    }
}

pub(crate) struct Building<'t> {
    tracker: &'t CreationTracker,
    identity: Identity,
}

impl Drop for Building<'_> {
    fn drop(&mut self) {
        self.tracker.state().builders.remove(&self.identity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;

    struct A;
    struct B;

    #[test]
    fn test_wait_on_own_identity_is_a_cycle() {
        let tracker = CreationTracker::default();
        let _building = tracker.building(Identity::of::<A>());

        match tracker.wait_for(Identity::of::<A>()) {
            Err(PapersheetError::CircularDependency { cycle }) => {
                assert_eq!(cycle.matches(" -> ").count(), 1, "{cycle}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_wait_on_other_thread_without_cycle() {
        let tracker = CreationTracker::default();
        let (held, checked) = (Barrier::new(2), Barrier::new(2));

        thread::scope(|s| {
            s.spawn(|| {
                let _building = tracker.building(Identity::of::<B>());
                held.wait();
                checked.wait();
            });

            held.wait();
            let _building = tracker.building(Identity::of::<A>());
            assert!(tracker.wait_for(Identity::of::<B>()).is_ok());
            checked.wait();
        });
    }

    #[test]
    fn test_two_thread_cycle_names_both() {
        let tracker = CreationTracker::default();
        let (held, waiting) = (Barrier::new(2), Barrier::new(2));

        thread::scope(|s| {
            s.spawn(|| {
                let _building = tracker.building(Identity::of::<B>());
                held.wait();
                tracker.wait_for(Identity::of::<A>()).unwrap();
                waiting.wait();
            });

            let _building = tracker.building(Identity::of::<A>());
            held.wait();
            waiting.wait();
            match tracker.wait_for(Identity::of::<B>()) {
                Err(PapersheetError::CircularDependency { cycle }) => {
                    assert!(cycle.starts_with(Identity::of::<A>().type_name()), "{cycle}");
                    assert!(cycle.contains("::B"), "{cycle}");
                    assert_eq!(cycle.matches(" -> ").count(), 2, "{cycle}");
                }
                other => panic!("unexpected result: {other:?}"),
            }
        });
    }
}
