//! Once-only resolution slots, the claim table and the resolution chain.
//!
//! Every type owns four slots (declared bases, base, interfaces, all
//! interfaces). A slot moves from unevaluated to in-progress when a chain
//! claims it and to evaluated when the owning chain publishes it; it is never
//! reset.
//!
//! ## Chains
//!
//! A [`ResolutionChain`] is one logical call chain: the stack of slots being
//! computed by one top-level query. It is passed explicitly through every
//! recursive call. When a chain asks for a slot it already owns, the request
//! is re-entrant: every frame from the owned slot up to the top of the stack
//! is marked as a cycle participant and the request yields no value.
//!
//! Frames that were marked by a re-entry below them do not publish when they
//! pop. Their results wait on the chain until the lowest frame of the cycle
//! completes, and the whole group publishes together. Until then any request
//! for one of them is re-entrant too, so every member of a cycle sees the same
//! answer whichever member was asked first.
//!
//! ## Claims
//!
//! A slot claimed by another chain is waited for. Before blocking, the
//! waiting chain follows the wait-for edges of the claim table; if they lead
//! back to itself the chains are deadlocked on a cycle, and every chain on it
//! is released as if it had re-entered its own slot.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap;

use super::bases::DeclaredBases;
use super::diagnostics::Diagnostic;
use super::ids::TypeId;
use super::types::TypeRef;

// ============================================================================
// SLOTS
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) enum SlotKind {
    /// Bound base list before cycle checks.
    Declared,
    Base,
    Interfaces,
    AllInterfaces,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct SlotKey {
    pub ty: TypeId,
    pub kind: SlotKind,
}

impl SlotKey {
    pub fn new(ty: TypeId, kind: SlotKind) -> Self {
        Self { ty, kind }
    }
}

/// A published slot value with the diagnostics found while computing it.
#[derive(Debug)]
pub(crate) struct Evaluated<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Evaluated<T> {
    pub fn new(value: T, diagnostics: Vec<Diagnostic>) -> Self {
        Self { value, diagnostics }
    }
}

/// Lazily computed state of one type.
#[derive(Debug, Default)]
pub(crate) struct TypeSlots {
    pub declared: OnceLock<Evaluated<DeclaredBases>>,
    pub base: OnceLock<Evaluated<Option<TypeRef>>>,
    pub interfaces: OnceLock<Evaluated<Vec<TypeRef>>>,
    pub all_interfaces: OnceLock<Evaluated<Vec<TypeRef>>>,
}

impl TypeSlots {
    pub fn is_ready(&self, kind: SlotKind) -> bool {
        match kind {
            SlotKind::Declared => self.declared.get().is_some(),
            SlotKind::Base => self.base.get().is_some(),
            SlotKind::Interfaces => self.interfaces.get().is_some(),
            SlotKind::AllInterfaces => self.all_interfaces.get().is_some(),
        }
    }

    /// Store `value`. Returns the diagnostics to report, or nothing if the slot was already set.
    pub fn publish(&self, value: SlotValue) -> Vec<Diagnostic> {
        fn set<T>(cell: &OnceLock<Evaluated<T>>, value: Evaluated<T>) -> Vec<Diagnostic> {
            let diagnostics = value.diagnostics.clone();
            match cell.set(value) {
                Ok(()) => diagnostics,
                Err(_) => Vec::new(),
            }
        }
        match value {
            SlotValue::Declared(v) => set(&self.declared, v),
            SlotValue::Base(v) => set(&self.base, v),
            SlotValue::Interfaces(v) => set(&self.interfaces, v),
            SlotValue::AllInterfaces(v) => set(&self.all_interfaces, v),
        }
    }
}

/// A computed value on its way into a slot.
#[derive(Debug)]
pub(crate) enum SlotValue {
    Declared(Evaluated<DeclaredBases>),
    Base(Evaluated<Option<TypeRef>>),
    Interfaces(Evaluated<Vec<TypeRef>>),
    AllInterfaces(Evaluated<Vec<TypeRef>>),
}

// ============================================================================
// RESOLUTION CHAIN
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct ChainId(u64);

impl ChainId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ChainId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug)]
struct Frame {
    key: SlotKey,
    /// Bumped each time a cycle is closed through this frame.
    cycle_hits: u32,
    /// Next type on the most recently closed cycle.
    neighbor: Option<TypeId>,
    /// Lowest stack index this frame shares a cycle with.
    low: usize,
}

/// A finished frame waiting for the lowest frame of its cycle.
#[derive(Debug)]
struct Deferred {
    key: SlotKey,
    low: usize,
    value: SlotValue,
}

/// The slots one logical query is currently computing, innermost last.
#[derive(Debug)]
pub(crate) struct ResolutionChain {
    id: ChainId,
    frames: Vec<Frame>,
    deferred: Vec<Deferred>,
}

impl Default for ResolutionChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionChain {
    pub fn new() -> Self {
        Self {
            id: ChainId::next(),
            frames: Vec::new(),
            deferred: Vec::new(),
        }
    }

    pub fn id(&self) -> ChainId {
        self.id
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push(&mut self, key: SlotKey) {
        let low = self.frames.len();
        self.frames.push(Frame {
            key,
            cycle_hits: 0,
            neighbor: None,
            low,
        });
    }

    /// Cycle hits of the innermost frame.
    pub fn top_hits(&self) -> u32 {
        self.frames.last().map_or(0, |f| f.cycle_hits)
    }

    pub fn top_neighbor(&self) -> Option<TypeId> {
        self.frames.last().and_then(|f| f.neighbor)
    }

    /// Replace the innermost frame's neighbor, e.g. with the type a lookup started from.
    pub fn set_top_neighbor(&mut self, neighbor: TypeId) {
        if let Some(frame) = self.frames.last_mut() {
            frame.neighbor = Some(neighbor);
        }
    }

    /// Close a cycle at `entry`, a slot this chain owns, coming back from the top frame.
    ///
    /// `closing` is the type the top frame was asking for.
    pub fn mark_cycle(&mut self, entry: SlotKey, closing: TypeId) {
        let from = match self.frames.iter().rposition(|f| f.key == entry) {
            Some(index) => index,
            None => match self.deferred.iter().find(|d| d.key == entry) {
                Some(deferred) => deferred.low,
                None => return,
            },
        };
        let len = self.frames.len();
        for index in from..len {
            let neighbor = match self.frames.get(index + 1) {
                Some(next) => next.key.ty,
                None => closing,
            };
            let frame = &mut self.frames[index];
            frame.cycle_hits += 1;
            frame.neighbor = Some(neighbor);
            frame.low = frame.low.min(from);
        }
        tracing::debug!(
            "[CLAIM] cycle closed at {:?} ({} frames)",
            entry,
            len.saturating_sub(from)
        );
    }

    /// Pop the top frame with its computed value.
    ///
    /// Returns the values that are now complete: empty when the frame belongs
    /// to a cycle whose lowest frame is still running, otherwise the frame's
    /// own value together with every deferred member of its cycle.
    pub fn pop(&mut self, value: SlotValue) -> Vec<(SlotKey, SlotValue)> {
        let Some(frame) = self.frames.pop() else {
            return Vec::new();
        };
        let index = self.frames.len();
        if frame.low < index {
            self.deferred.push(Deferred {
                key: frame.key,
                low: frame.low,
                value,
            });
            return Vec::new();
        }

        let mut complete = Vec::new();
        let mut kept = Vec::new();
        for deferred in std::mem::take(&mut self.deferred) {
            if deferred.low >= index {
                complete.push((deferred.key, deferred.value));
            } else {
                kept.push(deferred);
            }
        }
        self.deferred = kept;
        complete.push((frame.key, value));
        complete
    }
}

// ============================================================================
// CLAIM TABLE
// ============================================================================

/// Result of asking for a slot.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum ClaimOutcome {
    /// The value is published.
    Ready,
    /// The caller now owns the slot and must compute and publish it.
    Acquired,
    /// The caller's own chain owns the slot.
    Reentrant,
    /// Chains wait on each other in a cycle; `own_entry` is the slot this
    /// chain owns that the cycle runs through.
    Deadlock { own_entry: SlotKey },
}

#[derive(Debug)]
struct Wait {
    key: SlotKey,
    /// Set by the chain that detected a deadlock through this one.
    poisoned_from: Option<SlotKey>,
}

#[derive(Debug, Default)]
struct ClaimState {
    owners: FxHashMap<SlotKey, ChainId>,
    waits: FxHashMap<ChainId, Wait>,
}

/// Compilation-wide record of which chain owns which in-progress slot.
#[derive(Debug, Default)]
pub(crate) struct Claims {
    state: Mutex<ClaimState>,
    published: Condvar,
}

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key` for `chain`, waiting while another chain owns it.
    ///
    /// `is_ready` must report whether the slot is published; it is checked under the lock.
    pub fn claim(&self, key: SlotKey, chain: ChainId, is_ready: impl Fn() -> bool) -> ClaimOutcome {
        let mut state = self.state.lock();
        loop {
            if is_ready() {
                return ClaimOutcome::Ready;
            }
            let owner = match state.owners.get(&key) {
                None => {
                    state.owners.insert(key, chain);
                    return ClaimOutcome::Acquired;
                }
                Some(&owner) if owner == chain => return ClaimOutcome::Reentrant,
                Some(&owner) => owner,
            };

            if let Some(own_entry) = Self::break_deadlock(&mut state, key, owner, chain) {
                self.published.notify_all();
                return ClaimOutcome::Deadlock { own_entry };
            }

            tracing::trace!("[CLAIM] {:?} waits for {:?}", chain, key);
            state.waits.insert(
                chain,
                Wait {
                    key,
                    poisoned_from: None,
                },
            );
            self.published.wait(&mut state);
            if let Some(wait) = state.waits.remove(&chain) {
                if let Some(own_entry) = wait.poisoned_from {
                    return ClaimOutcome::Deadlock { own_entry };
                }
            }
        }
    }

    /// Follow wait-for edges from `owner`. If they reach `chain`, poison every
    /// other chain on the cycle and return the slot `chain` owns on it.
    fn break_deadlock(
        state: &mut ClaimState,
        wanted: SlotKey,
        owner: ChainId,
        chain: ChainId,
    ) -> Option<SlotKey> {
        // (chain on the cycle, slot of it that the previous chain waits on)
        let mut cycle = vec![(owner, wanted)];
        let mut current = owner;
        loop {
            let wait = state.waits.get(&current)?;
            if wait.poisoned_from.is_some() {
                return None;
            }
            let next_key = wait.key;
            let next = *state.owners.get(&next_key)?;
            if next == chain {
                for (member, entry) in cycle {
                    if let Some(wait) = state.waits.get_mut(&member) {
                        wait.poisoned_from = Some(entry);
                    }
                }
                tracing::debug!("[CLAIM] deadlock between chains broken at {:?}", next_key);
                return Some(next_key);
            }
            if cycle.len() > state.waits.len() {
                return None;
            }
            cycle.push((next, next_key));
            current = next;
        }
    }

    /// Drop ownership of published slots and wake waiting chains.
    pub fn release(&self, keys: impl IntoIterator<Item = SlotKey>) {
        let mut state = self.state.lock();
        for key in keys {
            state.owners.remove(&key);
        }
        drop(state);
        self.published.notify_all();
    }
}
