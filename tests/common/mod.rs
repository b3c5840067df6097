//! Fake native layer shared by the integration tests.
//!
//! Handles are allocated from a process-wide counter and every free is
//! recorded in a process-wide log, so tests using it run under `#[serial]`.

#![allow(dead_code)]

use handle_registry::{HandleId, HandleSlot, NativeError, NativeWrapper};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);
static FREED: Mutex<Vec<u64>> = Mutex::new(Vec::new());

/// Allocates a fresh native handle.
pub fn allocate() -> HandleId {
    HandleId::new(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed)).unwrap()
}

/// Handles freed since the last `reset`, in free order.
pub fn freed() -> Vec<u64> {
    FREED.lock().unwrap().clone()
}

pub fn reset() {
    FREED.lock().unwrap().clear();
}

fn native_free(id: HandleId) {
    FREED.lock().unwrap().push(id.get());
}

/// A wrapper over one fake native object.
pub struct Object {
    slot: HandleSlot,
    kind: &'static str,
    calls: Cell<usize>,
    fail: Cell<bool>,
}

impl Object {
    pub fn with_id(kind: &'static str, raw: u64) -> Rc<Self> {
        Rc::new(Self {
            slot: HandleSlot::new(HandleId::new(raw).unwrap()),
            kind,
            calls: Cell::new(0),
            fail: Cell::new(false),
        })
    }

    pub fn term_manager() -> Rc<Self> {
        Self::allocated("TermManager")
    }

    pub fn solver() -> Rc<Self> {
        Self::allocated("Solver")
    }

    pub fn sort() -> Rc<Self> {
        Self::allocated("Sort")
    }

    pub fn term() -> Rc<Self> {
        Self::allocated("Term")
    }

    fn allocated(kind: &'static str) -> Rc<Self> {
        Self::with_id(kind, allocate().get())
    }

    /// Makes the next native release of this object fail.
    pub fn fail_release(&self) {
        self.fail.set(true);
    }

    /// How many times `release_native` was called.
    pub fn release_calls(&self) -> usize {
        self.calls.get()
    }

    pub fn raw(&self) -> u64 {
        self.slot.get().map_or(0, HandleId::get)
    }
}

impl NativeWrapper for Object {
    fn identity(&self) -> Option<HandleId> {
        self.slot.get()
    }

    fn release_native(&self) -> Result<(), NativeError> {
        self.calls.set(self.calls.get() + 1);
        let id = self
            .slot
            .take()
            .ok_or_else(|| format!("{} released twice", self.kind))?;
        if self.fail.get() {
            return Err(format!("{} {id} is still referenced", self.kind).into());
        }
        native_free(id);
        Ok(())
    }

    fn kind(&self) -> &'static str {
        self.kind
    }
}
