//! Integration tests for thread-scoped contexts.
//!
//! Every thread gets its own registry behind `current_thread` and behind any
//! module generated by `define_context!`.
//!
//! NOTE: All tests use #[serial] because they share the fake native layer's
//! free log (see `common`).

mod common;

use common::Object;
use handle_registry::{
    current_thread, define_context, HandleId, HandleSlot, NativeError, NativeWrapper,
    RegistryOptions,
};
use serial_test::serial;
use std::rc::Rc;
use std::sync::{mpsc, Arc, Barrier};
use std::thread;

define_context!(worker);
define_context!(quiet, RegistryOptions::new().capacity(16).leak_check(false));

#[test]
#[serial]
fn test_current_thread_scenario() {
    common::reset();
    thread::spawn(|| {
        let ten = Object::with_id("Term", 10);
        let twenty = Object::with_id("Term", 20);
        let thirty = Object::with_id("Term", 30);
        current_thread::register(ten.clone());
        current_thread::register(twenty.clone());
        current_thread::register(thirty.clone());

        current_thread::unregister(&*twenty);
        assert_eq!(current_thread::release_all().unwrap(), 2);
        assert!(current_thread::is_empty());
    })
    .join()
    .unwrap();

    assert_eq!(common::freed(), vec![30, 10]);
}

#[test]
#[serial]
fn test_release_all_on_other_thread_leaves_entries_alone() {
    common::reset();
    let barrier = Arc::new(Barrier::new(2));
    let (tx, rx) = mpsc::channel();

    let owner_barrier = barrier.clone();
    let owner = thread::spawn(move || {
        let tm = Object::term_manager();
        let raw = tm.raw();
        current_thread::register(tm.clone());
        tx.send(raw).unwrap();

        // Wait until the other thread has run its teardown.
        owner_barrier.wait();

        assert_eq!(current_thread::handles(), vec![HandleId::new(raw).unwrap()]);
        assert_eq!(tm.release_calls(), 0);
        current_thread::release_all().unwrap();
        assert_eq!(tm.release_calls(), 1);
    });

    let raw = rx.recv().unwrap();
    let other = thread::spawn(move || {
        assert!(!current_thread::contains(HandleId::new(raw).unwrap()));
        assert_eq!(current_thread::release_all().unwrap(), 0);
    });
    other.join().unwrap();
    barrier.wait();
    owner.join().unwrap();

    assert_eq!(common::freed(), vec![raw]);
}

#[test]
#[serial]
fn test_defined_contexts_are_isolated() {
    common::reset();
    let solver = Object::solver();
    let sort = Object::sort();
    let (solver_raw, sort_raw) = (solver.raw(), sort.raw());

    worker::register(solver.clone());
    current_thread::register(sort.clone());

    assert_eq!(worker::len(), 1);
    assert_eq!(current_thread::len(), 1);

    worker::release_all().unwrap();
    assert_eq!(sort.release_calls(), 0);
    assert_eq!(common::freed(), vec![solver_raw]);

    current_thread::release_all().unwrap();
    assert_eq!(common::freed(), vec![solver_raw, sort_raw]);
}

#[test]
#[serial]
fn test_context_options_apply() {
    let capacity = quiet::with(|registry| registry.options().capacity);
    assert_eq!(capacity, 16);
    assert!(!quiet::with(|registry| registry.options().leak_check));
    assert!(worker::with(|registry| registry.options().leak_check));
}

#[test]
#[serial]
fn test_individual_release_through_context() {
    common::reset();
    let tm = Object::term_manager();
    let term = Object::term();
    worker::register(tm.clone());
    worker::register(term.clone());

    assert!(worker::release(&*term).unwrap());
    assert!(!worker::release(&*term).unwrap());
    worker::release_all().unwrap();

    assert_eq!(term.release_calls(), 1);
    assert_eq!(tm.release_calls(), 1);
}

#[test]
#[serial]
fn test_failed_sweep_keeps_older_entries_registered() {
    common::reset();
    let tm = Object::term_manager();
    let solver = Object::solver();
    let tm_raw = tm.raw();
    solver.fail_release();
    worker::register(tm.clone());
    worker::register(solver.clone());

    assert!(worker::release_all().is_err());
    assert_eq!(worker::handles(), vec![HandleId::new(tm_raw).unwrap()]);

    assert_eq!(worker::release_all().unwrap(), 1);
    assert_eq!(solver.release_calls(), 1);
    assert_eq!(common::freed(), vec![tm_raw]);
}

#[test]
#[serial]
fn test_release_all_collect_through_context() {
    common::reset();
    let broken = Object::term();
    broken.fail_release();
    worker::register(Object::term());
    worker::register(broken.clone());

    let report = worker::release_all_collect();

    assert_eq!(report.released, 1);
    assert_eq!(report.failures.len(), 1);
    assert!(worker::is_empty());
}

/// Unregisters itself from `worker` while being released.
struct SelfUnregistering {
    slot: HandleSlot,
    released: std::cell::Cell<usize>,
}

impl NativeWrapper for SelfUnregistering {
    fn identity(&self) -> Option<HandleId> {
        self.slot.get()
    }

    fn release_native(&self) -> Result<(), NativeError> {
        worker::unregister(self);
        self.slot.take();
        self.released.set(self.released.get() + 1);
        Ok(())
    }
}

#[test]
#[serial]
fn test_wrapper_may_unregister_itself_during_sweep() {
    let wrapper = Rc::new(SelfUnregistering {
        slot: HandleSlot::new(common::allocate()),
        released: std::cell::Cell::new(0),
    });
    worker::register(wrapper.clone());
    worker::register(Object::term());

    assert_eq!(worker::release_all().unwrap(), 2);
    assert_eq!(wrapper.released.get(), 1);
    assert!(worker::is_empty());
}

/// Registers a replacement object in `worker` while being released.
struct Respawning {
    slot: HandleSlot,
    spawned: std::cell::RefCell<Option<Rc<Object>>>,
}

impl NativeWrapper for Respawning {
    fn identity(&self) -> Option<HandleId> {
        self.slot.get()
    }

    fn release_native(&self) -> Result<(), NativeError> {
        self.slot.take();
        let replacement = Object::term();
        worker::register(replacement.clone());
        *self.spawned.borrow_mut() = Some(replacement);
        Ok(())
    }
}

#[test]
#[serial]
fn test_registration_during_sweep_waits_for_next_teardown() {
    let wrapper = Rc::new(Respawning {
        slot: HandleSlot::new(common::allocate()),
        spawned: std::cell::RefCell::new(None),
    });
    worker::register(wrapper.clone());

    assert_eq!(worker::release_all().unwrap(), 1);
    let spawned = wrapper.spawned.borrow_mut().take().unwrap();
    assert_eq!(worker::len(), 1);
    assert_eq!(spawned.release_calls(), 0);

    assert_eq!(worker::release_all().unwrap(), 1);
    assert_eq!(spawned.release_calls(), 1);
}

/// Frees the term it owns through `worker` before freeing itself.
struct OwningSolver {
    slot: HandleSlot,
    owned: Rc<Object>,
}

impl NativeWrapper for OwningSolver {
    fn identity(&self) -> Option<HandleId> {
        self.slot.get()
    }

    fn release_native(&self) -> Result<(), NativeError> {
        worker::release(&*self.owned)?;
        self.slot.take();
        Ok(())
    }
}

#[test]
#[serial]
fn test_pending_wrapper_released_by_another_is_freed_once() {
    common::reset();
    let term = Object::with_id("Term", 7);
    let solver = Rc::new(OwningSolver {
        slot: HandleSlot::new(HandleId::new(8).unwrap()),
        owned: term.clone(),
    });
    worker::register(term.clone());
    worker::register(solver.clone());

    assert_eq!(worker::release_all().unwrap(), 1);

    assert_eq!(term.release_calls(), 1);
    assert_eq!(solver.identity(), None);
    assert_eq!(common::freed(), vec![7]);
    assert!(worker::is_empty());
}
