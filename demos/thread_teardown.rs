//! Per-thread contexts with `current_thread`.
//!
//! Each worker thread builds its own wrappers, uses them, and calls
//! `current_thread::release_all` before it exits. Registry logging goes
//! through `tracing`; run with `RUST_LOG=trace` to see every operation.
//!
//! Run with: `cargo run --example thread_teardown`

use handle_registry::{current_thread, HandleId, HandleSlot, NativeError, NativeWrapper};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use tracing_subscriber::EnvFilter;

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(0x10);

struct Object {
    kind: &'static str,
    slot: HandleSlot,
}

impl Object {
    /// Allocates a fake native object and registers it with this thread.
    fn create(kind: &'static str) -> Rc<Self> {
        let raw = NEXT_HANDLE.fetch_add(0x10, Ordering::Relaxed);
        let object = Rc::new(Self {
            kind,
            slot: HandleSlot::from(HandleId::new(raw)),
        });
        current_thread::register(object.clone());
        object
    }
}

impl NativeWrapper for Object {
    fn identity(&self) -> Option<HandleId> {
        self.slot.get()
    }

    fn release_native(&self) -> Result<(), NativeError> {
        let id = self.slot.take().ok_or("object already released")?;
        tracing::info!(kind = self.kind, %id, "native object freed");
        Ok(())
    }

    fn kind(&self) -> &'static str {
        self.kind
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let workers: Vec<_> = (0..3)
        .map(|n| {
            thread::Builder::new()
                .name(format!("worker-{n}"))
                .spawn(move || {
                    let _tm = Object::create("TermManager");
                    let _solver = Object::create("Solver");
                    for _ in 0..n {
                        Object::create("Term");
                    }

                    let live = current_thread::len();
                    let released = current_thread::release_all().expect("teardown failed");
                    tracing::info!(live, released, "worker context torn down");
                })
                .expect("failed to spawn worker")
        })
        .collect();

    for worker in workers {
        worker.join().expect("worker panicked");
    }
}
