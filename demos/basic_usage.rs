//! Basic usage example for handle-registry.
//!
//! Demonstrates:
//! - Implementing `NativeWrapper` for wrapper types
//! - Registering wrappers in an explicit `HandleRegistry`
//! - Releasing one wrapper individually
//! - Tearing down the rest in reverse registration order
//!
//! Run with: `cargo run --example basic_usage`

use handle_registry::{HandleId, HandleRegistry, HandleSlot, NativeError, NativeWrapper};
use std::rc::Rc;

/// Stand-in for a native library object.
struct Native {
    name: &'static str,
    slot: HandleSlot,
}

impl Native {
    fn new(name: &'static str, raw: u64) -> Rc<Self> {
        let id = HandleId::new(raw).expect("demo handles are non-zero");
        println!("   allocate {name} at {id}");
        Rc::new(Self {
            name,
            slot: HandleSlot::new(id),
        })
    }
}

impl NativeWrapper for Native {
    fn identity(&self) -> Option<HandleId> {
        self.slot.get()
    }

    fn release_native(&self) -> Result<(), NativeError> {
        if let Some(id) = self.slot.take() {
            println!("   free {} at {id}", self.name);
        }
        Ok(())
    }

    fn kind(&self) -> &'static str {
        self.name
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== handle-registry: Basic Usage ===\n");

    let mut registry = HandleRegistry::new();
    registry.set_trace_callback(|event| println!("   [trace] {event}"));

    // -------------------------------------------------------------------------
    // 1. Register wrappers as they are constructed
    // -------------------------------------------------------------------------
    println!("1. Building the object graph...");

    let term_manager = Native::new("TermManager", 0x1000);
    registry.register(term_manager.clone());

    let solver = Native::new("Solver", 0x2000);
    registry.register(solver.clone());

    let sort = Native::new("Sort", 0x3000);
    registry.register(sort.clone());

    let term = Native::new("Term", 0x4000);
    registry.register(term.clone());

    println!("   {} live handles", registry.len());

    // -------------------------------------------------------------------------
    // 2. Release one wrapper early
    // -------------------------------------------------------------------------
    println!("\n2. Releasing the sort individually...");

    registry.release(&*sort)?;

    // Doing it again is harmless.
    registry.release(&*sort)?;

    // -------------------------------------------------------------------------
    // 3. Tear down everything else, newest first
    // -------------------------------------------------------------------------
    println!("\n3. Tearing down the context...");

    let released = registry.release_all()?;
    println!("   released {released} handles");

    assert!(registry.is_empty());
    assert_eq!(term_manager.identity(), None);

    println!("\n=== Example completed successfully ===");
    Ok(())
}
