//! # plugin-foo
//!
//! Example module implementing the factory variant of the module protocol.
//! Every lifecycle step prints a line, so a host run shows construction,
//! invocation, and destruction in order. The same steps are counted in
//! [`FOO_LIFECYCLE`] so hosts can check them without capturing stdout.

use std::sync::atomic::{AtomicUsize, Ordering};

use modhost_plugin_sdk::prelude::*;

/// Lifecycle step recorded in [`Lifecycle::last`].
pub const EVENT_CONSTRUCTED: usize = 1;
/// See [`EVENT_CONSTRUCTED`].
pub const EVENT_TESTED: usize = 2;
/// See [`EVENT_CONSTRUCTED`].
pub const EVENT_DESTROYED: usize = 3;

/// Per-step counters for every `Foo` this module has produced.
#[repr(C)]
#[derive(Debug)]
pub struct Lifecycle {
    pub constructed: AtomicUsize,
    pub tested: AtomicUsize,
    pub destroyed: AtomicUsize,
    /// The most recent step, one of the `EVENT_*` values, or 0.
    pub last: AtomicUsize,
}

impl Lifecycle {
    const fn new() -> Self {
        Self {
            constructed: AtomicUsize::new(0),
            tested: AtomicUsize::new(0),
            destroyed: AtomicUsize::new(0),
            last: AtomicUsize::new(0),
        }
    }

    fn record(&self, counter: &AtomicUsize, event: usize) {
        counter.fetch_add(1, Ordering::SeqCst);
        self.last.store(event, Ordering::SeqCst);
    }
}

#[unsafe(no_mangle)]
pub static FOO_LIFECYCLE: Lifecycle = Lifecycle::new();

/// The plugin type constructed by [`FooFactory`].
#[derive(Debug)]
pub struct Foo;

impl Foo {
    fn new() -> Self {
        println!("    foo created [plugin-foo - Foo::new()]");
        FOO_LIFECYCLE.record(&FOO_LIFECYCLE.constructed, EVENT_CONSTRUCTED);
        Self
    }
}

impl Plugin for Foo {
    fn test(&self) {
        println!("    foo tested [plugin-foo - Foo::test()]");
        FOO_LIFECYCLE.record(&FOO_LIFECYCLE.tested, EVENT_TESTED);
    }
}

impl Drop for Foo {
    fn drop(&mut self) {
        println!("    foo destroyed [plugin-foo - Foo::drop()]");
        FOO_LIFECYCLE.record(&FOO_LIFECYCLE.destroyed, EVENT_DESTROYED);
    }
}

/// Singleton factory for [`Foo`].
#[derive(Debug)]
pub struct FooFactory;

impl PluginFactory for FooFactory {
    type Plugin = Foo;

    fn construct(&self) -> Foo {
        println!("    making foo [plugin-foo - FooFactory::construct()]");
        Foo::new()
    }
}

static FOO_FACTORY: FooFactory = FooFactory;

export_factory!(name: c"foo Object", factory: FOO_FACTORY);
