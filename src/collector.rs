//! Garbage collection hook run before timed iterations
//!
//! Rust code has no tracing collector of its own, so the step is a hook: hosts
//! embedding a managed runtime, an arena or a pooled allocator plug in whatever
//! "return to a clean heap" means for them.

/// Forces a full collection cycle
pub trait GarbageCollector {
    /// Run a full collection
    fn collect(&mut self);

    /// Block until work queued by the previous collection has finished
    fn wait_for_pending_finalizers(&mut self) {}

    /// Collect, drain finalizers, then collect whatever they released
    fn full_cycle(&mut self) {
        self.collect();
        self.wait_for_pending_finalizers();
        self.collect();
    }
}

impl<G: GarbageCollector + ?Sized> GarbageCollector for &mut G {
    fn collect(&mut self) {
        (**self).collect();
    }

    fn wait_for_pending_finalizers(&mut self) {
        (**self).wait_for_pending_finalizers();
    }
}

impl<G: GarbageCollector + ?Sized> GarbageCollector for Box<G> {
    fn collect(&mut self) {
        (**self).collect();
    }

    fn wait_for_pending_finalizers(&mut self) {
        (**self).wait_for_pending_finalizers();
    }
}

/// Collector that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCollector;

impl GarbageCollector for NoopCollector {
    fn collect(&mut self) {}
}

/// Collector backed by closures
pub struct FnCollector<C, W = fn()> {
    collect: C,
    wait: Option<W>,
}

impl<C: FnMut()> FnCollector<C> {
    pub fn new(collect: C) -> Self {
        Self {
            collect,
            wait: None,
        }
    }
}

impl<C: FnMut(), W: FnMut()> FnCollector<C, W> {
    /// Attach a finalizer drain
    pub fn with_finalizers<W2: FnMut()>(self, wait: W2) -> FnCollector<C, W2> {
        FnCollector {
            collect: self.collect,
            wait: Some(wait),
        }
    }
}

impl<C: FnMut(), W: FnMut()> GarbageCollector for FnCollector<C, W> {
    fn collect(&mut self) {
        (self.collect)();
    }

    fn wait_for_pending_finalizers(&mut self) {
        if let Some(wait) = self.wait.as_mut() {
            wait();
        }
    }
}
