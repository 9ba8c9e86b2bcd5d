use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// One progress notification: how far the run is and what it is doing.
///
/// Borrowed and transient; sinks must not retain the message past `emit`.
#[derive(Clone, Copy, Debug)]
pub struct ProgressEvent<'a> {
    /// Completed share of the run, already clamped to `[0.0, 1.0]` and
    /// non-decreasing within one run.
    pub fraction: f32,
    pub message: &'a str,
}

/// Anything that wants to know how far inference has progressed.
///
/// `emit` runs inline on the inference thread, so a sink that blocks stalls
/// the run.
pub trait ProgressSink {
    fn emit(&mut self, event: ProgressEvent<'_>);
}

/// Default sink: fixed-width percentage plus message on stdout.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn emit(&mut self, event: ProgressEvent<'_>) {
        println!("{:>3.0}% {}", event.fraction * 100.0, event.message);
    }
}

/// Detached switch for tearing down a [`CallbackSink`] boundary.
///
/// Cloneable; the caller keeps one and closes it when the receiving side is
/// gone, after which events are dropped instead of delivered.
#[derive(Clone, Debug)]
pub struct BoundaryHandle {
    open: Arc<AtomicBool>,
}

impl BoundaryHandle {
    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

/// Caller-supplied sink: forwards each event to a registered handler as a
/// `(percentage, message)` pair until its boundary is closed.
pub struct CallbackSink {
    callback: Box<dyn FnMut(f32, &str) + Send>,
    open: Arc<AtomicBool>,
}

impl CallbackSink {
    pub fn new(callback: impl FnMut(f32, &str) + Send + 'static) -> Self {
        Self {
            callback: Box::new(callback),
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Handle for invalidating this sink once the caller's side is torn
    /// down.
    pub fn handle(&self) -> BoundaryHandle {
        BoundaryHandle {
            open: Arc::clone(&self.open),
        }
    }
}

impl ProgressSink for CallbackSink {
    fn emit(&mut self, event: ProgressEvent<'_>) {
        if !self.open.load(Ordering::Acquire) {
            return;
        }
        (self.callback)(event.fraction * 100.0, event.message);
    }
}
