use shared::protocol::VisualEvent;
use tracing::trace;

/// Observer for stepper transitions.
///
/// Sinks receive events synchronously and only by shared reference, so they
/// cannot influence the stepper that emitted them. Any `FnMut(&VisualEvent<T>)`
/// closure is a sink.
pub trait VisualSink<T> {
    fn notify(&mut self, event: &VisualEvent<T>);
}

impl<T, F> VisualSink<T> for F
where
    F: FnMut(&VisualEvent<T>),
{
    fn notify(&mut self, event: &VisualEvent<T>) {
        self(event)
    }
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl<T> VisualSink<T> for NoopSink {
    fn notify(&mut self, _event: &VisualEvent<T>) {}
}

/// Optional sink held by a stepper. Events are only built when a sink is
/// registered.
pub(crate) struct Notifier<T> {
    sink: Option<Box<dyn VisualSink<T>>>,
}

impl<T> Notifier<T> {
    pub(crate) fn silent() -> Self {
        Self { sink: None }
    }

    pub(crate) fn new(sink: Box<dyn VisualSink<T>>) -> Self {
        Self { sink: Some(sink) }
    }

    pub(crate) fn emit(&mut self, build: impl FnOnce() -> VisualEvent<T>) {
        if let Some(sink) = self.sink.as_mut() {
            let event = build();
            trace!(event = event.name(), "visual event");
            sink.notify(&event);
        }
    }
}
