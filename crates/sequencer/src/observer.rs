/// View-side collaborator notified as a sequencer advances.
///
/// Callbacks run synchronously on the sequencer's run task (or on the caller
/// of [`crate::Sequencer::reset`] for `on_reset`). They must not call back into
/// the sequencer that owns them.
pub trait StepObserver<S>: Send + 'static {
    fn on_step(&mut self, index: usize, step: &S) -> anyhow::Result<()>;
    fn on_complete(&mut self) -> anyhow::Result<()>;
    fn on_reset(&mut self) -> anyhow::Result<()>;
}

impl<S, O> StepObserver<S> for Box<O>
where
    O: StepObserver<S> + ?Sized,
{
    fn on_step(&mut self, index: usize, step: &S) -> anyhow::Result<()> {
        (**self).on_step(index, step)
    }

    fn on_complete(&mut self) -> anyhow::Result<()> {
        (**self).on_complete()
    }

    fn on_reset(&mut self) -> anyhow::Result<()> {
        (**self).on_reset()
    }
}
