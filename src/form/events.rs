use std::sync::Arc;

use super::controller::{Form, FormResult, SubmitState, read_lock, write_lock};
use super::model::FormModel;

/// Something observable changed on a form. Listeners re-read whatever they render.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FormEvent {
    FieldsChanged,
    ErrorsChanged,
    Reset,
    SubmitStateChanged(SubmitState),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SubscriptionId(u64);

pub(super) type Listener = Arc<dyn Fn(&FormEvent) + Send + Sync>;

#[derive(Default)]
pub(super) struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

impl<T> Form<T>
where
    T: FormModel,
{
    /// Registers `listener` for every event on this form and its clones.
    ///
    /// Listeners are called in registration order after the form state is unlocked.
    pub fn subscribe(
        &self,
        listener: impl Fn(&FormEvent) + Send + Sync + 'static,
    ) -> FormResult<SubscriptionId> {
        let mut listeners = write_lock(&self.listeners, "subscribing listener")?;
        listeners.next_id += 1;
        let id = SubscriptionId(listeners.next_id);
        listeners.entries.push((id, Arc::new(listener)));
        Ok(id)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> FormResult<bool> {
        let mut listeners = write_lock(&self.listeners, "unsubscribing listener")?;
        let before = listeners.entries.len();
        listeners.entries.retain(|(entry_id, _)| *entry_id != id);
        Ok(listeners.entries.len() != before)
    }

    pub(super) fn emit(&self, event: FormEvent) -> FormResult<()> {
        let listeners = read_lock(&self.listeners, "notifying listeners")?
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect::<Vec<_>>();
        for listener in listeners {
            listener(&event);
        }
        Ok(())
    }
}
