use crate::ListenerId;

type Listener<E> = Box<dyn FnMut(&E) + Send>;

/// Synchronous observer list.
///
/// Listeners run in registration order on the dispatching thread and only
/// borrow the payload for the duration of the call, so the owner can keep one
/// payload per event kind and overwrite it before each dispatch.
pub struct EventBus<E> {
    listeners: Vec<(ListenerId, Listener<E>)>,
    next_id: u32,
}

impl<E> EventBus<E> {
    pub fn new() -> Self { Self { listeners: Vec::new(), next_id: 0 } }

    pub fn subscribe<F>(&mut self, f: F) -> ListenerId
    where
        F: FnMut(&E) + Send + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(f)));
        id
    }

    /// Returns false if the listener was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        match self.listeners.iter().position(|(l, _)| *l == id) {
            Some(i) => { self.listeners.remove(i); true }
            None => false,
        }
    }

    #[inline] pub fn has_listeners(&self) -> bool { !self.listeners.is_empty() }
    #[inline] pub fn len(&self) -> usize { self.listeners.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.listeners.is_empty() }
    pub fn clear(&mut self) { self.listeners.clear(); }

    pub fn dispatch(&mut self, event: &E) {
        for (_, f) in self.listeners.iter_mut() {
            f(event);
        }
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self { Self::new() }
}

impl<E> core::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventBus").field("listeners", &self.listeners.len()).finish()
    }
}
