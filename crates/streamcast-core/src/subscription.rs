//! Single-fire subscriptions

/// Holds a value for exactly the next occurrence of a signal.
///
/// Arming again replaces the pending value instead of stacking a second
/// handler, so repeated quality switches only ever restore once.
#[derive(Debug)]
pub struct Once<T> {
    slot: Option<T>,
}

impl<T> Once<T> {
    pub fn new() -> Self {
        Self { slot: None }
    }

    /// Arm with `value`, returning whatever was pending before
    pub fn arm(&mut self, value: T) -> Option<T> {
        self.slot.replace(value)
    }

    /// Consume the pending value, if any
    pub fn fire(&mut self) -> Option<T> {
        self.slot.take()
    }

    pub fn is_armed(&self) -> bool {
        self.slot.is_some()
    }

    pub fn cancel(&mut self) {
        self.slot = None;
    }
}

impl<T> Default for Once<T> {
    fn default() -> Self {
        Self::new()
    }
}
