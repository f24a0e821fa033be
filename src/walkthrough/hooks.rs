//! Multi-subscriber synchronous callbacks

use std::fmt;

/// An ordered list of zero-argument callbacks, all invoked on `invoke`
#[derive(Default)]
pub struct Hook {
    subscribers: Vec<Box<dyn FnMut()>>,
}

impl Hook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut() + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    /// Run every subscriber in registration order
    pub fn invoke(&mut self) {
        for subscriber in &mut self.subscribers {
            subscriber();
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
