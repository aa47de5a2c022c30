//! A record together with its persistence state.

use std::ops::{Deref, DerefMut};

/// A record plus the `new_item` flag that drives insert-vs-update.
///
/// Instances built with [`Instance::new`] are new until their first
/// successful save; instances hydrated from query results are not.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance<R> {
    record: R,
    new_item: bool,
}

impl<R> Instance<R> {
    /// Wrap a record that has not been stored yet.
    pub fn new(record: R) -> Self {
        Self {
            record,
            new_item: true,
        }
    }

    /// Wrap a record that already exists in storage.
    pub fn existing(record: R) -> Self {
        Self {
            record,
            new_item: false,
        }
    }

    /// True until the first successful save.
    pub fn is_new(&self) -> bool {
        self.new_item
    }

    pub fn record(&self) -> &R {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut R {
        &mut self.record
    }

    pub fn into_inner(self) -> R {
        self.record
    }

    pub(crate) fn mark_saved(&mut self) {
        self.new_item = false;
    }
}

/// A default record is a new one.
impl<R: Default> Default for Instance<R> {
    fn default() -> Self {
        Self::new(R::default())
    }
}

impl<R> Deref for Instance<R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.record
    }
}

impl<R> DerefMut for Instance<R> {
    fn deref_mut(&mut self) -> &mut R {
        &mut self.record
    }
}
