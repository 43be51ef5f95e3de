//! Global options backed by process-wide storage.
//!
//! A [`Global`] pairs a late-bound reader with an optional writer. The
//! injector turns each marked global into one shared [`OptionBinding`],
//! attaches it to every command node and registers an initializer that
//! writes the parsed value back before each handler runs.

use std::fmt;
use std::sync::Arc;

use clap::ArgMatches;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::discovery::MarkedGlobal;
use crate::error::{InvocationError, UsageError, UsageResult};
use crate::synth::{OptionBinding, synthesize_option};
use crate::tree::CommandTree;
use crate::value::{AnyValue, DefaultProvider, ParameterValue, ValueSpec};

type Writer = Arc<dyn Fn(AnyValue) -> bool + Send + Sync>;

/// Storage for a global option declared as a `static`.
///
/// ```
/// use ortho_command::GlobalCell;
///
/// static LEVEL: GlobalCell<u8> = GlobalCell::new(1);
/// LEVEL.set(3);
/// assert_eq!(LEVEL.get(), 3);
/// ```
pub struct GlobalCell<T> {
    value: RwLock<T>,
}

impl<T> GlobalCell<T> {
    /// Creates the cell with its initial value.
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self {
            value: parking_lot::const_rwlock(value),
        }
    }

    /// Overwrites the stored value.
    pub fn set(&self, value: T) {
        *self.value.write() = value;
    }

    /// Overwrites the stored value, returning the previous one.
    pub fn replace(&self, value: T) -> T {
        std::mem::replace(&mut *self.value.write(), value)
    }
}

impl<T: Clone> GlobalCell<T> {
    /// Returns a copy of the stored value.
    #[must_use]
    pub fn get(&self) -> T {
        self.value.read().clone()
    }
}

impl<T: fmt::Debug> fmt::Debug for GlobalCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GlobalCell").field(&*self.value.read()).finish()
    }
}

/// Process-wide storage exposed as a global option.
pub struct Global {
    pub(crate) ident: String,
    pub(crate) markers: Vec<crate::Descriptor>,
    pub(crate) value: ValueSpec,
    pub(crate) read: DefaultProvider,
    pub(crate) write: Option<Writer>,
}

impl Global {
    /// Binds a static [`GlobalCell`].
    pub fn field<T>(ident: impl Into<String>, cell: &'static GlobalCell<T>) -> Self
    where
        T: ParameterValue + Clone + Sync,
    {
        Self::property(ident, || cell.get(), |value: T| cell.set(value))
    }

    /// Binds a getter/setter pair.
    pub fn property<T, G, S>(ident: impl Into<String>, get: G, set: S) -> Self
    where
        T: ParameterValue,
        G: Fn() -> T + Send + Sync + 'static,
        S: Fn(T) + Send + Sync + 'static,
    {
        let mut global = Self::getter(ident, get);
        global.write = Some(Arc::new(move |value: AnyValue| {
            value.downcast::<T>().map(|typed| set(*typed)).is_ok()
        }));
        global
    }

    /// Binds read-only storage. Marking it as an option is a usage error.
    pub fn getter<T, G>(ident: impl Into<String>, get: G) -> Self
    where
        T: ParameterValue,
        G: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            ident: ident.into(),
            markers: Vec::new(),
            value: ValueSpec::of::<T>(),
            read: Arc::new(move || Box::new(get()) as AnyValue),
            write: None,
        }
    }

    /// Attaches a marker.
    #[must_use]
    pub fn marker(mut self, marker: crate::Descriptor) -> Self {
        self.markers.push(marker);
        self
    }
}

impl fmt::Debug for Global {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Global")
            .field("ident", &self.ident)
            .field("markers", &self.markers)
            .field("value", &self.value)
            .field("writable", &self.write.is_some())
            .finish()
    }
}

/// Writes one parsed global value back into its storage.
pub(crate) struct GlobalInitializer {
    binding: Arc<OptionBinding>,
    write: Writer,
}

impl GlobalInitializer {
    pub(crate) fn apply(&self, matches: &ArgMatches) -> Result<(), InvocationError> {
        let value = self.binding.resolve(matches)?;
        if (self.write)(value) {
            trace!(option = %self.binding.flag(), "global option written");
            Ok(())
        } else {
            Err(InvocationError::GlobalWrite {
                name: self.binding.flag(),
            })
        }
    }
}

/// Attaches every marked global to every node and returns the initializers
/// in declaration order.
pub(crate) fn inject(
    tree: &mut CommandTree,
    globals: Vec<MarkedGlobal>,
) -> UsageResult<Vec<GlobalInitializer>> {
    let mut initializers = Vec::with_capacity(globals.len());
    for MarkedGlobal { global, marker } in globals {
        let Some(write) = global.write else {
            return Err(UsageError::ReadOnlyGlobal {
                member: global.ident,
            });
        };
        if marker.is_required() {
            return Err(UsageError::RequiredGlobal {
                member: global.ident,
            });
        }
        let mut binding = synthesize_option(
            &global.ident,
            Some(&global.ident),
            Some(&marker),
            global.value,
            Some(global.read),
        )?;
        binding.mark_global();
        let binding = Arc::new(binding);
        for id in tree.node_ids() {
            tree.node_mut(id).globals.push(Arc::clone(&binding));
        }
        debug!(member = %global.ident, option = %binding.flag(), "global option injected");
        initializers.push(GlobalInitializer { binding, write });
    }
    Ok(initializers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_replace_values() {
        let cell = GlobalCell::new(String::from("a"));
        assert_eq!(cell.replace("b".into()), "a");
        assert_eq!(cell.get(), "b");
    }

    #[test]
    fn properties_reject_foreign_values() {
        static SLOT: GlobalCell<u8> = GlobalCell::new(0);
        let global = Global::field("SLOT", &SLOT);
        let write = global.write.expect("fields are writable");
        assert!(write(Box::new(4_u8)));
        assert!(!write(Box::new("four")));
        assert_eq!(SLOT.get(), 4);
    }

    #[test]
    fn reads_are_late_bound() {
        static LATE: GlobalCell<u8> = GlobalCell::new(1);
        let global = Global::field("LATE", &LATE);
        LATE.set(9);
        let value = (global.read)().downcast::<u8>().expect("typed read");
        assert_eq!(*value, 9);
    }

    #[test]
    fn getters_have_no_writer() {
        assert!(Global::getter("LEVEL", || 3_u8).write.is_none());
    }
}
