//! Mapping between Rust parameter types and parsed command-line values.
//!
//! [`ParameterValue`] describes how one handler parameter type is parsed by
//! clap and read back out of [`ArgMatches`]. [`ValueSpec`] is the erased
//! form stored on bindings so heterogeneous parameters can share one tree.

use std::any::{Any, TypeId};
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use clap::ArgMatches;
use clap::builder::ValueParser;
use clap::parser::{MatchesError, ValueSource};

/// Type-erased parsed value.
pub type AnyValue = Box<dyn Any + Send>;

/// Lazily evaluated fallback value, invoked only when nothing was parsed.
pub type DefaultProvider = Arc<dyn Fn() -> AnyValue + Send + Sync>;

/// Inherent value-count shape of a parameter type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Exactly one value.
    Single,
    /// A presence switch taking no value.
    Flag,
    /// Zero or one value.
    Optional,
    /// Any number of values, collected in order.
    Many,
}

/// Identity of a parameter type used to check handler signatures.
#[derive(Clone, Copy, Debug)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// Tag for `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Fully qualified type name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

/// Element types that clap parses from a single token.
pub trait ScalarValue: Clone + Send + Sync + 'static {
    /// Parser used for each token.
    fn value_parser() -> ValueParser;
}

/// Types accepted as handler parameters and global option storage.
pub trait ParameterValue: Send + 'static + Sized {
    /// Inherent shape of the type.
    const SHAPE: Shape;

    /// Parser used for each token.
    fn value_parser() -> ValueParser;

    /// Reads the value for `id` when the user supplied one.
    ///
    /// # Errors
    ///
    /// Propagates clap's [`MatchesError`] when the stored value has an
    /// unexpected type.
    fn extract(matches: &ArgMatches, id: &str) -> Result<Option<Self>, MatchesError>;

    /// Value used when nothing was supplied and no default is declared.
    ///
    /// `None` means the type has no natural absent value.
    fn absent() -> Option<Self> {
        None
    }
}

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ScalarValue for $ty {
                fn value_parser() -> ValueParser {
                    clap::value_parser!($ty).into()
                }
            }

            impl ParameterValue for $ty {
                const SHAPE: Shape = Shape::Single;

                fn value_parser() -> ValueParser {
                    <Self as ScalarValue>::value_parser()
                }

                fn extract(matches: &ArgMatches, id: &str) -> Result<Option<Self>, MatchesError> {
                    Ok(matches.try_get_one::<Self>(id)?.cloned())
                }
            }
        )*
    };
}

impl_scalar!(
    String, PathBuf, OsString, char, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64
);

impl ScalarValue for bool {
    fn value_parser() -> ValueParser {
        clap::value_parser!(bool).into()
    }
}

impl ParameterValue for bool {
    const SHAPE: Shape = Shape::Flag;

    fn value_parser() -> ValueParser {
        <Self as ScalarValue>::value_parser()
    }

    fn extract(matches: &ArgMatches, id: &str) -> Result<Option<Self>, MatchesError> {
        // `SetTrue` stores `false` as a default; only explicit input counts.
        if matches.value_source(id) == Some(ValueSource::DefaultValue) {
            return Ok(None);
        }
        Ok(matches.try_get_one::<Self>(id)?.copied())
    }

    fn absent() -> Option<Self> {
        Some(false)
    }
}

impl<T: ScalarValue> ParameterValue for Option<T> {
    const SHAPE: Shape = Shape::Optional;

    fn value_parser() -> ValueParser {
        T::value_parser()
    }

    fn extract(matches: &ArgMatches, id: &str) -> Result<Option<Self>, MatchesError> {
        Ok(matches.try_get_one::<T>(id)?.cloned().map(Some))
    }

    fn absent() -> Option<Self> {
        Some(None)
    }
}

impl<T: ScalarValue> ParameterValue for Vec<T> {
    const SHAPE: Shape = Shape::Many;

    fn value_parser() -> ValueParser {
        T::value_parser()
    }

    fn extract(matches: &ArgMatches, id: &str) -> Result<Option<Self>, MatchesError> {
        Ok(matches
            .try_get_many::<T>(id)?
            .map(|values| values.cloned().collect()))
    }

    fn absent() -> Option<Self> {
        Some(Vec::new())
    }
}

type Extractor = fn(&ArgMatches, &str) -> Result<Option<AnyValue>, MatchesError>;

/// Erased description of a [`ParameterValue`] type.
#[derive(Clone, Copy)]
pub struct ValueSpec {
    tag: TypeTag,
    shape: Shape,
    parser: fn() -> ValueParser,
    extract: Extractor,
    absent: fn() -> Option<AnyValue>,
}

impl ValueSpec {
    /// Erases `T`.
    #[must_use]
    pub fn of<T: ParameterValue>() -> Self {
        Self {
            tag: TypeTag::of::<T>(),
            shape: T::SHAPE,
            parser: T::value_parser,
            extract: extract_erased::<T>,
            absent: absent_erased::<T>,
        }
    }

    /// Tag of the erased type.
    #[must_use]
    pub const fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Inherent shape of the erased type.
    #[must_use]
    pub const fn shape(&self) -> Shape {
        self.shape
    }

    /// Whether the type has a natural absent value.
    #[must_use]
    pub fn has_absent(&self) -> bool {
        matches!(self.shape, Shape::Flag | Shape::Optional | Shape::Many)
    }

    pub(crate) fn parser(&self) -> ValueParser {
        (self.parser)()
    }

    pub(crate) fn extract(
        &self,
        matches: &ArgMatches,
        id: &str,
    ) -> Result<Option<AnyValue>, MatchesError> {
        (self.extract)(matches, id)
    }

    pub(crate) fn absent(&self) -> Option<AnyValue> {
        (self.absent)()
    }
}

impl std::fmt::Debug for ValueSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueSpec")
            .field("type", &self.tag.name)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

fn extract_erased<T: ParameterValue>(
    matches: &ArgMatches,
    id: &str,
) -> Result<Option<AnyValue>, MatchesError> {
    Ok(T::extract(matches, id)?.map(|value| Box::new(value) as AnyValue))
}

fn absent_erased<T: ParameterValue>() -> Option<AnyValue> {
    T::absent().map(|value| Box::new(value) as AnyValue)
}
