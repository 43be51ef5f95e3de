//! Typed handlers and the normalisation of their return values.
//!
//! Any `Fn` whose parameters implement [`ParameterValue`] and whose return
//! type implements [`IntoOutcome`] is a [`Handler`]. Registration erases the
//! handler so the dispatcher can feed it resolved values in parameter order
//! and receive a tagged [`Outcome`] back.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::error::{HandlerError, InvocationError};
use crate::value::{AnyValue, ParameterValue, TypeTag};

/// Tagged result produced by a handler.
pub enum Outcome {
    /// Completed without an explicit exit code.
    Done,
    /// Completed with an exit code.
    Code(i32),
    /// Completed asynchronously; the future yields the final outcome.
    Deferred(BoxFuture<'static, Result<Self, HandlerError>>),
}

impl Outcome {
    /// Awaits deferred work and returns the exit code.
    ///
    /// # Errors
    ///
    /// Returns the handler's failure when the deferred computation fails.
    pub async fn resolve(self) -> Result<i32, HandlerError> {
        let mut outcome = self;
        loop {
            match outcome {
                Self::Done => return Ok(0),
                Self::Code(code) => return Ok(code),
                Self::Deferred(future) => outcome = future.await?,
            }
        }
    }
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Done => f.write_str("Done"),
            Self::Code(code) => f.debug_tuple("Code").field(code).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Wraps a future so an asynchronous handler can return it.
///
/// `async fn` handlers declared through the attribute macros are wrapped
/// automatically.
#[derive(Debug)]
pub struct Deferred<F>(pub F);

/// Return shapes a handler may produce.
///
/// Types outside this set do not satisfy the [`Handler`] bound, so an
/// unsupported return shape is rejected when the handler is registered.
pub trait IntoOutcome {
    /// Converts the returned value.
    ///
    /// # Errors
    ///
    /// Returns the handler's failure for `Err` results.
    fn into_outcome(self) -> Result<Outcome, HandlerError>;
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Result<Outcome, HandlerError> {
        Ok(Outcome::Done)
    }
}

impl IntoOutcome for i32 {
    fn into_outcome(self) -> Result<Outcome, HandlerError> {
        Ok(Outcome::Code(self))
    }
}

impl IntoOutcome for u8 {
    fn into_outcome(self) -> Result<Outcome, HandlerError> {
        Ok(Outcome::Code(i32::from(self)))
    }
}

impl IntoOutcome for Outcome {
    fn into_outcome(self) -> Result<Outcome, HandlerError> {
        Ok(self)
    }
}

impl<F> IntoOutcome for Deferred<F>
where
    F: Future + Send + 'static,
    F::Output: IntoOutcome,
{
    fn into_outcome(self) -> Result<Outcome, HandlerError> {
        let Self(future) = self;
        Ok(Outcome::Deferred(Box::pin(async move {
            future.await.into_outcome()
        })))
    }
}

impl<T, E> IntoOutcome for Result<T, E>
where
    T: IntoOutcome,
    E: Into<HandlerError>,
{
    fn into_outcome(self) -> Result<Outcome, HandlerError> {
        self.map_err(Into::into)?.into_outcome()
    }
}

/// Cancellation-style failure.
///
/// Handlers return it (directly or as a source) to stop without reporting an
/// error; the default exception handler swallows it and exits with zero.
#[derive(Clone, Copy, Debug, Default, Error, PartialEq, Eq)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Resolved values for one invocation, consumed in parameter order.
pub struct ParsedValues {
    values: std::vec::IntoIter<AnyValue>,
    position: usize,
}

impl ParsedValues {
    pub(crate) fn new(values: Vec<AnyValue>) -> Self {
        Self {
            values: values.into_iter(),
            position: 0,
        }
    }

    /// Takes the next value as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError::ValueType`] when the values are exhausted or
    /// the next value is not a `T`.
    pub fn take<T: 'static>(&mut self) -> Result<T, InvocationError> {
        let position = self.position;
        self.position += 1;
        let mismatch = || InvocationError::ValueType {
            position,
            expected: std::any::type_name::<T>(),
        };
        let value = self.values.next().ok_or_else(mismatch)?;
        value
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| mismatch())
    }
}

/// A function usable as a command handler.
///
/// `Args` is the tuple of parameter types and only exists to keep the
/// blanket implementations apart.
pub trait Handler<Args>: Send + Sync + 'static {
    /// Parameter types in declaration order.
    fn signature() -> Vec<TypeTag>;

    /// Calls the handler with values taken from `values`.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError::ValueType`] for mismatched values and
    /// [`InvocationError::Handler`] when the handler fails.
    fn call(&self, values: &mut ParsedValues) -> Result<Outcome, InvocationError>;
}

impl<F, R> Handler<()> for F
where
    F: Fn() -> R + Send + Sync + 'static,
    R: IntoOutcome,
{
    fn signature() -> Vec<TypeTag> {
        Vec::new()
    }

    fn call(&self, _values: &mut ParsedValues) -> Result<Outcome, InvocationError> {
        self().into_outcome().map_err(InvocationError::Handler)
    }
}

macro_rules! impl_handler {
    ($($ty:ident $arg:ident),+) => {
        impl<F, R, $($ty,)+> Handler<($($ty,)+)> for F
        where
            F: Fn($($ty),+) -> R + Send + Sync + 'static,
            R: IntoOutcome,
            $($ty: ParameterValue,)+
        {
            fn signature() -> Vec<TypeTag> {
                vec![$(TypeTag::of::<$ty>()),+]
            }

            fn call(&self, values: &mut ParsedValues) -> Result<Outcome, InvocationError> {
                $(let $arg = values.take::<$ty>()?;)+
                self($($arg),+).into_outcome().map_err(InvocationError::Handler)
            }
        }
    };
}

impl_handler!(T1 a1);
impl_handler!(T1 a1, T2 a2);
impl_handler!(T1 a1, T2 a2, T3 a3);
impl_handler!(T1 a1, T2 a2, T3 a3, T4 a4);
impl_handler!(T1 a1, T2 a2, T3 a3, T4 a4, T5 a5);
impl_handler!(T1 a1, T2 a2, T3 a3, T4 a4, T5 a5, T6 a6);
impl_handler!(T1 a1, T2 a2, T3 a3, T4 a4, T5 a5, T6 a6, T7 a7);
impl_handler!(T1 a1, T2 a2, T3 a3, T4 a4, T5 a5, T6 a6, T7 a7, T8 a8);
impl_handler!(T1 a1, T2 a2, T3 a3, T4 a4, T5 a5, T6 a6, T7 a7, T8 a8, T9 a9);
impl_handler!(T1 a1, T2 a2, T3 a3, T4 a4, T5 a5, T6 a6, T7 a7, T8 a8, T9 a9, T10 a10);
impl_handler!(T1 a1, T2 a2, T3 a3, T4 a4, T5 a5, T6 a6, T7 a7, T8 a8, T9 a9, T10 a10, T11 a11);
impl_handler!(
    T1 a1, T2 a2, T3 a3, T4 a4, T5 a5, T6 a6, T7 a7, T8 a8, T9 a9, T10 a10, T11 a11, T12 a12
);

type CallFn = dyn Fn(&mut ParsedValues) -> Result<Outcome, InvocationError> + Send + Sync;

/// Type-erased handler with its signature.
#[derive(Clone)]
pub struct ErasedHandler {
    signature: Vec<TypeTag>,
    call: Arc<CallFn>,
}

impl ErasedHandler {
    /// Erases `handler`.
    pub fn new<H, Args>(handler: H) -> Self
    where
        H: Handler<Args>,
    {
        Self {
            signature: H::signature(),
            call: Arc::new(move |values| handler.call(values)),
        }
    }

    /// Parameter types in declaration order.
    #[must_use]
    pub fn signature(&self) -> &[TypeTag] {
        &self.signature
    }

    pub(crate) fn call(&self, values: Vec<AnyValue>) -> Result<Outcome, InvocationError> {
        (self.call)(&mut ParsedValues::new(values))
    }
}

impl std::fmt::Debug for ErasedHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.signature.iter().map(|tag| tag.name()).collect();
        f.debug_struct("ErasedHandler")
            .field("signature", &names)
            .finish_non_exhaustive()
    }
}
