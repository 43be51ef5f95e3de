//! Registry of declared members.
//!
//! A [`Program`] stands in for runtime reflection: every handler, global
//! option and program-level marker is registered explicitly, either by hand
//! through the builder methods or through the code emitted by the attribute
//! macros. [`Program::build`] then assembles the command tree.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::dispatch::InvocationContext;
use crate::engine::EngineBuilder;
use crate::globals::Global;
use crate::handler::{ErasedHandler, Handler};
use crate::marker::Descriptor;
use crate::value::{AnyValue, DefaultProvider, ParameterValue, ValueSpec};

/// Observer notified around each handler invocation.
pub type InvocationHook = Box<dyn Fn(&mut InvocationContext<'_>) + Send + Sync>;

/// Initialisation hook run once while the engine is configured.
pub enum StartupHook {
    /// Parameterless hook; the default engine configuration still applies.
    Plain(Box<dyn FnOnce()>),
    /// Builder-taking hook; disables the default engine configuration.
    Configure(Box<dyn FnOnce(&mut EngineBuilder)>),
}

impl StartupHook {
    pub(crate) fn run(self, builder: &mut EngineBuilder) {
        match self {
            Self::Plain(hook) => hook(),
            Self::Configure(hook) => hook(builder),
        }
    }

    pub(crate) const fn takes_builder(&self) -> bool {
        matches!(self, Self::Configure(_))
    }
}

impl fmt::Debug for StartupHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Plain(_) => "StartupHook::Plain",
            Self::Configure(_) => "StartupHook::Configure",
        })
    }
}

/// A handler parameter after erasure.
#[derive(Clone)]
pub struct Parameter {
    pub(crate) ident: Option<String>,
    pub(crate) markers: Vec<Descriptor>,
    pub(crate) value: ValueSpec,
    pub(crate) default: Option<DefaultProvider>,
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("ident", &self.ident)
            .field("markers", &self.markers)
            .field("value", &self.value)
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

/// Typed builder for one handler parameter.
///
/// ```
/// use ortho_command::{Descriptor, Param, Parameter};
///
/// let count: Parameter = Param::<u8>::new("count")
///     .marker(Descriptor::option().alias("c"))
///     .default_value(2)
///     .into();
/// # let _ = count;
/// ```
pub struct Param<T> {
    ident: Option<String>,
    markers: Vec<Descriptor>,
    default: Option<DefaultProvider>,
    value: PhantomData<fn() -> T>,
}

impl<T: ParameterValue> Param<T> {
    /// Parameter named by its identifier.
    #[must_use]
    pub fn new(ident: impl Into<String>) -> Self {
        Self {
            ident: Some(ident.into()),
            ..Self::unnamed()
        }
    }

    /// Parameter without an identifier, such as a destructuring pattern.
    ///
    /// It needs an explicit marker name to be usable.
    #[must_use]
    pub const fn unnamed() -> Self {
        Self {
            ident: None,
            markers: Vec::new(),
            default: None,
            value: PhantomData,
        }
    }

    /// Attaches a marker.
    #[must_use]
    pub fn marker(mut self, marker: Descriptor) -> Self {
        self.markers.push(marker);
        self
    }

    /// Declares a default value, cloned on each fallback.
    #[must_use]
    pub fn default_value(self, value: T) -> Self
    where
        T: Clone + Sync,
    {
        self.default_with(move || value.clone())
    }

    /// Declares a default value computed on each fallback.
    #[must_use]
    pub fn default_with<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.default = Some(Arc::new(move || Box::new(provider()) as AnyValue));
        self
    }
}

impl<T: ParameterValue> From<Param<T>> for Parameter {
    fn from(param: Param<T>) -> Self {
        Self {
            ident: param.ident,
            markers: param.markers,
            value: ValueSpec::of::<T>(),
            default: param.default,
        }
    }
}

/// A function registered as a potential command handler.
#[derive(Debug)]
pub struct Method {
    pub(crate) ident: String,
    pub(crate) markers: Vec<Descriptor>,
    pub(crate) params: Vec<Parameter>,
    pub(crate) handler: ErasedHandler,
}

impl Method {
    /// Registers `handler` under `ident`.
    ///
    /// The handler is only a command once it carries a root or command
    /// marker; its parameters must then be declared in order with
    /// [`Method::param`].
    pub fn new<H, Args>(ident: impl Into<String>, handler: H) -> Self
    where
        H: Handler<Args>,
    {
        Self {
            ident: ident.into(),
            markers: Vec::new(),
            params: Vec::new(),
            handler: ErasedHandler::new(handler),
        }
    }

    /// Attaches a marker.
    #[must_use]
    pub fn marker(mut self, marker: Descriptor) -> Self {
        self.markers.push(marker);
        self
    }

    /// Declares the next parameter.
    #[must_use]
    pub fn param(mut self, param: impl Into<Parameter>) -> Self {
        self.params.push(param.into());
        self
    }
}

/// A declared program member.
#[derive(Debug)]
pub enum Member {
    /// A handler function.
    Method(Method),
    /// Global option storage.
    Global(Global),
}

impl From<Method> for Member {
    fn from(method: Method) -> Self {
        Self::Method(method)
    }
}

impl From<Global> for Member {
    fn from(global: Global) -> Self {
        Self::Global(global)
    }
}

/// Implemented by the types the attribute macros emit next to each
/// annotated item.
pub trait Declared {
    /// The registry entry for the annotated item.
    fn member() -> Member;
}

/// Declared surface of a command-line program.
///
/// ```
/// use ortho_command::{Descriptor, Method, Param, Program};
///
/// fn greet(name: String) {
///     let _ = name;
/// }
///
/// let app = Program::new("hello")
///     .member(
///         Method::new("greet", greet)
///             .marker(Descriptor::command())
///             .param(Param::<String>::new("name").default_value("World".into())),
///     )
///     .build()
///     .expect("declarations are valid");
/// assert_eq!(app.tree().node(app.tree().root()).name(), "hello");
/// ```
pub struct Program {
    pub(crate) name: String,
    pub(crate) version: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) markers: Vec<Descriptor>,
    pub(crate) members: Vec<Member>,
    pub(crate) startup: Vec<StartupHook>,
    pub(crate) before: Vec<InvocationHook>,
    pub(crate) after: Vec<InvocationHook>,
}

impl Program {
    /// Starts an empty program called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            description: None,
            markers: Vec::new(),
            members: Vec::new(),
            startup: Vec::new(),
            before: Vec::new(),
            after: Vec::new(),
        }
    }

    /// Version reported by `--version`.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Root description used when no root marker supplies one.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a program-level marker.
    ///
    /// A root marker designates the root command; a named command marker
    /// declares a handler-less command group.
    #[must_use]
    pub fn marker(mut self, marker: Descriptor) -> Self {
        self.markers.push(marker);
        self
    }

    /// Adds a member.
    #[must_use]
    pub fn member(mut self, member: impl Into<Member>) -> Self {
        self.members.push(member.into());
        self
    }

    /// Adds the member declared by an attribute macro.
    #[must_use]
    pub fn register<T: Declared>(self) -> Self {
        self.member(T::member())
    }

    /// Adds a parameterless startup hook.
    #[must_use]
    pub fn startup(mut self, hook: impl FnOnce() + 'static) -> Self {
        self.startup.push(StartupHook::Plain(Box::new(hook)));
        self
    }

    /// Adds a startup hook that configures the engine itself.
    ///
    /// Registering any such hook disables the default engine configuration:
    /// help, version and parse-error reporting stay off unless a hook turns
    /// them back on through [`EngineBuilder`].
    #[must_use]
    pub fn configure(mut self, hook: impl FnOnce(&mut EngineBuilder) + 'static) -> Self {
        self.startup.push(StartupHook::Configure(Box::new(hook)));
        self
    }

    /// Adds an observer run before each handler.
    #[must_use]
    pub fn before_invocation(
        mut self,
        hook: impl Fn(&mut InvocationContext<'_>) + Send + Sync + 'static,
    ) -> Self {
        self.before.push(Box::new(hook));
        self
    }

    /// Adds an observer run after each successful handler.
    ///
    /// Observers may overwrite the published exit code.
    #[must_use]
    pub fn after_invocation(
        mut self,
        hook: impl Fn(&mut InvocationContext<'_>) + Send + Sync + 'static,
    ) -> Self {
        self.after.push(Box::new(hook));
        self
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("markers", &self.markers)
            .field("members", &self.members)
            .field("startup", &self.startup)
            .finish_non_exhaustive()
    }
}
