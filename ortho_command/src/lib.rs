//! Declarative command trees for `clap`.
//!
//! Programs declare their command-line surface by marking plain functions
//! and statics instead of assembling a parser by hand. A [`Program`]
//! collects the declarations (normally emitted by the [`command`],
//! [`root`] and [`option`] attribute macros), validates them, builds a
//! command tree and renders it onto `clap`. At run time the matched
//! command's handler receives typed values and its return value becomes the
//! process exit code.
//!
//! ```
//! use ortho_command::{Descriptor, GlobalCell, Global, Method, Param, Program};
//!
//! static LOUD: GlobalCell<bool> = GlobalCell::new(false);
//!
//! fn greet(name: String, times: u8) -> i32 {
//!     let _ = (name, LOUD.get());
//!     i32::from(times)
//! }
//!
//! let app = Program::new("hello")
//!     .member(Global::field("LOUD", &LOUD).marker(Descriptor::option()))
//!     .member(
//!         Method::new("greet", greet)
//!             .marker(Descriptor::command())
//!             .param(Param::<String>::new("name").marker(Descriptor::argument()))
//!             .param(Param::<u8>::new("times").default_value(1)),
//!     )
//!     .build()
//!     .expect("declarations are valid");
//!
//! let (mut out, mut err) = (Vec::new(), Vec::new());
//! let code = app
//!     .run(["hello", "--loud", "Ada", "--times", "3"], &mut out, &mut err)
//!     .expect("command runs");
//! assert_eq!(code, 3);
//! assert!(LOUD.get());
//! ```

pub use ortho_command_macros::{command, option, root};

mod app;
mod describe;
mod discovery;
mod dispatch;
mod engine;
mod error;
mod globals;
mod handler;
mod marker;
pub mod naming;
mod program;
mod root;
mod synth;
mod tree;
mod value;

pub use app::{App, ExceptionHandler, report_failure};
pub use describe::{
    ArgumentDescription, CommandDescription, OptionDescription, ShapeDescription,
    ValueDescription,
};
pub use dispatch::{InvocationContext, Stage};
pub use engine::{EngineBuilder, EngineSettings};
pub use error::{
    HandlerError, InvocationError, RunError, UsageError, UsageResult, cause_chain,
    is_display_request,
};
pub use globals::{Global, GlobalCell};
pub use handler::{Cancelled, Deferred, ErasedHandler, Handler, IntoOutcome, Outcome, ParsedValues};
pub use marker::{Arity, Descriptor, MarkerKind};
pub use program::{Declared, InvocationHook, Member, Method, Param, Parameter, Program, StartupHook};
pub use synth::{ArgumentBinding, Binding, OptionBinding};
pub use tree::{CommandNode, CommandTree, NodeId};
pub use value::{AnyValue, DefaultProvider, ParameterValue, ScalarValue, Shape, TypeTag, ValueSpec};
