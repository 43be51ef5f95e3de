//! Assembly pipeline and application entry points.

use std::ffi::OsString;
use std::io::Write;

use tracing::{debug, warn};

use crate::describe::CommandDescription;
use crate::dispatch::{self, InvocationContext, Lifecycle};
use crate::engine::{self, EngineBuilder, EngineSettings};
use crate::error::{InvocationError, RunError, UsageResult, cause_chain, is_display_request};
use crate::globals::{self, GlobalInitializer};
use crate::program::{InvocationHook, Program, StartupHook};
use crate::tree::CommandTree;
use crate::{discovery, root, synth, tree};

/// Replaceable handler for invocation failures.
///
/// It receives the failure and the error sink and returns the exit code.
pub type ExceptionHandler = Box<dyn Fn(&InvocationError, &mut dyn Write) -> i32 + Send + Sync>;

impl Program {
    /// Assembles the command tree and configures the engine.
    ///
    /// Runs discovery, root resolution, tree building, option synthesis,
    /// global injection and the startup hooks, in that order.
    ///
    /// # Errors
    ///
    /// Returns the first [`crate::UsageError`] raised along the way; no
    /// commands can be served from a program that fails to build.
    pub fn build(self) -> UsageResult<App> {
        let Self {
            name,
            version,
            description,
            markers,
            members,
            startup,
            before,
            after,
        } = self;

        let discovered = discovery::discover(markers, members)?;
        let plan = root::resolve(
            discovered.program_markers,
            discovered.commands,
            description.as_deref(),
        )?;
        let mut tree = tree::build(&name, plan)?;
        synth::synthesize(&mut tree)?;
        let initializers = globals::inject(&mut tree, discovered.globals)?;

        let settings = if startup.iter().any(StartupHook::takes_builder) {
            EngineSettings::bare()
        } else {
            EngineSettings::defaults()
        };
        let mut builder = EngineBuilder::new(engine::render(&tree), version, settings);
        for hook in startup {
            hook.run(&mut builder);
        }
        synth::check_namespace(&tree, builder.settings().help(), builder.reserves_version())?;
        let (command, settings) = builder.finish();
        debug!(program = %name, commands = tree.len(), "program built");

        Ok(App {
            tree,
            command,
            settings,
            initializers,
            before,
            after,
            exception_handler: Some(Box::new(report_failure)),
        })
    }
}

/// A built program, ready to run command lines.
pub struct App {
    tree: CommandTree,
    command: clap::Command,
    settings: EngineSettings,
    initializers: Vec<GlobalInitializer>,
    before: Vec<InvocationHook>,
    after: Vec<InvocationHook>,
    exception_handler: Option<ExceptionHandler>,
}

impl App {
    /// Parses `args` and runs the matched handler to completion.
    ///
    /// `args` includes the program name, as with
    /// [`std::env::args_os`]. Help and version output is written to `out`;
    /// reported failures go to `err`.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Parse`] when parse-error reporting is disabled,
    /// [`RunError::Invocation`] when the exception handler has been removed,
    /// and [`RunError::Io`] when a sink cannot be written.
    pub fn run<I, T>(
        &self,
        args: I,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<i32, RunError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        futures::executor::block_on(self.run_async(args, out, err))
    }

    /// Asynchronous variant of [`App::run`].
    ///
    /// # Errors
    ///
    /// See [`App::run`].
    pub async fn run_async<I, T>(
        &self,
        args: I,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<i32, RunError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = match self.command.clone().try_get_matches_from(args) {
            Ok(matches) => matches,
            Err(parse_error) => return self.report_parse_error(parse_error, out, err),
        };
        let (command, leaf) = self.tree.resolve_matches(&matches);
        let mut ctx = InvocationContext::new(&self.tree, command, leaf, self.settings);
        let lifecycle = Lifecycle {
            initializers: &self.initializers,
            before: &self.before,
            after: &self.after,
        };
        match dispatch::invoke(&mut ctx, &lifecycle).await {
            Ok(code) => Ok(code),
            Err(failure) => match &self.exception_handler {
                Some(handler) => Ok(handler(&failure, err)),
                None => Err(RunError::Invocation(failure)),
            },
        }
    }

    fn report_parse_error(
        &self,
        parse_error: clap::Error,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<i32, RunError> {
        if is_display_request(&parse_error) {
            write!(out, "{}", parse_error.render())?;
            return Ok(0);
        }
        if !self.settings.report_parse_errors() {
            return Err(RunError::Parse(Box::new(parse_error)));
        }
        write!(err, "{}", parse_error.render())?;
        Ok(parse_error.exit_code())
    }

    /// Replaces the exception handler.
    pub fn set_exception_handler(
        &mut self,
        handler: impl Fn(&InvocationError, &mut dyn Write) -> i32 + Send + Sync + 'static,
    ) {
        self.exception_handler = Some(Box::new(handler));
    }

    /// Removes the exception handler so failures propagate from
    /// [`App::run`] as [`RunError::Invocation`].
    pub fn remove_exception_handler(&mut self) -> Option<ExceptionHandler> {
        self.exception_handler.take()
    }

    /// The assembled command tree.
    #[must_use]
    pub const fn tree(&self) -> &CommandTree {
        &self.tree
    }

    /// The configured clap command.
    #[must_use]
    pub const fn command(&self) -> &clap::Command {
        &self.command
    }

    /// Engine settings in effect.
    #[must_use]
    pub const fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// Serialisable description of the command tree.
    #[must_use]
    pub fn describe(&self) -> CommandDescription {
        CommandDescription::of(&self.tree, self.tree.root())
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("tree", &self.tree)
            .field("settings", &self.settings)
            .field("has_exception_handler", &self.exception_handler.is_some())
            .finish_non_exhaustive()
    }
}

/// Default exception handler.
///
/// Cancellation is swallowed with exit code 0. Any other failure is
/// printed with its cause chain and yields exit code 1.
pub fn report_failure(failure: &InvocationError, sink: &mut dyn Write) -> i32 {
    if failure.is_cancelled() {
        warn!("command cancelled");
        return 0;
    }
    let mut message = format!("error: {failure}\n");
    for cause in cause_chain(failure).skip(1) {
        message.push_str(&format!("  caused by: {cause}\n"));
    }
    if let Err(write_error) = sink.write_all(message.as_bytes()) {
        warn!(error = %write_error, "failed to report command failure");
    }
    1
}
