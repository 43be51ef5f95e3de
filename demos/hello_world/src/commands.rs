//! Commands and global options of the demo program.

use std::io::Write;

use ortho_command::{GlobalCell, Program, command, option, root};
use tracing::{debug, info};

use crate::error::{GreetingError, Result};
use crate::message::{farewell, greeting};

/// Explain what the program is doing.
#[option(alias = "v")]
pub static VERBOSE: GlobalCell<bool> = GlobalCell::new(false);

/// Word that opens every greeting.
#[option(help_name = "WORD")]
pub static SALUTATION: GlobalCell<String> = GlobalCell::new(String::new());

fn emit(line: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}")?;
    Ok(())
}

fn narrate(line: &str) -> Result<()> {
    if VERBOSE.get() {
        emit(&format!("[{line}]"))?;
    }
    Ok(())
}

/// Greets the world, or whoever is named.
#[root]
#[expect(clippy::needless_pass_by_value, reason = "handlers own their parsed values")]
fn hello(
    #[argument]
    #[default(String::from("World"))]
    name: String,
) -> Result<()> {
    emit(&greeting(&SALUTATION.get(), &name, "!")?)
}

/// Greets someone with some ceremony.
#[command(aliases = ["hi"])]
#[expect(clippy::needless_pass_by_value, reason = "handlers own their parsed values")]
fn greet(
    #[argument] name: String,
    #[option(alias = "p")]
    #[default(String::from("!"))]
    punctuation: String,
    #[option(alias = "r", help_name = "COUNT")]
    #[default(1)]
    repeat: u8,
) -> Result<()> {
    if repeat == 0 {
        return Err(GreetingError::ZeroRepeat);
    }
    let line = greeting(&SALUTATION.get(), &name, &punctuation)?;
    narrate(&format!("greeting {name} {repeat} time(s)"))?;
    for _ in 0..repeat {
        emit(&line)?;
    }
    info!(%name, repeat, "greeted");
    Ok(())
}

/// Says goodbye, optionally leaving a gift.
#[command]
#[expect(clippy::unused_async, reason = "shows an asynchronous handler")]
async fn take_leave(
    #[argument] name: String,
    #[option(alias = "f")]
    #[default(String::from("Goodbye"))]
    farewell_phrase: String,
    #[option(help_name = "ITEM")] gift: Option<String>,
) -> Result<()> {
    narrate(&format!("taking leave of {name}"))?;
    emit(&farewell(&name, &farewell_phrase, gift.as_deref())?)
}

/// Assembles the demo program.
#[must_use]
pub fn program() -> Program {
    Program::new("hello-world")
        .version(env!("CARGO_PKG_VERSION"))
        .register::<VERBOSE>()
        .register::<SALUTATION>()
        .register::<hello>()
        .register::<greet>()
        .register::<take_leave>()
        .before_invocation(|ctx| {
            debug!(command = %ctx.command_path(), "dispatching");
        })
}
