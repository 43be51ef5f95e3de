//! Programs declared through the attribute macros.

mod common;

use anyhow::{Result, anyhow, ensure};
use common::run;
use ortho_command::{GlobalCell, Program, ShapeDescription, UsageError, command, option, root};
use rstest::rstest;

/// Talk louder.
#[option(alias = "l")]
static LOUD: GlobalCell<bool> = GlobalCell::new(false);

/// Read-only storage cannot back an option.
#[option]
const LEVEL: u8 = 3;

/// Macro-declared test program.
#[root]
fn start() -> i32 {
    100
}

/// Greets someone.
///
/// The count doubles as the exit code.
#[command(aliases = ["hi", "hello"])]
fn greet(
    #[argument(help_name = "WHO")] name: String,
    #[option(name = "times", alias = "t")]
    #[default(1)]
    count: u8,
) -> u8 {
    let _ = name;
    count
}

#[command(name = "wait", hidden)]
async fn pause(seconds: u64) -> Result<i32, std::io::Error> {
    i32::try_from(seconds).map_err(std::io::Error::other)
}

#[command]
fn remote_show(r#type: Option<String>, verbose: bool) -> i32 {
    match (r#type.as_deref(), verbose) {
        (Some("url"), true) => 3,
        (Some("url"), false) => 2,
        (_, true) => 1,
        _ => 0,
    }
}

#[command]
#[root]
fn twice() {}

fn program() -> Program {
    Program::new("app")
        .register::<start>()
        .register::<greet>()
        .register::<pause>()
        .register::<remote_show>()
}

#[rstest]
#[case::root(&[], 100)]
#[case::default_applied(&["greet", "Ada"], 1)]
#[case::renamed_option(&["greet", "Ada", "--times", "4"], 4)]
#[case::option_alias(&["hi", "Ada", "-t", "6"], 6)]
#[case::async_handler(&["wait", "--seconds", "7"], 7)]
#[case::nested_path(&["remote", "show"], 0)]
#[case::raw_identifier(&["remote", "show", "--type", "url"], 2)]
#[case::flag(&["remote", "show", "--type", "url", "--verbose"], 3)]
fn declared_commands_dispatch(#[case] args: &[&str], #[case] expected: i32) -> Result<()> {
    let app = program().build()?;
    let captured = run(&app, args)?;
    ensure!(captured.code == expected, "unexpected result: {captured:?}");
    Ok(())
}

#[rstest]
fn global_flags_reach_storage() -> Result<()> {
    let app = program().register::<LOUD>().build()?;
    run(&app, &["greet", "Ada", "-l"])?;
    ensure!(LOUD.get(), "the flag should be stored");
    Ok(())
}

#[rstest]
fn doc_comments_become_descriptions() -> Result<()> {
    let description = program().register::<LOUD>().build()?.describe();
    ensure!(
        description.description.as_deref() == Some("Macro-declared test program."),
        "unexpected root description: {:?}",
        description.description
    );
    let greet = description
        .find("hello")
        .ok_or_else(|| anyhow!("greet is reachable through its alias"))?;
    ensure!(
        greet.description.as_deref() == Some("Greets someone."),
        "unexpected description: {:?}",
        greet.description
    );
    let loud = description
        .option("--loud")
        .ok_or_else(|| anyhow!("--loud is declared"))?;
    ensure!(
        loud.description.as_deref() == Some("Talk louder.") && loud.aliases == ["-l"],
        "unexpected option: {loud:?}"
    );
    Ok(())
}

#[rstest]
fn parameter_markers_shape_the_surface() -> Result<()> {
    let description = program().build()?.describe();
    let greet = description
        .find("greet")
        .ok_or_else(|| anyhow!("greet is declared"))?;
    let name = greet
        .arguments
        .first()
        .ok_or_else(|| anyhow!("greet takes an argument"))?;
    ensure!(
        name.name == "name" && name.help_name.as_deref() == Some("WHO") && name.required,
        "unexpected argument: {name:?}"
    );
    let times = greet
        .option("-t")
        .ok_or_else(|| anyhow!("--times is reachable through its alias"))?;
    ensure!(
        times.flag == "--times" && times.has_default && !times.required,
        "unexpected option: {times:?}"
    );
    let wait = description
        .find("wait")
        .ok_or_else(|| anyhow!("wait is declared"))?;
    ensure!(wait.hidden, "wait is hidden");
    let verbose = description
        .find("remote show")
        .and_then(|show| show.option("--verbose"))
        .ok_or_else(|| anyhow!("--verbose is declared"))?;
    ensure!(
        verbose.value.shape == ShapeDescription::Flag,
        "unexpected option: {verbose:?}"
    );
    Ok(())
}

#[rstest]
fn const_globals_are_rejected() -> Result<()> {
    let err = program()
        .register::<LEVEL>()
        .build()
        .err()
        .ok_or_else(|| anyhow!("const storage must be rejected"))?;
    ensure!(
        err == UsageError::ReadOnlyGlobal {
            member: "LEVEL".into(),
        },
        "unexpected error: {err}"
    );
    Ok(())
}

#[rstest]
fn stacked_handler_markers_are_rejected() -> Result<()> {
    let err = Program::new("app")
        .register::<twice>()
        .build()
        .err()
        .ok_or_else(|| anyhow!("two markers must be rejected"))?;
    ensure!(
        err == UsageError::MultipleMarkers {
            member: "twice".into(),
            count: 2,
        },
        "unexpected error: {err}"
    );
    Ok(())
}
