//! Handler dispatch, lifecycle hooks and exit-code reporting.

mod common;

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow, ensure};
use common::run;
use ortho_command::{
    App, Cancelled, Deferred, Descriptor, InvocationError, Method, Param, Program, RunError, Stage,
};
use rstest::{fixture, rstest};

fn two() -> i32 {
    2
}

fn quiet() {}

fn failing() -> Result<(), std::io::Error> {
    Err(std::io::Error::other("boom"))
}

fn cancelled() -> Result<i32, Cancelled> {
    Err(Cancelled)
}

fn later() -> Deferred<impl Future<Output = i32> + Send + 'static> {
    Deferred(async { 5 })
}

fn echo(count: u8) -> u8 {
    count
}

fn program() -> Program {
    Program::new("app")
        .version("1.2.3")
        .member(Method::new("two", two).marker(Descriptor::command()))
        .member(Method::new("quiet", quiet).marker(Descriptor::command()))
        .member(Method::new("failing", failing).marker(Descriptor::command()))
        .member(Method::new("cancelled", cancelled).marker(Descriptor::command()))
        .member(Method::new("later", later).marker(Descriptor::command()))
        .member(
            Method::new("remote_echo", echo)
                .marker(Descriptor::command().description("Echo the count"))
                .param(Param::<u8>::new("count").marker(Descriptor::option().alias("c"))),
        )
}

#[fixture]
fn app() -> App {
    program().build().expect("test program is valid")
}

#[rstest]
#[case::code(&["two"], 2)]
#[case::unit(&["quiet"], 0)]
#[case::deferred(&["later"], 5)]
#[case::typed_option(&["remote", "echo", "--count", "9"], 9)]
#[case::option_alias(&["remote", "echo", "-c", "4"], 4)]
fn handlers_set_the_exit_code(
    app: App,
    #[case] args: &[&str],
    #[case] expected: i32,
) -> Result<()> {
    let captured = run(&app, args)?;
    ensure!(captured.code == expected, "unexpected exit code: {captured:?}");
    ensure!(captured.err.is_empty(), "unexpected stderr: {}", captured.err);
    Ok(())
}

#[rstest]
fn failures_are_reported_with_their_causes(app: App) -> Result<()> {
    let captured = run(&app, &["failing"])?;
    ensure!(captured.code == 1, "unexpected exit code: {captured:?}");
    ensure!(
        captured.err == "error: command handler failed\n  caused by: boom\n",
        "unexpected stderr: {}",
        captured.err
    );
    Ok(())
}

#[rstest]
fn cancellation_exits_cleanly(app: App) -> Result<()> {
    let captured = run(&app, &["cancelled"])?;
    ensure!(captured.code == 0, "unexpected exit code: {captured:?}");
    ensure!(captured.err.is_empty(), "unexpected stderr: {}", captured.err);
    Ok(())
}

#[rstest]
fn custom_exception_handlers_choose_the_code(mut app: App) -> Result<()> {
    app.set_exception_handler(|failure, sink| {
        writeln!(sink, "custom: {failure}").map_or(1, |()| 42)
    });
    let captured = run(&app, &["failing"])?;
    ensure!(captured.code == 42, "unexpected exit code: {captured:?}");
    ensure!(captured.err.starts_with("custom: "), "unexpected stderr: {}", captured.err);
    Ok(())
}

#[rstest]
fn removing_the_exception_handler_propagates_failures(mut app: App) -> Result<()> {
    ensure!(app.remove_exception_handler().is_some(), "a default handler is installed");
    match run(&app, &["failing"]) {
        Err(RunError::Invocation(InvocationError::Handler(source))) => {
            ensure!(source.to_string() == "boom", "unexpected source: {source}");
            Ok(())
        }
        other => Err(anyhow!("expected a handler failure, got {other:?}")),
    }
}

#[rstest]
#[case::root_help(&["--help"], "Usage")]
#[case::command_help(&["remote", "echo", "--help"], "Echo the count")]
#[case::version(&["--version"], "1.2.3")]
fn display_requests_go_to_the_output_sink(
    app: App,
    #[case] args: &[&str],
    #[case] expected: &str,
) -> Result<()> {
    let captured = run(&app, args)?;
    ensure!(captured.code == 0, "unexpected exit code: {captured:?}");
    ensure!(captured.out.contains(expected), "unexpected stdout: {}", captured.out);
    ensure!(captured.err.is_empty(), "unexpected stderr: {}", captured.err);
    Ok(())
}

#[rstest]
#[case::unknown_flag(&["two", "--nope"])]
#[case::unknown_command(&["three"])]
#[case::missing_required(&["remote", "echo"])]
#[case::bad_value(&["remote", "echo", "--count", "many"])]
fn parse_errors_go_to_the_error_sink(app: App, #[case] args: &[&str]) -> Result<()> {
    let captured = run(&app, args)?;
    ensure!(captured.code == 2, "unexpected exit code: {captured:?}");
    ensure!(captured.out.is_empty(), "unexpected stdout: {}", captured.out);
    ensure!(!captured.err.is_empty(), "parse errors should be reported");
    Ok(())
}

#[rstest]
fn unreported_parse_errors_are_returned() -> Result<()> {
    let app = program()
        .configure(|engine| {
            engine.enable_help();
        })
        .build()?;
    match run(&app, &["two", "--nope"]) {
        Err(RunError::Parse(_)) => Ok(()),
        other => Err(anyhow!("expected a parse error, got {other:?}")),
    }
}

#[rstest]
fn after_hooks_may_rewrite_the_exit_code() -> Result<()> {
    let app = program()
        .after_invocation(|ctx| {
            if ctx.exit_code() == 2 {
                ctx.set_exit_code(7);
            }
        })
        .build()?;
    ensure!(run(&app, &["two"])?.code == 7, "hook should rewrite the code");
    ensure!(run(&app, &["later"])?.code == 5, "other codes are untouched");
    Ok(())
}

#[rstest]
fn hooks_observe_the_matched_command() -> Result<()> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let before = Arc::clone(&seen);
    let after = Arc::clone(&seen);
    let app = program()
        .before_invocation(move |ctx| {
            if let Ok(mut log) = before.lock() {
                log.push((ctx.stage(), ctx.command_path(), ctx.exit_code()));
            }
        })
        .after_invocation(move |ctx| {
            if let Ok(mut log) = after.lock() {
                log.push((ctx.stage(), ctx.command().name().to_owned(), ctx.exit_code()));
            }
        })
        .build()?;
    run(&app, &["remote", "echo", "--count", "3"])?;
    let log = seen.lock().map_err(|_| anyhow!("hook state poisoned"))?;
    ensure!(
        *log
            == vec![
                (Stage::BeforeHook, "remote echo".to_owned(), 0),
                (Stage::AfterHook, "echo".to_owned(), 3),
            ],
        "unexpected hook observations: {log:?}"
    );
    Ok(())
}

#[rstest]
fn failed_handlers_skip_after_hooks() -> Result<()> {
    let before_ran = Arc::new(AtomicBool::new(false));
    let after_ran = Arc::new(AtomicBool::new(false));
    let before_flag = Arc::clone(&before_ran);
    let after_flag = Arc::clone(&after_ran);
    let app = program()
        .before_invocation(move |_| before_flag.store(true, Ordering::SeqCst))
        .after_invocation(move |_| after_flag.store(true, Ordering::SeqCst))
        .build()?;
    let captured = run(&app, &["failing"])?;
    ensure!(captured.code == 1, "unexpected exit code: {captured:?}");
    ensure!(before_ran.load(Ordering::SeqCst), "before hook should run");
    ensure!(!after_ran.load(Ordering::SeqCst), "after hook must be skipped");
    Ok(())
}

#[rstest]
fn startup_hooks_run_once_at_build() -> Result<()> {
    static STARTED: AtomicUsize = AtomicUsize::new(0);
    let app = program()
        .startup(|| {
            STARTED.fetch_add(1, Ordering::SeqCst);
        })
        .build()?;
    run(&app, &["two"])?;
    run(&app, &["quiet"])?;
    ensure!(STARTED.load(Ordering::SeqCst) == 1, "startup hooks run once");
    ensure!(app.settings().help(), "plain startup hooks keep the defaults");
    Ok(())
}

#[rstest]
fn root_handlers_run_without_a_subcommand() -> Result<()> {
    fn root(name: Option<String>) -> i32 {
        name.map_or(10, |name| i32::try_from(name.len()).unwrap_or(i32::MAX))
    }
    let app = program()
        .member(
            Method::new("root", root)
                .marker(Descriptor::root())
                .param(Param::<Option<String>>::new("name").marker(Descriptor::argument())),
        )
        .build()?;
    ensure!(run(&app, &[])?.code == 10, "root runs without arguments");
    ensure!(run(&app, &["abc"])?.code == 3, "root takes its argument");
    ensure!(run(&app, &["two"])?.code == 2, "subcommands still dispatch");
    Ok(())
}

#[rstest]
fn async_entry_point_matches_the_blocking_one(app: App) -> Result<()> {
    let (mut out, mut err) = (Vec::new(), Vec::new());
    let code =
        futures::executor::block_on(app.run_async(["app", "later"], &mut out, &mut err))?;
    ensure!(code == 5, "unexpected exit code: {code}");
    Ok(())
}
