//! Shared helpers for the integration tests.

use ortho_command::{App, RunError};

/// Exit code and captured sinks of one run.
#[derive(Debug)]
pub struct Captured {
    pub code: i32,
    pub out: String,
    pub err: String,
}

/// Runs `args` against `app` with `app` as the program name.
pub fn run(app: &App, args: &[&str]) -> Result<Captured, RunError> {
    let (mut out, mut err) = (Vec::new(), Vec::new());
    let argv = std::iter::once("app").chain(args.iter().copied());
    let code = app.run(argv, &mut out, &mut err)?;
    Ok(Captured {
        code,
        out: String::from_utf8_lossy(&out).into_owned(),
        err: String::from_utf8_lossy(&err).into_owned(),
    })
}
