//! Hello world entry point: install diagnostics, build the program and run
//! the command line.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let app = hello_world::program().build()?;
    let code = app.run(
        std::env::args_os(),
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    )?;
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}
