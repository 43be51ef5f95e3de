//! Serialisable descriptions of assembled programs.

use anyhow::{Result, anyhow, ensure};
use ortho_command::{Descriptor, Method, Param, Program, ShapeDescription};
use rstest::rstest;
use serde_json::Value;

fn add(urls: Vec<String>, name: String, tags: Vec<String>) {
    let _ = (urls, name, tags);
}

fn program() -> Program {
    Program::new("app")
        .description("Manage remotes")
        .member(
            Method::new("remote_add", add)
                .marker(Descriptor::command().name("remote add").alias("new"))
                .param(
                    Param::<Vec<String>>::new("urls")
                        .marker(Descriptor::option().name("url").arity(1..=2)),
                )
                .param(Param::<String>::new("name").marker(Descriptor::argument()))
                .param(Param::<Vec<String>>::new("tags").marker(Descriptor::argument())),
        )
}

#[rstest]
fn descriptions_mirror_the_tree() -> Result<()> {
    let description = program().build()?.describe();
    ensure!(description.name == "app", "unexpected root: {description:?}");
    ensure!(
        description.description.as_deref() == Some("Manage remotes"),
        "program descriptions apply to the root"
    );
    let remote = description
        .find("remote")
        .ok_or_else(|| anyhow!("implicit group is present"))?;
    ensure!(
        remote.handler.is_none() && remote.description.is_none(),
        "implicit groups carry nothing: {remote:?}"
    );
    let add = description
        .find("remote new")
        .ok_or_else(|| anyhow!("aliases resolve"))?;
    ensure!(add.path == "remote add", "unexpected path: {}", add.path);
    ensure!(add.handler.as_deref() == Some("remote_add"), "handler is recorded");

    let url = add.option("--url").ok_or_else(|| anyhow!("--url is declared"))?;
    ensure!(
        url.value.shape == ShapeDescription::Many
            && url.value.min == Some(1)
            && url.value.max == Some(2),
        "unexpected option: {url:?}"
    );
    let names: Vec<&str> = add.arguments.iter().map(|arg| arg.name.as_str()).collect();
    ensure!(names == ["name", "tags"], "unexpected arguments: {names:?}");
    Ok(())
}

#[rstest]
fn descriptions_render_as_json() -> Result<()> {
    let json: Value = serde_json::from_str(&program().build()?.describe().to_json()?)?;
    let option = json
        .pointer("/subcommands/0/subcommands/0/options/0")
        .ok_or_else(|| anyhow!("--url is serialised"))?;
    ensure!(
        option.pointer("/flag").and_then(Value::as_str) == Some("--url"),
        "unexpected option: {option}"
    );
    ensure!(
        option.pointer("/value/shape").and_then(Value::as_str) == Some("many"),
        "unexpected shape: {option}"
    );
    ensure!(
        option
            .pointer("/value/type")
            .and_then(Value::as_str)
            .is_some_and(|name| name.contains("Vec")),
        "unexpected type: {option}"
    );
    Ok(())
}

#[rstest]
fn arity_bounds_limit_values() -> Result<()> {
    let app = program().build()?;
    let (mut out, mut err) = (Vec::new(), Vec::new());
    let accepted = app.run(
        ["app", "remote", "add", "--url", "a", "b", "origin", "x", "y"],
        &mut out,
        &mut err,
    )?;
    ensure!(accepted == 0, "two values fit the arity");
    let rejected = app.run(["app", "remote", "add", "origin", "--url"], &mut out, &mut err)?;
    ensure!(rejected == 2, "--url needs at least one value");
    Ok(())
}
