//! Tests for command tree assembly.

use rstest::rstest;

use super::*;
use crate::discovery::discover;
use crate::error::{UsageError, UsageResult};
use crate::marker::Descriptor;
use crate::program::{Member, Method};
use crate::root;

fn noop() {}

fn command(name: &str) -> Descriptor {
    Descriptor::command().name(name)
}

fn handler(ident: &str, marker: Descriptor) -> Member {
    Method::new(ident.to_owned(), noop).marker(marker).into()
}

fn assemble(groups: Vec<Descriptor>, members: Vec<Member>) -> UsageResult<CommandTree> {
    let found = discover(groups, members)?;
    let plan = root::resolve(found.program_markers, found.commands, None)?;
    build("app", plan)
}

fn names(tree: &CommandTree) -> Vec<String> {
    tree.node_ids().map(|id| tree.label(id)).collect()
}

#[rstest]
#[case::ascending(["a", "a b", "a b c"])]
#[case::descending(["a b c", "a b", "a"])]
#[case::mixed(["a b", "a b c", "a"])]
fn nested_paths_share_parents(#[case] order: [&str; 3]) {
    let members = order
        .iter()
        .enumerate()
        .map(|(index, name)| handler(&format!("h{index}"), command(name)))
        .collect();
    let tree = assemble(vec![], members).expect("tree builds");
    assert_eq!(names(&tree), ["app", "a", "a b", "a b c"]);
    let a = tree.find("a").expect("a exists");
    let b = tree.find("a b").expect("a b exists");
    let c = tree.find("a b c").expect("a b c exists");
    assert_eq!(tree.node(c).parent(), Some(b));
    assert_eq!(tree.node(b).parent(), Some(a));
    assert_eq!(tree.node(a).parent(), Some(tree.root()));
    for id in [a, b, c] {
        assert!(tree.node(id).handler_ident().is_some());
    }
}

#[test]
fn implicit_parents_have_no_description() {
    let tree = assemble(
        vec![],
        vec![
            handler("add", command("remote add").description("Add a remote")),
            handler("list", command("list")),
        ],
    )
    .expect("tree builds");
    let remote = tree.find("remote").expect("implicit parent exists");
    assert_eq!(tree.node(remote).description(), None);
    assert!(tree.node(remote).handler_ident().is_none());
    let add = tree.find("remote add").expect("leaf exists");
    assert_eq!(tree.node(add).description(), Some("Add a remote"));
}

#[test]
fn derived_names_split_on_underscores() {
    let tree = assemble(
        vec![],
        vec![
            handler("take_leave", Descriptor::command()),
            handler("take_stock", Descriptor::command()),
        ],
    )
    .expect("tree builds");
    let take = tree.find("take").expect("parent exists");
    assert_eq!(tree.node(take).children().len(), 2);
    assert!(tree.find("take leave").is_some());
}

#[test]
fn duplicate_paths_fail() {
    let err = assemble(
        vec![],
        vec![handler("one", command("a b")), handler("two", command("a  b"))],
    )
    .err();
    assert_eq!(err, Some(UsageError::DuplicateCommand { path: "a b".into() }));
}

#[test]
fn duplicate_groups_fail() {
    let err = assemble(
        vec![command("g"), command("g")],
        vec![handler("leaf", command("g x"))],
    )
    .err();
    assert_eq!(err, Some(UsageError::DuplicateCommand { path: "g".into() }));
}

#[test]
fn paths_resolve_through_aliases() {
    let tree = assemble(
        vec![],
        vec![
            handler("remote", command("remote").alias("r")),
            handler("add", command("r add")),
        ],
    )
    .expect("tree builds");
    assert_eq!(names(&tree), ["app", "remote", "remote add"]);
    assert_eq!(tree.find("r add"), tree.find("remote add"));
}

#[test]
fn sibling_alias_collisions_fail() {
    let err = assemble(
        vec![],
        vec![handler("a", command("alpha")), handler("b", command("beta").alias("alpha"))],
    )
    .err();
    assert_eq!(
        err,
        Some(UsageError::AliasCollision {
            path: "beta".into(),
            alias: "alpha".into(),
        })
    );
}

#[test]
fn empty_groups_fail_unless_hidden() {
    let err = assemble(vec![command("tools")], vec![handler("run", command("run"))]).err();
    assert_eq!(err, Some(UsageError::EmptyCommand { path: "tools".into() }));

    let tree = assemble(
        vec![command("tools").hidden()],
        vec![handler("run", command("run"))],
    )
    .expect("hidden groups may be empty");
    let tools = tree.find("tools").expect("group exists");
    assert!(tree.node(tools).is_hidden());
}

#[test]
fn groups_describe_their_node() {
    let tree = assemble(
        vec![command("tools").description("Utilities").alias("t")],
        vec![handler("fmt", command("tools fmt"))],
    )
    .expect("tree builds");
    let tools = tree.find("t").expect("group alias resolves");
    assert_eq!(tree.node(tools).description(), Some("Utilities"));
    assert_eq!(tree.node(tools).aliases(), ["t"]);
}

#[test]
fn groups_can_carry_a_handler() {
    let tree = assemble(
        vec![command("tools").description("Utilities")],
        vec![handler("tools", Descriptor::command()), handler("fmt", command("tools fmt"))],
    )
    .expect("tree builds");
    let tools = tree.find("tools").expect("group exists");
    assert_eq!(tree.node(tools).handler_ident(), Some("tools"));
    assert_eq!(tree.node(tools).description(), Some("Utilities"));
}

#[test]
fn root_receives_the_promoted_handler() {
    let tree = assemble(vec![], vec![handler("main", Descriptor::command())]).expect("tree builds");
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.node(tree.root()).handler_ident(), Some("main"));
    assert_eq!(tree.label(tree.root()), "app");
    assert_eq!(tree.path(tree.root()), "");
}
