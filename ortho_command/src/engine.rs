//! Rendering the command tree onto clap, the parsing engine.
//!
//! [`render`] produces a bare [`Command`]; startup hooks may then adjust it
//! through [`EngineBuilder`] before [`EngineBuilder::finish`] applies the
//! engine settings.

use clap::Command;
use tracing::debug;

use crate::tree::{CommandTree, NodeId};

/// Engine behaviour toggled by startup hooks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineSettings {
    help: bool,
    version: bool,
    report_parse_errors: bool,
    cancel_on_termination: bool,
}

impl EngineSettings {
    /// Settings applied when no builder-taking hook is registered.
    #[must_use]
    pub const fn defaults() -> Self {
        Self {
            help: true,
            version: true,
            report_parse_errors: true,
            cancel_on_termination: true,
        }
    }

    /// Everything off; the starting point for builder-taking hooks.
    #[must_use]
    pub const fn bare() -> Self {
        Self {
            help: false,
            version: false,
            report_parse_errors: false,
            cancel_on_termination: false,
        }
    }

    /// Whether `-h`/`--help` is available.
    #[must_use]
    pub const fn help(&self) -> bool {
        self.help
    }

    /// Whether `-V`/`--version` is available when a version is set.
    #[must_use]
    pub const fn version(&self) -> bool {
        self.version
    }

    /// Whether parse errors are rendered to the error sink.
    #[must_use]
    pub const fn report_parse_errors(&self) -> bool {
        self.report_parse_errors
    }

    /// Whether the host should cancel the running handler on termination
    /// signals.
    #[must_use]
    pub const fn cancel_on_termination(&self) -> bool {
        self.cancel_on_termination
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Mutable engine configuration handed to builder-taking startup hooks.
#[derive(Debug)]
pub struct EngineBuilder {
    settings: EngineSettings,
    command: Command,
    version: Option<String>,
}

impl EngineBuilder {
    pub(crate) const fn new(
        command: Command,
        version: Option<String>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            settings,
            command,
            version,
        }
    }

    /// Restores the default configuration.
    pub fn use_defaults(&mut self) -> &mut Self {
        self.settings = EngineSettings::defaults();
        self
    }

    /// Enables `-h`/`--help`.
    pub fn enable_help(&mut self) -> &mut Self {
        self.settings.help = true;
        self
    }

    /// Enables `-V`/`--version`.
    pub fn enable_version(&mut self) -> &mut Self {
        self.settings.version = true;
        self
    }

    /// Renders parse errors to the error sink instead of returning them.
    pub fn report_parse_errors(&mut self) -> &mut Self {
        self.settings.report_parse_errors = true;
        self
    }

    /// Requests cancellation of running handlers on termination signals.
    pub fn cancel_on_termination(&mut self) -> &mut Self {
        self.settings.cancel_on_termination = true;
        self
    }

    /// Adjusts the rendered command.
    pub fn map_command(&mut self, f: impl FnOnce(Command) -> Command) -> &mut Self {
        let command = std::mem::take(&mut self.command);
        self.command = f(command);
        self
    }

    /// Current settings.
    #[must_use]
    pub const fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// The rendered command.
    #[must_use]
    pub const fn command(&self) -> &Command {
        &self.command
    }

    /// Whether the version switch will be installed.
    pub(crate) const fn reserves_version(&self) -> bool {
        self.settings.version && self.version.is_some()
    }

    pub(crate) fn finish(self) -> (Command, EngineSettings) {
        let Self {
            settings,
            mut command,
            version,
        } = self;
        if !settings.help {
            command = without_help(command);
        }
        command = match version {
            Some(version) if settings.version => command.version(version),
            _ => command.disable_version_flag(true),
        };
        debug!(?settings, "engine configured");
        (command, settings)
    }
}

fn without_help(command: Command) -> Command {
    let names: Vec<String> = command
        .get_subcommands()
        .map(|sub| sub.get_name().to_owned())
        .collect();
    names
        .into_iter()
        .fold(command.disable_help_flag(true), |command, name| {
            command.mut_subcommand(name, without_help)
        })
}

/// Renders `tree` as a clap command.
///
/// Global options are declared once on the root and propagated by clap.
#[must_use]
pub(crate) fn render(tree: &CommandTree) -> Command {
    let root = tree.root();
    let globals = tree
        .node(root)
        .globals
        .iter()
        .map(|global| global.to_arg())
        .collect::<Vec<_>>();
    render_node(tree, root).args(globals)
}

fn render_node(tree: &CommandTree, id: NodeId) -> Command {
    let node = tree.node(id);
    let mut command = Command::new(node.name.clone())
        .disable_help_subcommand(true)
        .hide(node.hidden);
    if !node.aliases.is_empty() {
        command = command.visible_aliases(node.aliases.clone());
    }
    if let Some(description) = &node.description {
        command = command.about(description.clone());
    }
    command = command.args(node.bindings.iter().map(crate::synth::Binding::to_arg));
    if !node.children.is_empty() {
        command = if node.handler.is_some() {
            command.subcommand_negates_reqs(true)
        } else {
            command
                .subcommand_required(true)
                .arg_required_else_help(true)
        };
    }
    command.subcommands(node.children.iter().map(|child| render_node(tree, *child)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(settings: EngineSettings, version: Option<&str>) -> EngineBuilder {
        let command = Command::new("app").subcommand(Command::new("sub"));
        EngineBuilder::new(command, version.map(str::to_owned), settings)
    }

    #[test]
    fn defaults_install_help_and_version() {
        let (command, settings) = builder(EngineSettings::defaults(), Some("1.2.3")).finish();
        assert!(settings.report_parse_errors());
        let err = command
            .try_get_matches_from(["app", "--version"])
            .expect_err("version is a display request");
        assert!(crate::is_display_request(&err));
    }

    #[test]
    fn bare_settings_remove_help_everywhere() {
        let (command, _) = builder(EngineSettings::bare(), Some("1.2.3")).finish();
        assert!(
            command
                .clone()
                .try_get_matches_from(["app", "--help"])
                .is_err()
        );
        let err = command
            .try_get_matches_from(["app", "sub", "--help"])
            .expect_err("help is disabled");
        assert!(!crate::is_display_request(&err));
    }

    #[test]
    fn hooks_can_re_enable_settings() {
        let mut builder = builder(EngineSettings::bare(), None);
        builder
            .enable_help()
            .report_parse_errors()
            .map_command(|command| command.about("configured"));
        assert!(builder.settings().help());
        assert!(!builder.reserves_version());
        let (command, _) = builder.finish();
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("configured".into())
        );
    }
}
