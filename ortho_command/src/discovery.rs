//! Marker discovery over the registered members.
//!
//! Discovery is a pure scan: it keeps every member carrying exactly one
//! marker of a kind the member can play, rejects members carrying several,
//! and checks each handler's declared parameters against its signature.

use tracing::{debug, trace};

use crate::error::{UsageError, UsageResult};
use crate::globals::Global;
use crate::handler::ErasedHandler;
use crate::marker::{Descriptor, MarkerKind};
use crate::program::{Member, Method, Parameter};
use crate::value::{DefaultProvider, ValueSpec};

/// A handler parameter with its optional marker.
#[derive(Clone)]
pub(crate) struct MarkedParam {
    pub(crate) ident: Option<String>,
    pub(crate) position: usize,
    pub(crate) marker: Option<Descriptor>,
    pub(crate) value: ValueSpec,
    pub(crate) default: Option<DefaultProvider>,
}

/// A handler carrying a root or command marker.
pub(crate) struct CommandMethod {
    pub(crate) ident: String,
    pub(crate) marker: Descriptor,
    pub(crate) params: Vec<MarkedParam>,
    pub(crate) handler: ErasedHandler,
}

/// Global storage carrying an option marker.
pub(crate) struct MarkedGlobal {
    pub(crate) global: Global,
    pub(crate) marker: Descriptor,
}

/// Result of the scan.
pub(crate) struct Discovered {
    pub(crate) program_markers: Vec<Descriptor>,
    pub(crate) commands: Vec<CommandMethod>,
    pub(crate) globals: Vec<MarkedGlobal>,
}

/// Scans program-level markers and members.
///
/// # Errors
///
/// Returns a [`UsageError`] for members with several markers, markers of a
/// kind the member cannot play, and handlers whose declared parameters do
/// not match their signature.
pub(crate) fn discover(
    program_markers: Vec<Descriptor>,
    members: Vec<Member>,
) -> UsageResult<Discovered> {
    for marker in &program_markers {
        ensure_kind("program", marker, &[MarkerKind::Root, MarkerKind::Command])?;
    }
    let mut commands = Vec::new();
    let mut globals = Vec::new();
    for member in members {
        match member {
            Member::Method(method) => {
                if let Some(command) = discover_method(method)? {
                    commands.push(command);
                }
            }
            Member::Global(global) => {
                if let Some(marked) = discover_global(global)? {
                    globals.push(marked);
                }
            }
        }
    }
    debug!(
        program_markers = program_markers.len(),
        commands = commands.len(),
        globals = globals.len(),
        "discovery complete"
    );
    Ok(Discovered {
        program_markers,
        commands,
        globals,
    })
}

fn discover_method(method: Method) -> UsageResult<Option<CommandMethod>> {
    let Method {
        ident,
        markers,
        params,
        handler,
    } = method;
    let Some(marker) = single_marker(&ident, markers)? else {
        trace!(member = %ident, "skipping unmarked method");
        return Ok(None);
    };
    ensure_kind(&ident, &marker, &[MarkerKind::Root, MarkerKind::Command])?;
    check_signature(&ident, &params, &handler)?;
    let params = params
        .into_iter()
        .enumerate()
        .map(|(position, param)| discover_param(&ident, position, param))
        .collect::<UsageResult<Vec<_>>>()?;
    trace!(member = %ident, kind = %marker.kind(), "discovered handler");
    Ok(Some(CommandMethod {
        ident,
        marker,
        params,
        handler,
    }))
}

fn discover_param(method: &str, position: usize, param: Parameter) -> UsageResult<MarkedParam> {
    let Parameter {
        ident,
        markers,
        value,
        default,
    } = param;
    let label = param_label(method, ident.as_deref(), position);
    let marker = single_marker(&label, markers)?;
    if let Some(marker) = &marker {
        ensure_kind(&label, marker, &[MarkerKind::Option, MarkerKind::Argument])?;
    }
    Ok(MarkedParam {
        ident,
        position,
        marker,
        value,
        default,
    })
}

fn discover_global(global: Global) -> UsageResult<Option<MarkedGlobal>> {
    let mut global = global;
    let markers = std::mem::take(&mut global.markers);
    let Some(marker) = single_marker(&global.ident, markers)? else {
        trace!(member = %global.ident, "skipping unmarked global");
        return Ok(None);
    };
    ensure_kind(&global.ident, &marker, &[MarkerKind::Option])?;
    trace!(member = %global.ident, "discovered global option");
    Ok(Some(MarkedGlobal { global, marker }))
}

fn single_marker(member: &str, markers: Vec<Descriptor>) -> UsageResult<Option<Descriptor>> {
    let count = markers.len();
    let mut markers = markers.into_iter();
    match (markers.next(), count) {
        (marker, 0 | 1) => Ok(marker),
        _ => Err(UsageError::MultipleMarkers {
            member: member.to_owned(),
            count,
        }),
    }
}

fn ensure_kind(member: &str, marker: &Descriptor, allowed: &[MarkerKind]) -> UsageResult<()> {
    if allowed.contains(&marker.kind()) {
        Ok(())
    } else {
        Err(UsageError::MisplacedMarker {
            member: member.to_owned(),
            kind: marker.kind(),
        })
    }
}

fn check_signature(member: &str, params: &[Parameter], handler: &ErasedHandler) -> UsageResult<()> {
    let expected = handler.signature();
    if params.len() != expected.len() {
        return Err(UsageError::ParameterCount {
            member: member.to_owned(),
            declared: params.len(),
            expected: expected.len(),
        });
    }
    for (position, (param, tag)) in params.iter().zip(expected).enumerate() {
        if param.value.tag() != *tag {
            return Err(UsageError::ParameterType {
                member: member.to_owned(),
                position,
                declared: param.value.tag().name(),
                expected: tag.name(),
            });
        }
    }
    Ok(())
}

pub(crate) fn param_label(method: &str, ident: Option<&str>, position: usize) -> String {
    ident.map_or_else(
        || format!("{method}(#{position})"),
        |ident| format!("{method}({ident})"),
    )
}
