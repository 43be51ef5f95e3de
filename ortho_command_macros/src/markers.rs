//! Marker attribute parsing and descriptor emission.

use proc_macro2::TokenStream;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{Attribute, Expr, ExprLit, Lit, LitStr, Meta};

use crate::literals::{flag, lit_str, str_list};

/// Marker kinds recognised by the macros.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Kind {
    Root,
    Command,
    Option,
    Argument,
}

impl Kind {
    const fn label(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Command => "command",
            Self::Option => "option",
            Self::Argument => "argument",
        }
    }

    fn accepts(self, key: &str) -> bool {
        match self {
            Self::Root => key == "description",
            Self::Command => matches!(key, "name" | "alias" | "aliases" | "description" | "hidden"),
            Self::Option => matches!(
                key,
                "name"
                    | "help_name"
                    | "alias"
                    | "aliases"
                    | "description"
                    | "hidden"
                    | "required"
                    | "arity"
            ),
            Self::Argument => matches!(
                key,
                "name" | "help_name" | "description" | "hidden" | "arity"
            ),
        }
    }

    /// Kind named by the last path segment of `attr`, if it is a marker.
    pub(crate) fn of_attr(attr: &Attribute) -> Option<Self> {
        let segment = attr.path().segments.last()?;
        match segment.ident.to_string().as_str() {
            "root" => Some(Self::Root),
            "command" => Some(Self::Command),
            "option" => Some(Self::Option),
            "argument" => Some(Self::Argument),
            _ => None,
        }
    }
}

/// Parsed contents of one marker attribute.
pub(crate) struct Marker {
    kind: Kind,
    name: Option<LitStr>,
    help_name: Option<LitStr>,
    aliases: Vec<LitStr>,
    description: Option<LitStr>,
    hidden: bool,
    required: bool,
    arity: Option<Expr>,
}

impl Marker {
    const fn empty(kind: Kind) -> Self {
        Self {
            kind,
            name: None,
            help_name: None,
            aliases: Vec::new(),
            description: None,
            hidden: false,
            required: false,
            arity: None,
        }
    }

    /// Parses the argument tokens of the macro invocation itself.
    pub(crate) fn from_tokens(kind: Kind, tokens: TokenStream) -> syn::Result<Self> {
        let mut marker = Self::empty(kind);
        let parser = syn::meta::parser(|meta| marker.apply(&meta));
        syn::parse::Parser::parse2(parser, tokens)?;
        Ok(marker)
    }

    /// Parses a sibling or parameter attribute.
    pub(crate) fn from_attr(kind: Kind, attr: &Attribute) -> syn::Result<Self> {
        let mut marker = Self::empty(kind);
        if !matches!(attr.meta, Meta::Path(_)) {
            attr.parse_nested_meta(|meta| marker.apply(&meta))?;
        }
        Ok(marker)
    }

    fn apply(&mut self, meta: &ParseNestedMeta) -> syn::Result<()> {
        let key = meta
            .path
            .get_ident()
            .map(ToString::to_string)
            .unwrap_or_default();
        if !self.kind.accepts(&key) {
            return Err(meta.error(format!(
                "unsupported key for the {} marker",
                self.kind.label()
            )));
        }
        match key.as_str() {
            "name" => self.name = Some(lit_str(meta, "name")?),
            "help_name" => self.help_name = Some(lit_str(meta, "help_name")?),
            "alias" => self.aliases.push(lit_str(meta, "alias")?),
            "aliases" => self.aliases.extend(str_list(meta, "aliases")?),
            "description" => self.description = Some(lit_str(meta, "description")?),
            "hidden" => self.hidden = flag(meta, "hidden")?,
            "required" => self.required = flag(meta, "required")?,
            "arity" => self.arity = Some(meta.value()?.parse::<Expr>()?),
            _ => return Err(meta.error("unsupported marker key")),
        }
        Ok(())
    }

    /// Uses the first doc-comment paragraph when no description was given.
    pub(crate) fn with_doc_fallback(mut self, attrs: &[Attribute]) -> Self {
        if self.description.is_none() {
            self.description = doc_summary(attrs);
        }
        self
    }

    /// Emits the `ortho_command::Descriptor` expression.
    pub(crate) fn descriptor(&self) -> TokenStream {
        let constructor = match self.kind {
            Kind::Root => quote!(root),
            Kind::Command => quote!(command),
            Kind::Option => quote!(option),
            Kind::Argument => quote!(argument),
        };
        let name = self.name.iter();
        let help_name = self.help_name.iter();
        let aliases = &self.aliases;
        let description = self.description.iter();
        let hidden = self.hidden.then(|| quote!(.hidden()));
        let required = self.required.then(|| quote!(.required()));
        let arity = self.arity.iter();
        quote! {
            ::ortho_command::Descriptor::#constructor()
                #(.name(#name))*
                #(.help_name(#help_name))*
                #(.alias(#aliases))*
                #(.description(#description))*
                #hidden
                #required
                #(.arity(#arity))*
        }
    }
}

fn doc_summary(attrs: &[Attribute]) -> Option<LitStr> {
    let mut lines = Vec::new();
    let mut span = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("doc")) {
        let Meta::NameValue(pair) = &attr.meta else {
            continue;
        };
        let Expr::Lit(ExprLit {
            lit: Lit::Str(text),
            ..
        }) = &pair.value
        else {
            continue;
        };
        let line = text.value().trim().to_owned();
        if line.is_empty() {
            if lines.is_empty() {
                continue;
            }
            break;
        }
        span.get_or_insert_with(|| text.span());
        lines.push(line);
    }
    let span = span?;
    Some(LitStr::new(&lines.join(" "), span))
}
