//! Expansion of the handler and global-option macros.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{
    Attribute, Expr, FnArg, Ident, Item, ItemFn, Pat, PatType, StaticMutability, Type, Visibility,
};

use crate::markers::{Kind, Marker};

/// Expands `#[command]` and `#[root]` on a free function.
pub(crate) fn handler(
    kind: Kind,
    attr: TokenStream,
    item: TokenStream,
) -> syn::Result<TokenStream> {
    let mut func: ItemFn = syn::parse2(item)?;
    if !func.sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &func.sig.generics,
            "command handlers cannot be generic",
        ));
    }
    let mut markers = vec![Marker::from_tokens(kind, attr)?.with_doc_fallback(&func.attrs)];
    markers.extend(take_markers(&mut func.attrs, &[Kind::Root, Kind::Command])?);

    let mut params = Vec::new();
    for (position, input) in func.sig.inputs.iter_mut().enumerate() {
        match input {
            FnArg::Receiver(receiver) => {
                return Err(syn::Error::new(
                    receiver.span(),
                    "command handlers must be free functions; `self` is not supported",
                ));
            }
            FnArg::Typed(typed) => params.push(HandlerParam::take(typed, position)?),
        }
    }

    let ident = &func.sig.ident;
    let name = ident.unraw().to_string();
    let handler = if func.sig.asyncness.is_some() {
        let bindings: Vec<&Ident> = params.iter().map(|param| &param.binding).collect();
        let types: Vec<&Type> = params.iter().map(|param| &param.ty).collect();
        quote! {
            |#(#bindings: #types),*| ::ortho_command::Deferred(#ident(#(#bindings),*))
        }
    } else {
        quote!(#ident)
    };
    let descriptors = markers.iter().map(Marker::descriptor);
    let declarations = params.iter().map(HandlerParam::declaration);
    let member = quote! {
        ::ortho_command::Method::new(#name, #handler)
            #(.marker(#descriptors))*
            #(.param(#declarations))*
    };
    let declared = declared(&func.vis, ident, &member);
    Ok(quote! {
        #func
        #declared
    })
}

/// Expands `#[option]` on a `static` or `const`.
pub(crate) fn global(attr: TokenStream, item: TokenStream) -> syn::Result<TokenStream> {
    let mut parsed: Item = syn::parse2(item)?;
    let (attrs, vis, ident, storage) = match &mut parsed {
        Item::Static(storage_item) => {
            if let StaticMutability::Mut(token) = &storage_item.mutability {
                return Err(syn::Error::new_spanned(
                    token,
                    "global options need a `GlobalCell`, not a `static mut`",
                ));
            }
            let ident = storage_item.ident.clone();
            let name = ident.unraw().to_string();
            let storage = quote!(::ortho_command::Global::field(#name, &#ident));
            (&mut storage_item.attrs, storage_item.vis.clone(), ident, storage)
        }
        Item::Const(const_item) => {
            let ident = const_item.ident.clone();
            let name = ident.unraw().to_string();
            let storage = quote!(::ortho_command::Global::getter(#name, || #ident));
            (&mut const_item.attrs, const_item.vis.clone(), ident, storage)
        }
        other => {
            return Err(syn::Error::new_spanned(
                other,
                "#[option] applies to statics, consts and handler parameters",
            ));
        }
    };
    let mut markers = vec![Marker::from_tokens(Kind::Option, attr)?.with_doc_fallback(attrs)];
    markers.extend(take_markers(attrs, &[Kind::Option, Kind::Argument])?);
    let descriptors = markers.iter().map(Marker::descriptor);
    let member = quote! {
        #storage #(.marker(#descriptors))*
    };
    let declared = declared(&vis, &ident, &member);
    Ok(quote! {
        #parsed
        #declared
    })
}

/// Emits the hidden registry type for `ident`.
fn declared(vis: &Visibility, ident: &Ident, member: &TokenStream) -> TokenStream {
    quote! {
        #[doc(hidden)]
        #[allow(
            non_camel_case_types,
            dead_code,
            reason = "registry type named after the declared item"
        )]
        #vis struct #ident {}

        impl ::ortho_command::Declared for #ident {
            fn member() -> ::ortho_command::Member {
                ::ortho_command::Member::from(#member)
            }
        }
    }
}

/// Removes marker attributes of `kinds` from `attrs`, returning them parsed.
fn take_markers(attrs: &mut Vec<Attribute>, kinds: &[Kind]) -> syn::Result<Vec<Marker>> {
    let mut markers = Vec::new();
    let mut kept = Vec::with_capacity(attrs.len());
    for attr in attrs.drain(..) {
        match Kind::of_attr(&attr).filter(|kind| kinds.contains(kind)) {
            Some(kind) => markers.push(Marker::from_attr(kind, &attr)?),
            None => kept.push(attr),
        }
    }
    *attrs = kept;
    Ok(markers)
}

/// One handler parameter with its markers and default.
struct HandlerParam {
    ident: Option<String>,
    binding: Ident,
    ty: Type,
    markers: Vec<Marker>,
    default: Option<Expr>,
}

impl HandlerParam {
    fn take(typed: &mut PatType, position: usize) -> syn::Result<Self> {
        let markers = take_markers(&mut typed.attrs, &[Kind::Option, Kind::Argument])?;
        let mut default = None;
        let mut kept = Vec::with_capacity(typed.attrs.len());
        for attr in typed.attrs.drain(..) {
            if attr.path().is_ident("default") {
                if default.is_some() {
                    return Err(syn::Error::new_spanned(attr, "duplicate #[default]"));
                }
                default = Some(attr.parse_args::<Expr>()?);
            } else {
                kept.push(attr);
            }
        }
        typed.attrs = kept;
        let ident = match typed.pat.as_ref() {
            Pat::Ident(pat) => Some(pat.ident.unraw().to_string()),
            _ => None,
        };
        Ok(Self {
            ident,
            binding: format_ident!("__arg{}", position),
            ty: (*typed.ty).clone(),
            markers,
            default,
        })
    }

    fn declaration(&self) -> TokenStream {
        let ty = &self.ty;
        let constructor = match &self.ident {
            Some(ident) => quote!(::ortho_command::Param::<#ty>::new(#ident)),
            None => quote!(::ortho_command::Param::<#ty>::unnamed()),
        };
        let descriptors = self.markers.iter().map(Marker::descriptor);
        let default = self
            .default
            .as_ref()
            .map(|expr| quote!(.default_with(|| -> #ty { #expr })));
        quote! {
            #constructor
                #(.marker(#descriptors))*
                #default
        }
    }
}
