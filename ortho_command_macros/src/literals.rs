//! Literal parsing helpers for marker attributes.

use syn::meta::ParseNestedMeta;
use syn::{Expr, ExprLit, Lit, LitBool, LitStr, Token};

/// Parses `key = "value"`.
pub(crate) fn lit_str(meta: &ParseNestedMeta, key: &str) -> syn::Result<LitStr> {
    let literal = meta.value()?.parse::<Lit>()?;
    match literal {
        Lit::Str(value) => Ok(value),
        other => Err(syn::Error::new(other.span(), format!("{key} must be a string"))),
    }
}

/// Parses a bare `key` as `true`, or `key = bool`.
pub(crate) fn flag(meta: &ParseNestedMeta, key: &str) -> syn::Result<bool> {
    if !meta.input.peek(Token![=]) {
        return Ok(true);
    }
    let literal = meta.value()?.parse::<Lit>()?;
    match literal {
        Lit::Bool(LitBool { value, .. }) => Ok(value),
        other => Err(syn::Error::new(other.span(), format!("{key} must be a bool"))),
    }
}

/// Parses `key = ["a", "b"]`.
pub(crate) fn str_list(meta: &ParseNestedMeta, key: &str) -> syn::Result<Vec<LitStr>> {
    let array = meta.value()?.parse::<syn::ExprArray>()?;
    array
        .elems
        .into_iter()
        .map(|elem| match elem {
            Expr::Lit(ExprLit {
                lit: Lit::Str(value),
                ..
            }) => Ok(value),
            other => Err(syn::Error::new_spanned(
                other,
                format!("{key} must be a list of strings"),
            )),
        })
        .collect()
}
