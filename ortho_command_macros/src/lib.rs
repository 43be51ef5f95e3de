//! Attribute macros for `ortho_command`.
//!
//! Each macro leaves the annotated item in place and emits a hidden,
//! same-named braced struct implementing `ortho_command::Declared`. Braced
//! structs live only in the type namespace, so the generated type never
//! clashes with the function or static it describes, and programs register
//! it with `Program::register::<item_name>()`.
//!
//! - `#[command(..)]` and `#[root(..)]` mark free functions (sync or
//!   `async`) as handlers. Parameter attributes `#[option(..)]`,
//!   `#[argument(..)]` and `#[default(expr)]` are consumed by the handler
//!   macro.
//! - `#[option(..)]` on a `static` of type `GlobalCell<T>` declares a
//!   global option; on a `const` it declares read-only storage.
//!
//! Marker keys: `name`, `help_name`, `alias`, `aliases = [..]`,
//! `description`, `hidden`, `required` and `arity = expr`, subject to what
//! each marker kind accepts. Without `description`, the first paragraph of
//! the item's doc comment is used.

use proc_macro::TokenStream;

mod expand;
mod literals;
mod markers;

use markers::Kind;

/// Marks a free function as a command handler.
#[proc_macro_attribute]
pub fn command(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand::handler(Kind::Command, attr.into(), item.into())
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Marks a free function as the root command handler.
#[proc_macro_attribute]
pub fn root(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand::handler(Kind::Root, attr.into(), item.into())
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Declares a global option backed by a `static` or `const`.
#[proc_macro_attribute]
pub fn option(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand::global(attr.into(), item.into())
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
