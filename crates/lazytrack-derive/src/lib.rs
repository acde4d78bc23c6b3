//! Derives for lazytrack model types.
//!
//! `#[derive(Node)]` makes a struct walkable; `#[derive(Trackable)]` also
//! implements the tracking capability over the field marked
//! `#[track(status)]` and generates recorded `set_<field>` setters.
//!
//! Field markers under `#[track(...)]`:
//! - `status`: the `TrackingStatus` field
//! - `skip`: cycle breaker, never traversed
//! - `transient`, `force`: transient attributes are skipped unless forced
//! - `shared`: value owned elsewhere, never traversed
//! - `composition`: counts towards the owner's dirty state
//! - `immutable`: value holds no nodes
//! - `no_setter`: no generated setter
//! - `lazy = "Factory"`: `Lazy<T>` slot resolved through `Factory`

use proc_macro::TokenStream;

mod input;
mod node;
mod shape;
mod trackable;
mod util;

#[proc_macro_derive(Node, attributes(track))]
pub fn derive_node(input: TokenStream) -> TokenStream {
    node::derive_node(input.into()).into()
}

#[proc_macro_derive(Trackable, attributes(track))]
pub fn derive_trackable(input: TokenStream) -> TokenStream {
    node::derive_trackable(input.into()).into()
}
