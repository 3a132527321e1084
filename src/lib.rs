//! # refdom
//!
//! Minimal reactive markup-binding runtime for Rust.
//!
//! No virtual DOM and no diffing: builders return markup plus typed refs,
//! refs resolve exactly once against marker attributes in a cloned template,
//! and every later update is a direct, targeted mutation of the host tree.
//!
//! ## Architecture
//!
//! ```text
//! builder → Controller (markup template + refs)
//!         → Template clone → insert → resolve markers → run effects
//!         → signals drive targeted updates through resolved refs
//! ```
//!
//! Everything is synchronous and single-threaded. State lives in `Rc`
//! handles; signal writes notify watchers before `set` returns, in
//! subscription order.
//!
//! ## Modules
//!
//! - [`signal`] - push-based state cells and action-reducer stores
//! - [`block`] - block lifecycle and the `render` entry point
//! - [`context`] - per-block registration surface (refs, effects, disposers)
//! - [`refs`] - element refs bound through marker attributes
//! - [`list`] - ordered repeated-block lists mutated in place
//! - [`toggle`] - show/hide subtrees without losing their state
//! - [`compose`] - owner-keyed class and style composition
//! - [`dom`] - the in-memory host tree
//!
//! ## Example
//!
//! ```ignore
//! use refdom::{render, ElementUpdate, Node};
//!
//! let container = Node::element("div");
//! let handle = render(&container, |ctx| {
//!     let title = ctx.element();
//!     let title_for_effect = title.clone();
//!     ctx.effect(move || {
//!         let _ = title_for_effect.update(ElementUpdate::new().text("Hi"));
//!     });
//!     format!("<h1 {}></h1>", title.marker())
//! })?;
//! assert_eq!(container.text_content(), "Hi");
//! # Ok::<(), refdom::Error>(())
//! ```

pub mod block;
pub mod callbacks;
pub mod compose;
pub mod context;
pub mod dom;
pub mod error;
pub mod list;
pub mod refs;
pub mod signal;
pub mod template;
pub mod toggle;
pub mod update;

pub use block::{render, render_with, BlockHandle, BlockRef, Controller};
pub use callbacks::{Callbacks, Subscription};
pub use compose::{ClassSpec, OwnerId, StyleSpec};
pub use context::{disposer, Context, Disposer, IntoDisposer};
pub use dom::{EventHandler, Node, PropValue};
pub use error::{Error, Result};
pub use list::{ListInit, ListRef};
pub use refs::ElementRef;
pub use signal::{signal, store, Signal, Store};
pub use template::Template;
pub use toggle::ToggleRef;
pub use update::{update_element, ElementUpdate};

/// Build markup with `format!` syntax. Sugar for templates that interpolate
/// ref markers.
///
/// ```ignore
/// let markup = refdom::markup!("<h1 {}>title</h1>", title.marker());
/// ```
#[macro_export]
macro_rules! markup {
    ($($arg:tt)*) => {
        ::std::format!($($arg)*)
    };
}
