//! Jadeite - Jade to Django template compiler
//!
//! Compiles a Jade document tree into Django template source. Parsing is
//! left to the caller, who hands the compiler a tree of [`tree::Node`].
//!
//! # Examples
//!
//! ```
//! use jadeite::tree::{Block, Tag};
//!
//! let root = Block::new([
//!     Tag::new("h1").with_text("Hello, #{user.name}"),
//! ]);
//!
//! assert_eq!(
//!     jadeite::compile(&root.into()).unwrap(),
//!     "\n<h1>Hello, {{user.name|escape}}</h1>"
//! );
//! ```
mod compile;
mod engine;
pub mod filter;
pub mod options;
mod pipe;
mod region;
mod report;

pub use crate::{
    compile::{
        base, make_relative, tree, walk, Compiler, Django, Interpolator, Parse, State, Visit,
        AUTOCLOSE,
    },
    engine::Engine,
    options::{Options, Settings},
    pipe::Pipe,
    region::Region,
    report::{Error, ErrorKind, Pointer, Visual},
};

/// Compile the tree rooted at `root` into Django template source.
///
/// Provides a shortcut to compile with the default options, without
/// creating an [`Engine`].
///
/// # Errors
///
/// Returns an [`Error`] when the tree uses something the compiler cannot
/// express, such as a mixin call with a block.
pub fn compile(root: &tree::Node) -> Result<String, Error> {
    Engine::default().compile(root, serde_json::Value::Null)
}
