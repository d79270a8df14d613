pub mod base;
pub mod tree;

mod django;
mod interpolate;
mod path;
mod state;
mod visit;

pub use crate::compile::{
    base::Compiler,
    django::{Django, AUTOCLOSE},
    interpolate::Interpolator,
    path::make_relative,
    state::State,
    visit::{walk, Visit},
};

use crate::report::Error;
use tree::Node;

/// Describes a type which turns Jade source into a tree of [`Node`].
///
/// The compiler never parses on its own, an [`Engine`][crate::Engine] is
/// handed a parser when a file is templatized.
pub trait Parse {
    /// Parse `source` into the root [`Node`] of a document.
    fn parse(&self, source: &str) -> Result<Node, Error>;
}

/// Allows using any function matching the signature of `parse` as a
/// `Parse`, instead of requiring a struct be created.
impl<F> Parse for F
where
    F: Fn(&str) -> Result<Node, Error>,
{
    fn parse(&self, source: &str) -> Result<Node, Error> {
        self(source)
    }
}
