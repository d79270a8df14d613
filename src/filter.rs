//! Contains the `Filter` trait and the `Registry` that compilers consult when
//! a template uses a filter.
//!
//! A filter is any type which implements the [`Filter`][`crate::filter::Filter`]
//! trait. Given this template:
//!
//! ```text
//! :upper
//!   hello, #{name}
//! ```
//!
//! The parser produces a filter node named "upper" holding the text beneath it.
//! During compilation the text is interpolated, so the filter receives
//! `hello, {{name|escape}}`, and whatever the filter returns is written to the
//! output in place of the node.
//!
//! # Examples
//!
//! A plain function matching the trait signature is a filter:
//!
//! ```rust
//! use jadeite::{filter::Registry, tree, Error};
//!
//! fn upper(text: &str, _: &tree::Filter) -> Result<String, Error> {
//!     Ok(text.to_uppercase())
//! }
//!
//! let registry = Registry::new().with_filter("upper", upper).unwrap();
//! let node = tree::Filter::new("upper", ["abc"]);
//!
//! assert_eq!(registry.apply("upper", "abc", &node).unwrap(), "ABC");
//! ```
//!
//! The registry is filled at startup and only read afterwards. Registration
//! takes `&self`, so a registry shared behind an `Arc` can still be extended,
//! at the cost of a write lock.
pub use crate::{
    compile::tree,
    report::{Error, ErrorKind},
};

use crate::{
    options::Settings,
    report::{error_unknown_filter, INVALID_FILTER},
};
use log::{debug, warn};
use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

/// Describes a type which transforms the text beneath a filter node.
pub trait Filter: Sync + Send {
    /// Transform `text`, the interpolated body of `node`.
    fn apply(&self, text: &str, node: &tree::Filter) -> Result<String, Error>;
}

/// Allows registering any function matching the signature of `apply` as a
/// `Filter`, instead of requiring a struct be created.
impl<F> Filter for F
where
    F: Fn(&str, &tree::Filter) -> Result<String, Error> + Sync + Send,
{
    fn apply(&self, text: &str, node: &tree::Filter) -> Result<String, Error> {
        self(text, node)
    }
}

/// Process-wide mapping from filter name to [`Filter`].
#[derive(Default)]
pub struct Registry {
    filters: RwLock<HashMap<String, Arc<dyn Filter>>>,
}

impl Registry {
    /// Create a new, empty [`Registry`].
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a [`Filter`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the name is not a valid filter name, or a
    /// `Filter` with the given name already exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use jadeite::{filter::Registry, tree, Error};
    ///
    /// fn shout(text: &str, _: &tree::Filter) -> Result<String, Error> {
    ///     Ok(format!("{text}!"))
    /// }
    ///
    /// let registry = Registry::new();
    /// assert!(registry.add_filter("shout", shout).is_ok());
    /// assert!(registry.add_filter("shout", shout).is_err());
    /// ```
    pub fn add_filter<T>(&self, name: &str, filter: T) -> Result<(), Error>
    where
        T: Filter + 'static,
    {
        validate_name(name)?;
        if self.contains(name) {
            return Err(Error::filter(INVALID_FILTER).with_help(format!(
                "filter with name `{name}` already exists, overwrite it with `.register`"
            )));
        }
        self.insert(name, filter);

        Ok(())
    }

    /// Register a [`Filter`], replacing any `Filter` with the same name.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the name is not a valid filter name.
    pub fn register<T>(&self, name: &str, filter: T) -> Result<(), Error>
    where
        T: Filter + 'static,
    {
        validate_name(name)?;
        if self.contains(name) {
            warn!("overwriting filter `{name}`");
        }
        self.insert(name, filter);

        Ok(())
    }

    /// Add a [`Filter`].
    ///
    /// Returns the [`Registry`], so additional methods may be chained.
    ///
    /// # Errors
    ///
    /// Fails for the same reasons as [`add_filter`][Registry::add_filter].
    #[inline]
    pub fn with_filter<T>(self, name: &str, filter: T) -> Result<Self, Error>
    where
        T: Filter + 'static,
    {
        self.add_filter(name, filter)?;
        Ok(self)
    }

    /// Return true if a [`Filter`] with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Return the [`Filter`] with the given name, if it exists.
    pub fn get_filter(&self, name: &str) -> Option<Arc<dyn Filter>> {
        self.read().get(name).cloned()
    }

    /// Run the named [`Filter`] over `text`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] of kind [`ErrorKind::UnknownFilter`] when no filter
    /// with that name exists, or whatever `Error` the filter returns.
    pub fn apply(&self, name: &str, text: &str, node: &tree::Filter) -> Result<String, Error> {
        let filter = self
            .get_filter(name)
            .ok_or_else(|| error_unknown_filter(name))?;

        filter.apply(text, node)
    }

    /// Store a filter without validating its name.
    fn insert<T>(&self, name: &str, filter: T)
    where
        T: Filter + 'static,
    {
        debug!("registering filter `{name}`");
        self.filters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_owned(), Arc::new(filter));
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<dyn Filter>>> {
        self.filters.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Return true when the hosting environment can render markdown.
#[inline]
pub fn markdown_support_available(settings: &Settings) -> bool {
    settings.markdown.is_some()
}

/// Register the filters that depend on the hosting environment.
///
/// `markdown` is registered only when the environment provides a renderer,
/// otherwise it is skipped without error.
pub fn register_defaults(registry: &Registry, settings: &Settings) {
    if !markdown_support_available(settings) {
        debug!("markdown support unavailable, skipping `markdown` filter");
        return;
    }
    if let Some(markdown) = settings.markdown.clone() {
        registry.insert(
            "markdown",
            move |text: &str, _: &tree::Filter| -> Result<String, Error> { Ok(markdown(text)) },
        );
    }
}

/// Return a markdown renderer backed by `pulldown-cmark`.
///
/// # Examples
///
/// ```
/// use jadeite::{filter::pulldown_markdown, Settings};
///
/// let settings = Settings::new().with_markdown(pulldown_markdown());
/// ```
#[cfg(feature = "markdown")]
pub fn pulldown_markdown() -> impl Fn(&str) -> String + Send + Sync + 'static {
    |text: &str| {
        let mut html = String::with_capacity(text.len());
        pulldown_cmark::html::push_html(&mut html, pulldown_cmark::Parser::new(text));
        html
    }
}

/// Check that `name` can be written after `:` in a template, meaning an
/// identifier that may also contain `-`.
fn validate_name(name: &str) -> Result<(), Error> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c == '_' || unicode_ident::is_xid_start(c))
        && chars.all(|c| c == '-' || unicode_ident::is_xid_continue(c));

    if valid {
        Ok(())
    } else {
        Err(Error::filter(INVALID_FILTER).with_help(format!(
            "`{name}` is not a valid filter name, use letters, digits, `_` or `-`"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper(text: &str, _: &tree::Filter) -> Result<String, Error> {
        Ok(text.to_uppercase())
    }

    fn lower(text: &str, _: &tree::Filter) -> Result<String, Error> {
        Ok(text.to_lowercase())
    }

    fn node(name: &str) -> tree::Filter {
        tree::Filter::new(name, Vec::<String>::new())
    }

    #[test]
    fn test_apply() {
        let registry = Registry::new().with_filter("upper", upper).unwrap();

        assert_eq!(registry.apply("upper", "abc", &node("upper")).unwrap(), "ABC");
    }

    #[test]
    fn test_unknown() {
        let error = Registry::new()
            .apply("ghost", "abc", &node("ghost"))
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::UnknownFilter);
    }

    #[test]
    fn test_add_duplicate() {
        let registry = Registry::new().with_filter("case", upper).unwrap();

        assert!(registry.add_filter("case", lower).is_err());
    }

    #[test]
    fn test_register_overwrites() {
        let registry = Registry::new().with_filter("case", upper).unwrap();
        registry.register("case", lower).unwrap();

        assert_eq!(registry.apply("case", "AbC", &node("case")).unwrap(), "abc");
    }

    #[test]
    fn test_invalid_names() {
        let registry = Registry::new();

        assert!(registry.register("coffee-script", upper).is_ok());
        assert!(registry.register("", upper).is_err());
        assert!(registry.register("-dash", upper).is_err());
        assert!(registry.register("two words", upper).is_err());
    }

    #[test]
    fn test_markdown_skipped_without_support() {
        let registry = Registry::new();
        register_defaults(&registry, &Settings::new());

        assert!(!registry.contains("markdown"));
    }

    #[test]
    fn test_markdown_registered_with_support() {
        let registry = Registry::new();
        let settings = Settings::new().with_markdown(|text: &str| format!("<p>{text}</p>"));
        register_defaults(&registry, &settings);

        assert_eq!(
            registry.apply("markdown", "hi", &node("markdown")).unwrap(),
            "<p>hi</p>"
        );
    }

    #[cfg(feature = "markdown")]
    #[test]
    fn test_pulldown_markdown() {
        let registry = Registry::new();
        register_defaults(&registry, &Settings::new().with_markdown(pulldown_markdown()));

        assert_eq!(
            registry.apply("markdown", "# Title", &node("markdown")).unwrap(),
            "<h1>Title</h1>\n"
        );
        assert_eq!(
            registry.apply("markdown", "some *emphasis*", &node("markdown")).unwrap(),
            "<p>some <em>emphasis</em></p>\n"
        );
    }

    #[test]
    fn test_filter_error_passes_through() {
        let registry = Registry::new();
        registry
            .register("fail", |_: &str, _: &tree::Filter| -> Result<String, Error> {
                Err(Error::filter("cannot transform"))
            })
            .unwrap();

        let error = registry.apply("fail", "x", &node("fail")).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Filter);
    }
}
