use crate::{
    compile::{tree::Node, Django, Parse, Visit},
    filter::{register_defaults, Filter, Registry},
    options::{resolve, Options, Settings},
    report::{error_non_utf8_origin, Error, ErrorKind, INVALID_ENCODING},
};
use camino::Utf8Path;
use log::trace;
use serde_json::Value;
use std::{path::Path, sync::Arc};

/// Compiles trees into Django template source against one hosting
/// environment, and provides storage for filters.
///
/// The filter registry is shared by every compilation, so an [`Engine`]
/// should be created once and populated before templates are compiled.
pub struct Engine {
    settings: Settings,
    filters: Arc<Registry>,
}

impl Engine {
    /// Create a new [`Engine`] for the given hosting environment.
    ///
    /// Filters that depend on the environment, such as `markdown`, are
    /// registered when the environment supports them.
    pub fn new(settings: Settings) -> Self {
        let filters = Registry::new();
        register_defaults(&filters, &settings);

        Self {
            settings,
            filters: Arc::new(filters),
        }
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[inline]
    pub fn filters(&self) -> &Registry {
        &self.filters
    }

    /// Add a [`Filter`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the name is invalid or already registered.
    ///
    /// # Examples
    ///
    /// ```
    /// use jadeite::{tree, Engine, Error};
    ///
    /// fn upper(text: &str, _: &tree::Filter) -> Result<String, Error> {
    ///     Ok(text.to_uppercase())
    /// }
    ///
    /// let engine = Engine::default();
    /// assert!(engine.add_filter("upper", upper).is_ok());
    /// assert!(engine.add_filter("upper", upper).is_err());
    /// ```
    #[inline]
    pub fn add_filter<T>(&self, name: &str, filter: T) -> Result<(), Error>
    where
        T: Filter + 'static,
    {
        self.filters.add_filter(name, filter)
    }

    /// Register a [`Filter`], replacing any `Filter` with the same name.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the name is invalid.
    #[inline]
    pub fn register<T>(&self, name: &str, filter: T) -> Result<(), Error>
    where
        T: Filter + 'static,
    {
        self.filters.register(name, filter)
    }

    /// Add a [`Filter`].
    ///
    /// Returns the [`Engine`], so additional methods may be chained.
    ///
    /// # Errors
    ///
    /// Fails for the same reasons as [`add_filter`][Engine::add_filter].
    #[inline]
    pub fn with_filter<T>(self, name: &str, filter: T) -> Result<Self, Error>
    where
        T: Filter + 'static,
    {
        self.add_filter(name, filter)?;
        Ok(self)
    }

    /// Resolve `options` against the defaults and the settings overrides.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the options cannot be resolved, see
    /// [`resolve`].
    #[inline]
    pub fn options(&self, options: Value) -> Result<Options, Error> {
        resolve(&self.settings, options)
    }

    /// Return a [`Django`] compiler using the given options.
    pub fn compiler(&self, options: Options) -> Django {
        Django::new(
            options,
            self.filters.clone(),
            self.settings.template_dirs.clone(),
        )
    }

    /// Compile the tree rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the options cannot be resolved, or the tree
    /// uses something the compiler cannot express.
    ///
    /// # Examples
    ///
    /// ```
    /// use jadeite::{tree::{Block, Code}, Engine};
    /// use serde_json::json;
    ///
    /// let root = Block::new([Code::escaped(" user.name")]).into();
    /// let output = Engine::default().compile(&root, json!({ "pretty": false }));
    ///
    /// assert_eq!(output.unwrap(), "{{user.name|force_escape}}");
    /// ```
    pub fn compile(&self, root: &Node, options: Value) -> Result<String, Error> {
        let options = self.options(options)?;
        self.compile_with(root, options)
    }

    /// Compile the tree rooted at `root` with options that are already
    /// resolved.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the tree uses something the compiler cannot
    /// express.
    pub fn compile_with(&self, root: &Node, options: Options) -> Result<String, Error> {
        trace!("compiling {}", describe(&options));
        self.compiler(options).compile(root)
    }

    /// Decode raw template source, parse it and compile it.
    ///
    /// This is the seam for a host's template loader: `origin` is the path
    /// of the file the source was read from, and `parser` turns the decoded
    /// text into a tree.
    ///
    /// Errors are annotated with the origin, and with a pointer into the
    /// source when the failing node knows where it came from.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] of kind [`Encoding`][ErrorKind::Encoding] when
    /// the source cannot be decoded, of kind
    /// [`Configuration`][ErrorKind::Configuration] when `origin` is not valid
    /// utf-8, or whatever `Error` parsing or compilation returns.
    ///
    /// # Examples
    ///
    /// ```
    /// use jadeite::{tree::{Include, Node}, Engine, Error, Settings};
    /// use std::path::Path;
    ///
    /// let engine = Engine::new(Settings::new().with_template_dir("/site/templates"));
    /// let parser = |source: &str| -> Result<Node, Error> {
    ///     Ok(Include::new(source.trim_start_matches("include ")).into())
    /// };
    /// let output = engine.templatize(
    ///     b"include ../partials/nav",
    ///     Path::new("/site/templates/pages/home.jade"),
    ///     &parser,
    /// );
    ///
    /// assert_eq!(output.unwrap(), "{% include \"partials/nav.jade\" %}");
    /// ```
    pub fn templatize<P>(&self, source: &[u8], origin: &Path, parser: &P) -> Result<String, Error>
    where
        P: Parse + ?Sized,
    {
        let origin = Utf8Path::from_path(origin)
            .ok_or_else(|| error_non_utf8_origin(origin).with_name(origin.display().to_string()))?;
        let name = origin.to_string();
        let text = self.decode(source).map_err(|e| e.with_name(name.as_str()))?;

        let mut options = self.options(Value::Null)?;
        options.origin = Some(origin.to_owned());
        options.filename = Some(name.clone());

        parser
            .parse(text)
            .and_then(|root| self.compile_with(&root, options))
            .map_err(|e| e.with_source(text).with_name(name))
    }

    /// Decode `source` with the configured charset.
    fn decode<'a>(&self, source: &'a [u8]) -> Result<&'a str, Error> {
        let charset = &self.settings.file_charset;
        if !matches!(charset.to_ascii_lowercase().as_str(), "utf-8" | "utf8") {
            return Err(
                Error::build(ErrorKind::Encoding, INVALID_ENCODING).with_help(format!(
                    "cannot decode source with charset `{charset}`, only utf-8 is supported"
                )),
            );
        }

        std::str::from_utf8(source)
            .map(|text| text.strip_prefix('\u{feff}').unwrap_or(text))
            .map_err(|e| {
                Error::build(ErrorKind::Encoding, INVALID_ENCODING).with_help(format!(
                    "source is not valid utf-8, decoding failed after byte {}",
                    e.valid_up_to()
                ))
            })
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

fn describe(options: &Options) -> String {
    match &options.origin {
        Some(origin) => origin.to_string(),
        None => "template without origin".into(),
    }
}
