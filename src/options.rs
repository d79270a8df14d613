//! Compile options and the hosting environment they are resolved against.
//!
//! Options come from three places, lowest priority first: the built-in
//! defaults of [`Options`], the override map of an initialized [`Settings`],
//! and the options passed explicitly to a single compilation.
use crate::report::{Error, INVALID_OPTIONS};
use camino::Utf8PathBuf;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

/// A markdown rendering function supplied by the hosting environment.
pub type Markdown = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Options recognized by the compilers.
///
/// Keys missing from an options map keep their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Path of the file being compiled, used to resolve `extends` and
    /// `include` references.
    ///
    /// Only read from the explicit options of a compilation.
    pub origin: Option<Utf8PathBuf>,
    /// Insert newlines and indentation between tags.
    pub pretty: bool,
    /// Appended to `extends` and `include` paths that have no extension.
    pub extension: String,
    /// Doctype applied before the document declares one.
    pub doctype: Option<String>,
    pub variable_start_string: String,
    pub variable_end_string: String,
    /// Replaces the dialect's auto-close set when present.
    pub autoclose_code: Option<Vec<String>>,
    /// Added to the auto-close set.
    pub extra_autoclose_code: Vec<String>,
    /// Added to the built-in self closing tags.
    pub self_closing: Vec<String>,
    /// Added to the built-in inline tags.
    pub inline_tags: Vec<String>,
    /// Passed to filters as the `filename` attribute.
    pub filename: Option<String>,
    /// Leave dynamic attribute rendering to the runtime helper.
    pub use_runtime: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            origin: None,
            pretty: true,
            extension: ".jade".into(),
            doctype: None,
            variable_start_string: "{{".into(),
            variable_end_string: "}}".into(),
            autoclose_code: None,
            extra_autoclose_code: vec![],
            self_closing: vec![],
            inline_tags: vec![],
            filename: None,
            use_runtime: true,
        }
    }
}

/// The hosting template environment.
///
/// Populate it once at startup, before any compilation begins.
#[derive(Clone)]
pub struct Settings {
    /// When false, `overrides` is ignored during option resolution.
    pub configured: bool,
    /// Compiler option overrides applied to every compilation.
    pub overrides: Map<String, Value>,
    /// Ordered template roots, the first root containing a reference wins.
    pub template_dirs: Vec<Utf8PathBuf>,
    /// Charset used to decode raw template source.
    pub file_charset: String,
    /// Markdown renderer, when the environment provides one.
    pub markdown: Option<Markdown>,
}

impl Settings {
    /// Create uninitialized [`Settings`] with no template roots.
    #[inline]
    pub fn new() -> Self {
        Self {
            configured: false,
            overrides: Map::new(),
            template_dirs: vec![],
            file_charset: "utf-8".into(),
            markdown: None,
        }
    }

    /// Mark the environment as initialized and set the override map.
    ///
    /// # Examples
    ///
    /// ```
    /// use jadeite::Settings;
    /// use serde_json::json;
    ///
    /// let settings = Settings::new().with_overrides(json!({ "pretty": false }));
    /// assert!(settings.configured);
    /// ```
    pub fn with_overrides(mut self, overrides: Value) -> Self {
        self.configured = true;
        if let Value::Object(map) = overrides {
            self.overrides = map;
        }

        self
    }

    /// Append a template root.
    pub fn with_template_dir<T: Into<Utf8PathBuf>>(mut self, dir: T) -> Self {
        self.template_dirs.push(dir.into());
        self
    }

    /// Set the charset used to decode raw template source.
    pub fn with_file_charset<T: Into<String>>(mut self, charset: T) -> Self {
        self.file_charset = charset.into();
        self
    }

    /// Provide a markdown renderer, which enables the `markdown` filter.
    pub fn with_markdown<F>(mut self, markdown: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.markdown = Some(Arc::new(markdown));
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Settings {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("configured", &self.configured)
            .field("overrides", &self.overrides)
            .field("template_dirs", &self.template_dirs)
            .field("file_charset", &self.file_charset)
            .field("markdown", &self.markdown.is_some())
            .finish()
    }
}

/// Merge the default options, the settings overrides and the explicit
/// options, in that order, and deserialize the result.
///
/// `explicit` may be `null` or an object. The `origin` names a single file,
/// so it is ignored in the settings overrides.
///
/// # Errors
///
/// Returns an [`Error`] of kind [`Configuration`][crate::ErrorKind::Configuration]
/// when `explicit` is not an object, or a merged value has the wrong type.
///
/// # Examples
///
/// ```
/// use jadeite::{options::resolve, Settings};
/// use serde_json::json;
///
/// let settings = Settings::new().with_overrides(json!({ "pretty": false, "extension": ".pug" }));
/// let options = resolve(&settings, json!({ "extension": ".html" })).unwrap();
///
/// assert!(!options.pretty);
/// assert_eq!(options.extension, ".html");
/// ```
pub fn resolve(settings: &Settings, explicit: Value) -> Result<Options, Error> {
    let mut merged = match serde_json::to_value(Options::default()) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };

    if settings.configured {
        if settings.overrides.contains_key(ORIGIN) {
            warn!("ignoring `{ORIGIN}` in the settings overrides");
        }
        let overrides = settings.overrides.iter().filter(|(key, _)| *key != ORIGIN);
        merge(&mut merged, overrides);
    }
    match explicit {
        Value::Object(map) => merge(&mut merged, &map),
        Value::Null => {}
        other => {
            return Err(Error::configuration(INVALID_OPTIONS)
                .with_help(format!("options must be an object, found `{other}`")))
        }
    }

    serde_json::from_value(Value::Object(merged))
        .map_err(|e| Error::configuration(INVALID_OPTIONS).with_help(e.to_string()))
}

/// Overwrite keys of `into` with the keys of `from`.
fn merge<'a, I>(into: &mut Map<String, Value>, from: I)
where
    I: IntoIterator<Item = (&'a String, &'a Value)>,
{
    for (key, value) in from {
        into.insert(key.clone(), value.clone());
    }
}

const ORIGIN: &str = "origin";
