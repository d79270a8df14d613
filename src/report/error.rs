use super::{Pointer, RED, RESET};
use crate::{region::Region, report::Visual};
use std::fmt::{self, Debug, Display, Formatter};

/// Distinguishes the reasons a compilation can fail.
///
/// Callers match on the kind instead of parsing the reason text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A recognized Jade feature that this compiler deliberately does not
    /// implement, such as a mixin call carrying a body.
    NotSupported,
    /// Missing origin, a cross-file reference outside every template root,
    /// or an options map that cannot be deserialized.
    Configuration,
    /// A filter name that was never registered.
    UnknownFilter,
    /// The document tree describes something the compiler cannot emit,
    /// such as a self-closed tag with content.
    InvalidTemplate,
    /// Raw source could not be decoded with the configured charset.
    Encoding,
    /// Raised by a filter function, or by registering an invalid filter.
    Filter,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NotSupported => write!(f, "not supported"),
            ErrorKind::Configuration => write!(f, "configuration"),
            ErrorKind::UnknownFilter => write!(f, "unknown filter"),
            ErrorKind::InvalidTemplate => write!(f, "invalid template"),
            ErrorKind::Encoding => write!(f, "encoding"),
            ErrorKind::Filter => write!(f, "filter"),
        }
    }
}

/// Describes a compilation failure, and allows adding a contextual help text
/// and visualization.
///
/// # Examples
///
/// ```
/// use jadeite::{Error, ErrorKind, Region};
///
/// let error = Error::build(ErrorKind::NotSupported, "mixin blocks are not supported")
///     .with_pointer("+card(item)\n  p body", Region::new(0..11))
///     .with_name("list.jade")
///     .with_help("move the body into the mixin definition");
///
/// assert_eq!(error.kind(), ErrorKind::NotSupported);
/// ```
///
/// When printed with `println!("{:#}", error)` the [`Error`] produces this output:
///
/// ```text
/// error: mixin blocks are not supported
///  --> list.jade:1:1
///   |
/// 1 | +card(item)
///   | ^^^^^^^^^^^
///   |
///  = help: move the body into the mixin definition
/// ```
pub struct Error {
    /// What went wrong, in a form callers can match on.
    kind: ErrorKind,
    /// Describes the cause of the [`Error`].
    reason: String,
    /// A visualization to help illustrate the [`Error`].
    visual: Option<Box<dyn Visual>>,
    /// Additional information to display with the [`Error`].
    help: Option<String>,
    /// The name of the template that the [`Error`] comes from.
    name: Option<String>,
    /// Location of the offending node, when the parser recorded one.
    region: Option<Region>,
}

impl Error {
    /// Create a new [`Error`] of the given kind with the given reason text.
    ///
    /// The additional fields may be populated using the various methods
    /// defined on `Error`.
    pub fn build<T>(kind: ErrorKind, reason: T) -> Self
    where
        T: Into<String>,
    {
        Error {
            kind,
            reason: reason.into(),
            visual: None,
            help: None,
            name: None,
            region: None,
        }
    }

    /// Create a new [`Error`] of kind [`ErrorKind::NotSupported`].
    #[inline]
    pub fn not_supported<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Self::build(ErrorKind::NotSupported, reason)
    }

    /// Create a new [`Error`] of kind [`ErrorKind::Configuration`].
    #[inline]
    pub fn configuration<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Self::build(ErrorKind::Configuration, reason)
    }

    /// Create a new [`Error`] of kind [`ErrorKind::Filter`].
    ///
    /// Filter functions use this to report that they cannot transform
    /// their input.
    #[inline]
    pub fn filter<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Self::build(ErrorKind::Filter, reason)
    }

    /// Set the name text, which is the name of the template that the
    /// [`Error`] is related to.
    pub fn with_name<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.name = Some(text.into());

        self
    }

    /// Set the [`Visual`], which is a visualization that helps illustrate the
    /// cause of the error.
    pub fn with_visual(mut self, visual: impl Visual + 'static) -> Self {
        self.visual = Some(Box::new(visual));

        self
    }

    /// Set the visualization to a new [`Pointer`] with the given source text and
    /// [`Region`].
    pub fn with_pointer<T>(mut self, source: &str, region: T) -> Self
    where
        T: Into<Region>,
    {
        let region = region.into();
        self.region = Some(region);
        self.visual = Some(Box::new(Pointer::new(source, region)));

        self
    }

    /// Set the help text, which is contextual information to accompany the
    /// reason text.
    pub fn with_help<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.help = Some(text.into());

        self
    }

    /// Remember the location of the node that caused the [`Error`].
    ///
    /// An existing region is kept, so the innermost node wins as the error
    /// travels up the tree.
    pub fn with_region(mut self, region: Option<Region>) -> Self {
        if self.region.is_none() {
            self.region = region;
        }

        self
    }

    /// Attach a [`Pointer`] built from the recorded region, once the source
    /// text is known.
    ///
    /// Nothing happens when no region was recorded, a visual is already set,
    /// or the region does not fit the source.
    pub fn with_source(mut self, source: &str) -> Self {
        if self.visual.is_some() {
            return self;
        }
        if let Some(region) = self.region {
            if region.literal(source).is_some() {
                self.visual = Some(Box::new(Pointer::new(source, region)));
            }
        }

        self
    }

    /// Return the [`ErrorKind`].
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Return the reason text.
    #[inline]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Return the help text, if any.
    #[inline]
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Return the name of the template that the error is related to.
    #[inline]
    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Return the location of the offending node, if known.
    #[inline]
    pub fn region(&self) -> Option<Region> {
        self.region
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if !f.alternate() {
            writeln!(f, "{self:#}")?;
        }
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("reason", &self.reason)
            .field("name", &self.name)
            .field("region", &self.region)
            .field("visual", &self.visual)
            .field("help", &self.help)
            .finish()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let header = format!("{RED}error{RESET}");
        write!(f, "{header}: {}", self.reason)?;

        if let (Some(visual), true) = (&self.visual, f.alternate()) {
            return visual.display(f, self.name.as_deref(), self.help.as_deref());
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.reason == other.reason
            && self.help == other.help
            && self.name == other.name
    }
}
