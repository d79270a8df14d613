use super::{Error, ErrorKind};
use camino::Utf8Path;
use std::{fmt::Display, path::Path};

pub const MIXIN_BLOCK_UNSUPPORTED: &str = "mixin blocks are not supported";
pub const MISSING_ORIGIN: &str = "missing origin";
pub const UNRESOLVED_TEMPLATE: &str = "unresolved template path";
pub const UNKNOWN_FILTER: &str = "unknown filter";
pub const INVALID_FILTER: &str = "invalid filter";
pub const INVALID_OPTIONS: &str = "invalid options";
pub const SELF_CLOSING_CONTENT: &str = "self closing tag with content";
pub const INVALID_ENCODING: &str = "invalid encoding";
pub const NON_UTF8_ORIGIN: &str = "origin is not valid utf-8";

/// Return an [`Error`] explaining that the write operation failed.
///
/// This is likely caused by a failure during a `write!` macro operation.
pub fn error_write() -> Error {
    Error::build(ErrorKind::InvalidTemplate, "write failure")
        .with_help("failed to write compiled output, are you low on memory?")
}

/// Return an [`Error`] explaining that a cross-file reference was compiled
/// without knowing which file it came from.
pub fn error_missing_origin<T>(path: T) -> Error
where
    T: Display,
{
    Error::configuration(MISSING_ORIGIN).with_help(format!(
        "cannot resolve `{path}` without an origin, pass the compiled file \
        as the `origin` option"
    ))
}

/// Return an [`Error`] describing a reference that falls outside every
/// configured template root.
pub fn error_unresolved_template(path: &str, absolute: &Utf8Path) -> Error {
    Error::configuration(UNRESOLVED_TEMPLATE).with_help(format!(
        "`{path}` resolves to `{absolute}`, which is not inside any template directory"
    ))
}

/// Return an [`Error`] describing an origin that cannot be used to resolve
/// template paths, because it is not valid utf-8.
pub fn error_non_utf8_origin(origin: &Path) -> Error {
    Error::configuration(NON_UTF8_ORIGIN).with_help(format!(
        "`{}` is not valid utf-8, so references inside it cannot be rewritten",
        origin.display()
    ))
}

/// Return an [`Error`] describing a filter that was never registered.
pub fn error_unknown_filter(name: &str) -> Error {
    Error::build(ErrorKind::UnknownFilter, UNKNOWN_FILTER).with_help(format!(
        "template wants to use the `{name}` filter, but a filter with that name \
        was not registered, did you add it with `.add_filter` or `.register`?"
    ))
}
