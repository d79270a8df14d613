use crate::report::{error_unresolved_template, Error};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use log::debug;

/// Rewrite `path`, written relative to the file `origin`, into a path
/// relative to the first of `roots` that contains it.
///
/// Resolution is purely lexical: `.` and `..` are folded without touching
/// the filesystem. The result uses `/` separators and keeps the extension,
/// if any, as written.
///
/// # Errors
///
/// Returns an [`Error`] of kind [`Configuration`][crate::ErrorKind::Configuration]
/// when no root contains the resolved path.
///
/// # Examples
///
/// ```
/// use camino::{Utf8Path, Utf8PathBuf};
/// use jadeite::make_relative;
///
/// let roots = [Utf8PathBuf::from("/proj/templates")];
/// let path = make_relative(Utf8Path::new("/proj/templates/app/page.jade"), "../shared/header", &roots);
///
/// assert_eq!(path.unwrap(), "shared/header");
/// ```
pub fn make_relative(origin: &Utf8Path, path: &str, roots: &[Utf8PathBuf]) -> Result<String, Error> {
    let directory = origin.parent().unwrap_or_else(|| Utf8Path::new(""));
    let absolute = normalize(&directory.join(path));
    debug!("absolute path: {absolute}");

    let (root, relative) = roots
        .iter()
        .find_map(|root| {
            let root = normalize(root);
            let relative = absolute.strip_prefix(&root).ok()?.to_owned();
            Some((root, relative))
        })
        .ok_or_else(|| error_unresolved_template(path, &absolute))?;
    debug!("template root: {root}");

    let relative = to_posix(&relative);
    debug!("relative path: {relative}");

    Ok(relative)
}

/// Fold `.` and `..` components without consulting the filesystem.
///
/// `..` at the root stays at the root, `..` at the start of a relative path
/// is kept.
fn normalize(path: &Utf8Path) -> Utf8PathBuf {
    let mut normalized: Vec<Utf8Component> = vec![];

    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => match normalized.last() {
                Some(Utf8Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Utf8Component::RootDir | Utf8Component::Prefix(_)) => {}
                _ => normalized.push(component),
            },
            _ => normalized.push(component),
        }
    }

    normalized.iter().map(|c| c.as_str()).collect()
}

/// Join the components of a relative path with `/`.
fn to_posix(path: &Utf8Path) -> String {
    let parts: Vec<_> = path.components().map(|c| c.as_str()).collect();

    if parts.is_empty() {
        ".".into()
    } else {
        parts.join("/")
    }
}
