/// Mutable state of a single compilation.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct State {
    /// Depth of the tag currently being compiled.
    pub indents: usize,
    pub has_compiled_doctype: bool,
    pub has_compiled_tag: bool,
    /// The doctype declaration, once one is known.
    pub doctype: Option<String>,
    /// HTML5 output, boolean attributes are written without a value.
    pub terse: bool,
    /// XML output, self closing tags are not closed implicitly.
    pub xml: bool,
    /// Number of mixins currently being compiled.
    pub mixing: usize,
}

impl State {
    /// Select the doctype with the given name.
    ///
    /// Unknown names become `<!DOCTYPE name>`.
    pub fn set_doctype(&mut self, name: &str) {
        let doctype = lookup_doctype(name)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("<!DOCTYPE {name}>"));

        self.terse = matches!(name, "5" | "html");
        self.xml = doctype.starts_with("<?xml");
        self.doctype = Some(doctype);
    }

    /// Return true while a mixin body is being compiled.
    #[inline]
    pub fn in_mixin(&self) -> bool {
        self.mixing > 0
    }
}

/// Return the declaration of a known doctype.
fn lookup_doctype(name: &str) -> Option<&'static str> {
    let doctype = match name {
        "default" | "5" | "html" => "<!DOCTYPE html>",
        "xml" => r#"<?xml version="1.0" encoding="utf-8" ?>"#,
        "transitional" => {
            r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">"#
        }
        "strict" => {
            r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">"#
        }
        "frameset" => {
            r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Frameset//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-frameset.dtd">"#
        }
        "1.1" => {
            r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">"#
        }
        "basic" => {
            r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML Basic 1.1//EN" "http://www.w3.org/TR/xhtml-basic/xhtml-basic11.dtd">"#
        }
        "mobile" => {
            r#"<!DOCTYPE html PUBLIC "-//WAPFORUM//DTD XHTML Mobile 1.2//EN" "http://www.openmobilealliance.org/tech/DTD/xhtml-mobile12.dtd">"#
        }
        _ => return None,
    };

    Some(doctype)
}
