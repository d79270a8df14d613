//! The host-agnostic compiler.
//!
//! [`Compiler`] holds everything a compilation needs, and the functions in
//! this module are the default behavior of every [`Visit`] method. They
//! emit Jinja-flavoured directives, dialects such as
//! [`Django`][crate::Django] replace the parts that differ.
use crate::{
    compile::{interpolate::Interpolator, state::State, tree::*, visit::Visit},
    filter::Registry,
    options::Options,
    pipe::Pipe,
    report::{Error, ErrorKind, MIXIN_BLOCK_UNSUPPORTED, SELF_CLOSING_CONTENT},
};
use std::{borrow::Cow, sync::Arc};

/// Statement keywords that are closed with `end<keyword>` after their body.
pub const AUTOCLOSE: &[&str] = &[
    "if",
    "for",
    "block",
    "filter",
    "autoescape",
    "with",
    "trans",
    "spaceless",
    "comment",
    "cache",
    "macro",
    "localize",
    "compress",
    "raw",
];

const SELF_CLOSING: &[&str] = &["meta", "img", "link", "input", "area", "base", "col", "br", "hr"];

const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "acronym", "b", "br", "code", "em", "font", "i", "img", "ins", "kbd", "map",
    "samp", "small", "span", "strong", "sub", "sup",
];

/// Rewrites variable references before they are interpolated.
pub type VarProcessor = fn(&str) -> Cow<'_, str>;

/// Leave the variable reference untouched.
pub fn identity(val: &str) -> Cow<'_, str> {
    Cow::Borrowed(val)
}

/// Rewrite the gettext shorthand `_ text` into `_("text")`.
///
/// # Examples
///
/// ```
/// use jadeite::base::gettext;
///
/// assert_eq!(gettext("_ Welcome back"), r#"_("Welcome back")"#);
/// assert_eq!(gettext("user.name"), "user.name");
/// ```
pub fn gettext(val: &str) -> Cow<'_, str> {
    match val.strip_prefix("_ ") {
        Some(text) => Cow::Owned(format!("_(\"{text}\")")),
        None => Cow::Borrowed(val),
    }
}

/// State and configuration shared by every [`Visit`] method.
pub struct Compiler {
    pub(crate) options: Options,
    pub(crate) filters: Arc<Registry>,
    pub(crate) state: State,
    pub(crate) autoclose: Vec<String>,
    pub(crate) var_processor: VarProcessor,
    self_closing: Vec<String>,
    inline_tags: Vec<String>,
    interpolator: Interpolator,
}

impl Compiler {
    /// Create a new [`Compiler`] with the default auto-close set.
    #[inline]
    pub fn new(options: Options, filters: Arc<Registry>) -> Self {
        Self::with_autoclose(options, filters, AUTOCLOSE)
    }

    /// Create a new [`Compiler`] whose auto-close set defaults to `defaults`.
    ///
    /// The `autoclose_code` option still replaces the defaults, and
    /// `extra_autoclose_code` extends them.
    pub fn with_autoclose(options: Options, filters: Arc<Registry>, defaults: &[&str]) -> Self {
        let mut autoclose = match &options.autoclose_code {
            Some(keywords) => keywords.clone(),
            None => to_owned(defaults),
        };
        autoclose.extend(options.extra_autoclose_code.iter().cloned());

        let mut self_closing = to_owned(SELF_CLOSING);
        self_closing.extend(options.self_closing.iter().cloned());
        let mut inline_tags = to_owned(INLINE_TAGS);
        inline_tags.extend(options.inline_tags.iter().cloned());

        let state = initial_state(&options);

        Self {
            options,
            filters,
            state,
            autoclose,
            var_processor: identity,
            self_closing,
            inline_tags,
            interpolator: Interpolator::new(),
        }
    }

    /// Discard the state of any previous compilation.
    pub fn reset(&mut self) {
        self.state = initial_state(&self.options);
    }

    /// Set the function that rewrites variable references.
    pub fn with_var_processor(mut self, processor: VarProcessor) -> Self {
        self.var_processor = processor;
        self
    }

    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    #[inline]
    pub fn state(&self) -> &State {
        &self.state
    }

    #[inline]
    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    #[inline]
    pub fn filters(&self) -> &Registry {
        &self.filters
    }

    /// Interpolate `#{}` and `!{}` markers in `text`.
    pub fn interpolate(&self, text: &str, escape: Option<bool>) -> String {
        self.interpolator.interpolate(
            text,
            escape,
            &self.options.variable_start_string,
            &self.options.variable_end_string,
        )
    }

    fn is_inline(&self, tag: &Tag) -> bool {
        tag.inline || self.inline_tags.contains(&tag.name)
    }

    fn is_self_closing(&self, name: &str) -> bool {
        self.self_closing.iter().any(|t| t == name)
    }
}

impl Visit for Compiler {
    fn compiler(&self) -> &Compiler {
        self
    }

    fn compiler_mut(&mut self) -> &mut Compiler {
        self
    }
}

fn initial_state(options: &Options) -> State {
    let mut state = State::default();
    if let Some(doctype) = &options.doctype {
        state.set_doctype(doctype);
    }

    state
}

fn to_owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Return the keyword of a statement, its first whitespace separated token.
pub fn statement_keyword(val: &str) -> &str {
    val.split_whitespace().next().unwrap_or_default()
}

/// Return a variable directive for `val` followed by `filter`.
pub fn variable<V>(visitor: &V, val: &str, filter: &str) -> String
where
    V: Visit + ?Sized,
{
    let options = visitor.compiler().options();
    format!(
        "{}{}{filter}{}",
        options.variable_start_string,
        visitor.process_variable(val),
        options.variable_end_string
    )
}

pub fn visit_block<V>(visitor: &mut V, block: &Block, pipe: &mut Pipe) -> Result<(), Error>
where
    V: Visit + ?Sized,
{
    for node in &block.nodes {
        visitor.visit(node, pipe)?;
    }

    Ok(())
}

pub fn visit_literal<V>(_: &mut V, literal: &Literal, pipe: &mut Pipe) -> Result<(), Error>
where
    V: Visit + ?Sized,
{
    pipe.push(&literal.text)
}

pub fn visit_code_block<V>(visitor: &mut V, block: &CodeBlock, pipe: &mut Pipe) -> Result<(), Error>
where
    V: Visit + ?Sized,
{
    let options = visitor.compiler().options();
    let parent = format!(
        "{}super(){}",
        options.variable_start_string, options.variable_end_string
    );

    code_block(visitor, block, &parent, pipe)
}

/// Emit a `block` directive, with `parent` rendering the content of the
/// parent block.
///
/// Appending blocks render the parent content before the body, prepending
/// blocks after it.
pub fn code_block<V>(
    visitor: &mut V,
    block: &CodeBlock,
    parent: &str,
    pipe: &mut Pipe,
) -> Result<(), Error>
where
    V: Visit + ?Sized,
{
    pipe.push_fmt(format_args!("{{% block {} %}}", block.name))?;
    if block.mode == BlockMode::Append {
        pipe.push(parent)?;
    }
    visitor.visit_block(&block.block, pipe)?;
    if block.mode == BlockMode::Prepend {
        pipe.push(parent)?;
    }

    pipe.push("{% endblock %}")
}

pub fn visit_code<V>(visitor: &mut V, code: &Code, pipe: &mut Pipe) -> Result<(), Error>
where
    V: Visit + ?Sized,
{
    if code.buffer {
        let filter = if code.escape { "|escape" } else { "" };
        pipe.push(&variable(&*visitor, code.val.trim_start(), filter))?;
    } else {
        pipe.push_fmt(format_args!("{{% {} %}}", code.val))?;
    }

    code_body(visitor, code, pipe)
}

/// Visit the body of `code`, then close it when it is a statement whose
/// keyword auto-closes.
pub fn code_body<V>(visitor: &mut V, code: &Code, pipe: &mut Pipe) -> Result<(), Error>
where
    V: Visit + ?Sized,
{
    let Some(block) = &code.block else {
        return Ok(());
    };
    visitor.visit_block(block, pipe)?;

    if !code.buffer {
        let keyword = statement_keyword(&code.val);
        if visitor.autocloses(keyword) {
            pipe.push_fmt(format_args!("{{% end{keyword} %}}"))?;
        }
    }

    Ok(())
}

pub fn visit_assignment<V>(_: &mut V, assignment: &Assignment, pipe: &mut Pipe) -> Result<(), Error>
where
    V: Visit + ?Sized,
{
    pipe.push_fmt(format_args!(
        "{{% set {} = {} %}}",
        assignment.name, assignment.val
    ))
}

pub fn visit_mixin<V>(visitor: &mut V, mixin: &Mixin, pipe: &mut Pipe) -> Result<(), Error>
where
    V: Visit + ?Sized,
{
    if mixin.call {
        if has_body(mixin) {
            return Err(Error::not_supported(MIXIN_BLOCK_UNSUPPORTED));
        }
        let options = visitor.compiler().options();
        return pipe.push_fmt(format_args!(
            "{}{}({}){}",
            options.variable_start_string, mixin.name, mixin.args, options.variable_end_string
        ));
    }

    visitor.compiler_mut().state.mixing += 1;
    let result = macro_definition(visitor, mixin, pipe);
    visitor.compiler_mut().state.mixing -= 1;

    result
}

/// Emit a `macro` directive wrapping the body of `mixin`.
fn macro_definition<V>(visitor: &mut V, mixin: &Mixin, pipe: &mut Pipe) -> Result<(), Error>
where
    V: Visit + ?Sized,
{
    pipe.push_fmt(format_args!("{{% macro {}({}) %}}", mixin.name, mixin.args))?;
    if let Some(block) = &mixin.block {
        visitor.visit_block(block, pipe)?;
    }

    pipe.push("{% endmacro %}")
}

/// Return true if a mixin carries a non-empty body.
pub fn has_body(mixin: &Mixin) -> bool {
    mixin.block.as_ref().is_some_and(|block| !block.is_empty())
}

pub fn visit_tag<V>(visitor: &mut V, tag: &Tag, pipe: &mut Pipe) -> Result<(), Error>
where
    V: Visit + ?Sized,
{
    visitor.compiler_mut().state.indents += 1;
    let result = tag_body(visitor, tag, pipe);
    visitor.compiler_mut().state.indents -= 1;

    result
}

fn tag_body<V>(visitor: &mut V, tag: &Tag, pipe: &mut Pipe) -> Result<(), Error>
where
    V: Visit + ?Sized,
{
    let compiler = visitor.compiler();
    let indents = compiler.state.indents;

    if !compiler.state.has_compiled_tag {
        if !compiler.state.has_compiled_doctype && tag.name == "html" {
            visit_doctype(visitor, None, pipe)?;
        }
        visitor.compiler_mut().state.has_compiled_tag = true;
    }

    let compiler = visitor.compiler();
    let pretty = compiler.options.pretty;
    let inline = compiler.is_inline(tag);
    let terse = compiler.state.terse;
    let mut closed = compiler.is_self_closing(&tag.name) && !compiler.state.xml;

    if pretty && !inline {
        pipe.push_indent(indents - 1)?;
    }

    let first_text = tag.text.as_ref().and_then(|text| text.nodes.first());
    if let Some(text) = first_text {
        if text.starts_with('/') {
            if text.len() > 1 {
                return Err(Error::build(ErrorKind::InvalidTemplate, SELF_CLOSING_CONTENT)
                    .with_help(format!(
                        "`{}` is self closing and should not have content",
                        tag.name
                    )));
            }
            closed = true;
        }
    }

    pipe.push_fmt(format_args!("<{}", tag.name))?;
    visitor.visit_attributes(&tag.attrs, pipe)?;
    pipe.push(if !terse && closed { "/>" } else { ">" })?;

    if !closed {
        if let Some(code) = &tag.code {
            visitor.visit_code(code, pipe)?;
        }
        if let Some(text) = first_text {
            let text = visitor.compiler().interpolate(text.trim_start(), None);
            pipe.push(&text)?;
        }

        let text_only = tag.text_only || tag.block.is_empty();
        visitor.visit_block(&tag.block, pipe)?;

        if pretty && !inline && !text_only {
            pipe.push_indent(indents - 1)?;
        }
        pipe.push_fmt(format_args!("</{}>", tag.name))?;
    }

    Ok(())
}

/// Emit static attributes inline, and hand runs of dynamic attributes to
/// [`visit_dynamic_attributes`].
pub fn visit_attributes<V>(visitor: &mut V, attrs: &[Attribute], pipe: &mut Pipe) -> Result<(), Error>
where
    V: Visit + ?Sized,
{
    let use_runtime = visitor.compiler().options.use_runtime;
    let mut dynamic: Vec<&Attribute> = vec![];

    for attr in attrs {
        if !((!use_runtime && attr.name != "class") || attr.is_static) {
            dynamic.push(attr);
            continue;
        }
        if !dynamic.is_empty() {
            visit_dynamic_attributes(visitor, &dynamic, pipe)?;
            dynamic.clear();
        }

        let name = &attr.name;
        match &attr.val {
            AttributeValue::Text(val) if use_runtime || attr.is_static => {
                pipe.push_fmt(format_args!(" {name}={val}"))?
            }
            AttributeValue::Text(val) => {
                let val = variable(&*visitor, val, "");
                pipe.push_fmt(format_args!(" {name}=\"{val}\""))?
            }
            AttributeValue::Bool(true) if visitor.compiler().state.terse => {
                pipe.push_fmt(format_args!(" {name}"))?
            }
            AttributeValue::Bool(true) => pipe.push_fmt(format_args!(" {name}=\"{name}\""))?,
            AttributeValue::Bool(false) => {}
        }
    }
    if !dynamic.is_empty() {
        visit_dynamic_attributes(visitor, &dynamic, pipe)?;
    }

    Ok(())
}

/// Emit one runtime helper call that renders `attrs`.
///
/// Class values are merged into a single `class` pair.
pub fn visit_dynamic_attributes<V>(
    visitor: &mut V,
    attrs: &[&Attribute],
    pipe: &mut Pipe,
) -> Result<(), Error>
where
    V: Visit + ?Sized,
{
    let mut pairs = vec![];
    let mut classes = vec![];
    for attr in attrs {
        if attr.name == "class" {
            classes.push(format!("({})", attr.val));
        } else {
            pairs.push(format!("('{}',({}))", attr.name, attr.val));
        }
    }
    if !classes.is_empty() {
        pairs.push(format!("('class', ({}))", classes.join(" , ")));
    }

    let terse = visitor.compiler().state.terse;
    let mut params = vec![];
    if terse {
        params.push("terse=True".to_string());
    }
    if !pairs.is_empty() {
        params.push(format!("attrs=[{}]", pairs.join(", ")));
    }

    if !pairs.is_empty() || terse {
        pipe.push(&visitor.attributes(&params.join(", ")))?;
    }

    Ok(())
}

pub fn visit_text<V>(visitor: &mut V, text: &Text, pipe: &mut Pipe) -> Result<(), Error>
where
    V: Visit + ?Sized,
{
    let compiler = visitor.compiler();
    pipe.push(&compiler.interpolate(&text.nodes.concat(), None))?;
    if compiler.options.pretty {
        pipe.push("\n")?;
    }

    Ok(())
}

pub fn visit_inline<V>(visitor: &mut V, text: &Text, pipe: &mut Pipe) -> Result<(), Error>
where
    V: Visit + ?Sized,
{
    pipe.push(&visitor.compiler().interpolate(&text.nodes.concat(), None))
}

pub fn visit_comment<V>(visitor: &mut V, comment: &Comment, pipe: &mut Pipe) -> Result<(), Error>
where
    V: Visit + ?Sized,
{
    if !comment.buffer {
        return Ok(());
    }
    let compiler = visitor.compiler();
    if compiler.options.pretty {
        pipe.push_indent(compiler.state.indents)?;
    }

    pipe.push_fmt(format_args!("<!--{}-->", comment.val))
}

/// Emit a block comment, or an IE conditional comment when the value
/// starts with `if`.
pub fn visit_block_comment<V>(
    visitor: &mut V,
    comment: &BlockComment,
    pipe: &mut Pipe,
) -> Result<(), Error>
where
    V: Visit + ?Sized,
{
    if !comment.buffer {
        return Ok(());
    }

    let val = comment.val.trim();
    let conditional = val.starts_with("if");
    if conditional {
        pipe.push_fmt(format_args!("<!--[{val}]>"))?;
    } else {
        pipe.push_fmt(format_args!("<!--{}", comment.val))?;
    }
    visitor.visit_block(&comment.block, pipe)?;

    pipe.push(if conditional { "<![endif]-->" } else { "-->" })
}

/// Emit the doctype.
///
/// `None` is the implicit doctype before a leading `html` tag, which emits
/// only a doctype chosen by the options.
pub fn visit_doctype<V>(visitor: &mut V, doctype: Option<&Doctype>, pipe: &mut Pipe) -> Result<(), Error>
where
    V: Visit + ?Sized,
{
    let state = &mut visitor.compiler_mut().state;
    match doctype {
        Some(Doctype { val: Some(val), .. }) => state.set_doctype(val),
        Some(_) if state.doctype.is_none() => state.set_doctype("default"),
        _ => {}
    }
    state.has_compiled_doctype = true;

    match &state.doctype {
        Some(doctype) => pipe.push(doctype),
        None => Ok(()),
    }
}

/// Run a registered filter over the interpolated text of `filter`.
pub fn visit_filter<V>(visitor: &mut V, filter: &Filter, pipe: &mut Pipe) -> Result<(), Error>
where
    V: Visit + ?Sized,
{
    let compiler = visitor.compiler();
    let text = compiler.interpolate(&filter.text.concat(), None);

    let output = match &compiler.options.filename {
        Some(filename) => {
            let mut node = filter.clone();
            node.attrs.insert("filename".into(), filename.clone());
            compiler.filters.apply(&filter.name, &text, &node)?
        }
        None => compiler.filters.apply(&filter.name, &text, filter)?,
    };

    pipe.push(&output)
}

pub fn visit_conditional<V>(
    visitor: &mut V,
    conditional: &Conditional,
    pipe: &mut Pipe,
) -> Result<(), Error>
where
    V: Visit + ?Sized,
{
    let sentence = &conditional.sentence;
    match conditional.kind {
        ConditionalKind::If => pipe.push_fmt(format_args!("{{% if {sentence} %}}"))?,
        ConditionalKind::Unless => pipe.push_fmt(format_args!("{{% if not {sentence} %}}"))?,
        ConditionalKind::Elif => pipe.push_fmt(format_args!("{{% elif {sentence} %}}"))?,
        ConditionalKind::Else => pipe.push("{% else %}")?,
    }

    if let Some(block) = &conditional.block {
        visitor.visit_block(block, pipe)?;
        for next in &conditional.next {
            visitor.visit_conditional(next, pipe)?;
        }
    }

    match conditional.kind {
        ConditionalKind::If | ConditionalKind::Unless => pipe.push("{% endif %}"),
        _ => Ok(()),
    }
}

pub fn visit_each<V>(visitor: &mut V, each: &Each, pipe: &mut Pipe) -> Result<(), Error>
where
    V: Visit + ?Sized,
{
    pipe.push_fmt(format_args!(
        "{{% for {} in {}|__pyjade_iter:{} %}}",
        each.keys.join(","),
        each.obj,
        each.keys.len()
    ))?;
    visitor.visit_block(&each.block, pipe)?;

    pipe.push("{% endfor %}")
}

pub fn visit_extends<V>(visitor: &mut V, extends: &Extends, pipe: &mut Pipe) -> Result<(), Error>
where
    V: Visit + ?Sized,
{
    let path = format_path(&*visitor, &extends.path);
    pipe.push_fmt(format_args!("{{% extends \"{path}\" %}}"))
}

pub fn visit_include<V>(visitor: &mut V, include: &Include, pipe: &mut Pipe) -> Result<(), Error>
where
    V: Visit + ?Sized,
{
    let path = format_path(&*visitor, &include.path);
    pipe.push_fmt(format_args!("{{% include \"{path}\" %}}"))
}

/// Append the configured extension when the file name has none.
pub fn format_path<'p, V>(visitor: &V, path: &'p str) -> Cow<'p, str>
where
    V: Visit + ?Sized,
{
    let file_name = path.rsplit('/').next().unwrap_or(path);
    if file_name.contains('.') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("{path}{}", visitor.compiler().options.extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compiler() -> Compiler {
        Compiler::new(Options::default(), Arc::new(Registry::new()))
    }

    fn compact() -> Compiler {
        let options = Options {
            pretty: false,
            ..Default::default()
        };
        Compiler::new(options, Arc::new(Registry::new()))
    }

    fn compile(compiler: &mut Compiler, nodes: Vec<Node>) -> Result<String, Error> {
        compiler.compile(&Node::Block(Block::new(nodes)))
    }

    #[test]
    fn test_code_block_modes() {
        let block = |mode| -> Node { CodeBlock::new("body", mode, Block::new(["x"])).into() };
        let output = compile(
            &mut compact(),
            vec![
                block(BlockMode::Append),
                block(BlockMode::Prepend),
                block(BlockMode::Replace),
            ],
        )
        .unwrap();

        assert_eq!(
            output,
            "{% block body %}{{super()}}x{% endblock %}\
            {% block body %}x{{super()}}{% endblock %}\
            {% block body %}x{% endblock %}"
        );
    }

    #[test]
    fn test_code() {
        let output = compile(
            &mut compact(),
            vec![
                Code::escaped("  name").into(),
                Code::output("raw").into(),
                Code::statement("for x in xs")
                    .with_block(Block::new(["."]))
                    .into(),
            ],
        )
        .unwrap();

        assert_eq!(
            output,
            "{{name|escape}}{{raw}}{% for x in xs %}.{% endfor %}"
        );
    }

    #[test]
    fn test_statement_without_autoclose() {
        let output = compile(
            &mut compact(),
            vec![Code::statement("csrf_token").with_block(Block::new(["x"])).into()],
        )
        .unwrap();

        assert_eq!(output, "{% csrf_token %}x");
    }

    #[test]
    fn test_mixin() {
        let output = compile(
            &mut compact(),
            vec![
                Mixin::definition("card", "item", Block::new(["<b>"])).into(),
                Mixin::call("card", "post").into(),
            ],
        )
        .unwrap();

        assert_eq!(
            output,
            "{% macro card(item) %}<b>{% endmacro %}{{card(post)}}"
        );
    }

    #[test]
    fn test_mixin_call_with_body() {
        let error = compile(
            &mut compact(),
            vec![Mixin::call("card", "post").with_block(Block::new(["x"])).into()],
        )
        .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::NotSupported);
    }

    #[test]
    fn test_failed_mixin_restores_depth() {
        let call = Mixin::call("badge", "item").with_block(Block::new(["x"]));
        let mut compiler = compact();
        let error = compile(
            &mut compiler,
            vec![Mixin::definition("card", "item", Block::new([call])).into()],
        )
        .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::NotSupported);
        assert!(!compiler.state().in_mixin());
    }

    #[test]
    fn test_failed_tag_restores_indents() {
        let inner = Tag::new("foo").with_text("/oops");
        let outer = Tag::new("ul").with_block(Block::new([Tag::new("li").with_block(Block::new([inner]))]));
        let mut compiler = compiler();
        let error = compile(&mut compiler, vec![outer.into()]).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::InvalidTemplate);
        assert_eq!(compiler.state().indents, 0);
    }

    #[test]
    fn test_tag_pretty() {
        let tag = Tag::new("ul").with_block(Block::new([
            Tag::new("li").with_text("one"),
            Tag::new("li").with_text("#{two}"),
        ]));
        let output = compile(&mut compiler(), vec![tag.into()]).unwrap();

        assert_eq!(
            output,
            "\n<ul>\n  <li>one</li>\n  <li>{{two|escape}}</li>\n</ul>"
        );
    }

    #[test]
    fn test_implicit_doctype() {
        let output = compile(&mut compact(), vec![Tag::new("html").into()]).unwrap();
        assert_eq!(output, "<html></html>");

        let options = Options {
            pretty: false,
            doctype: Some("5".into()),
            ..Default::default()
        };
        let mut html5 = Compiler::new(options, Arc::new(Registry::new()));
        let output = compile(&mut html5, vec![Tag::new("html").into()]).unwrap();
        assert_eq!(output, "<!DOCTYPE html><html></html>");
    }

    #[test]
    fn test_compile_twice() {
        let options = Options {
            pretty: false,
            doctype: Some("5".into()),
            ..Default::default()
        };
        let mut html5 = Compiler::new(options, Arc::new(Registry::new()));
        let first = compile(&mut html5, vec![Tag::new("html").into()]).unwrap();
        let second = compile(&mut html5, vec![Tag::new("html").into()]).unwrap();

        assert_eq!(first, "<!DOCTYPE html><html></html>");
        assert_eq!(first, second);
    }

    #[test]
    fn test_explicit_doctype() {
        let doctype = Doctype::default();
        let output = compile(&mut compact(), vec![doctype.into(), Tag::new("html").into()]).unwrap();

        assert_eq!(output, "<!DOCTYPE html><html></html>");
    }

    #[test]
    fn test_self_closing() {
        let options = Options {
            pretty: false,
            doctype: Some("xml".into()),
            ..Default::default()
        };
        let mut xml = Compiler::new(options, Arc::new(Registry::new()));
        let output = compile(&mut xml, vec![Tag::new("br").into(), Tag::new("foo").with_text("/").into()]).unwrap();
        assert_eq!(output, "<br></br><foo/>");

        let output = compile(&mut compact(), vec![Tag::new("br").into()]).unwrap();
        assert_eq!(output, "<br/>");
    }

    #[test]
    fn test_self_closing_with_content() {
        let error = compile(&mut compact(), vec![Tag::new("foo").with_text("/oops").into()])
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::InvalidTemplate);
    }

    #[test]
    fn test_attributes() {
        let tag = Tag::new("a")
            .with_attribute(Attribute::fixed("href", "'/home'"))
            .with_attribute(Attribute::dynamic("class", "active"))
            .with_attribute(Attribute::dynamic("class", "'link'"))
            .with_attribute(Attribute::dynamic("title", "page.title"))
            .with_attribute(Attribute::flag("hidden", true));
        let output = compile(&mut compact(), vec![tag.into()]).unwrap();

        assert_eq!(
            output,
            "<a href='/home'{{__pyjade_attrs(attrs=[('title',(page.title)), \
            ('class', ((active) , ('link')))])}} hidden=\"hidden\"></a>"
        );
    }

    #[test]
    fn test_attributes_terse() {
        let options = Options {
            pretty: false,
            doctype: Some("5".into()),
            ..Default::default()
        };
        let mut html5 = Compiler::new(options, Arc::new(Registry::new()));
        let tag = Tag::new("input")
            .with_attribute(Attribute::flag("checked", true))
            .with_attribute(Attribute::flag("disabled", false));
        let output = compile(&mut html5, vec![tag.into()]).unwrap();

        assert_eq!(output, "<input checked>");
    }

    #[test]
    fn test_conditional() {
        let conditional = Conditional::new(ConditionalKind::If, "user", Block::new(["a"]))
            .with_next(Conditional::new(ConditionalKind::Elif, "guest", Block::new(["b"])))
            .with_next(Conditional::new(ConditionalKind::Else, "", Block::new(["c"])));
        let unless = Conditional::new(ConditionalKind::Unless, "done", Block::new(["d"]));
        let output = compile(&mut compact(), vec![conditional.into(), unless.into()]).unwrap();

        assert_eq!(
            output,
            "{% if user %}a{% elif guest %}b{% else %}c{% endif %}\
            {% if not done %}d{% endif %}"
        );
    }

    #[test]
    fn test_each() {
        let each = Each {
            keys: vec!["value".into(), "key".into()],
            obj: "items".into(),
            block: Block::new(["."]),
            region: None,
        };
        let output = compile(&mut compact(), vec![each.into()]).unwrap();

        assert_eq!(
            output,
            "{% for value,key in items|__pyjade_iter:2 %}.{% endfor %}"
        );
    }

    #[test]
    fn test_extends_and_include() {
        let output = compile(
            &mut compact(),
            vec![Extends::new("layout").into(), Include::new("partials/nav.html").into()],
        )
        .unwrap();

        assert_eq!(
            output,
            "{% extends \"layout.jade\" %}{% include \"partials/nav.html\" %}"
        );
    }

    #[test]
    fn test_comments() {
        let comment = Comment {
            val: " note".into(),
            buffer: true,
            region: None,
        };
        let hidden = Comment {
            val: "hidden".into(),
            buffer: false,
            region: None,
        };
        let conditional = BlockComment {
            val: " if IE 8".into(),
            buffer: true,
            block: Block::new(["x"]),
            region: None,
        };
        let output = compile(
            &mut compact(),
            vec![comment.into(), hidden.into(), conditional.into()],
        )
        .unwrap();

        assert_eq!(output, "<!-- note--><!--[if IE 8]>x<![endif]-->");
    }

    #[test]
    fn test_filter() {
        let registry = Registry::new();
        registry
            .register("upper", |text: &str, node: &Filter| -> Result<String, Error> {
                let name = node.attrs.get("filename").map(String::as_str).unwrap_or("?");
                Ok(format!("{name}:{}", text.to_uppercase()))
            })
            .unwrap();
        let options = crate::options::resolve(
            &crate::Settings::new(),
            json!({ "pretty": false, "filename": "page.jade" }),
        )
        .unwrap();
        let mut compiler = Compiler::new(options, Arc::new(registry));
        let output = compile(&mut compiler, vec![Filter::new("upper", ["hi ", "there"]).into()]).unwrap();

        assert_eq!(output, "page.jade:HI THERE");
    }

    #[test]
    fn test_unknown_filter() {
        let error = compile(&mut compact(), vec![Filter::new("ghost", ["x"]).into()]).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::UnknownFilter);
    }

    #[test]
    fn test_text() {
        let mut text = Text::new(["hello #{name}"]);
        let output = compile(&mut compiler(), vec![Node::Text(text.clone())]).unwrap();
        assert_eq!(output, "hello {{name|escape}}\n");

        text.inline = true;
        let output = compile(&mut compiler(), vec![Node::Inline(text)]).unwrap();
        assert_eq!(output, "hello {{name|escape}}");
    }

    #[test]
    fn test_gettext_processor() {
        let mut compiler = compact().with_var_processor(gettext);
        let output = compile(&mut compiler, vec![Code::output("_ Hello").into()]).unwrap();

        assert_eq!(output, "{{_(\"Hello\")}}");
    }

    #[test]
    fn test_extra_autoclose() {
        let options = Options {
            pretty: false,
            extra_autoclose_code: vec!["cycle".into()],
            ..Default::default()
        };
        let mut compiler = Compiler::new(options, Arc::new(Registry::new()));
        let output = compile(
            &mut compiler,
            vec![Code::statement("cycle a b").with_block(Block::new(["x"])).into()],
        )
        .unwrap();

        assert_eq!(output, "{% cycle a b %}x{% endcycle %}");
    }
}
