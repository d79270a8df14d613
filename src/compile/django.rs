use crate::{
    compile::{
        base::{self, Compiler, VarProcessor},
        path,
        tree::*,
        visit::Visit,
    },
    filter::Registry,
    options::Options,
    pipe::Pipe,
    report::{error_missing_origin, Error, MIXIN_BLOCK_UNSUPPORTED},
};
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;

/// Statement keywords that the Django runtime closes with `end<keyword>`.
pub const AUTOCLOSE: &[&str] = &[
    "if",
    "ifchanged",
    "ifequal",
    "ifnotequal",
    "for",
    "block",
    "filter",
    "autoescape",
    "with",
    "trans",
    "blocktrans",
    "spaceless",
    "comment",
    "cache",
    "localize",
    "compress",
    "verbatim",
];

/// Compiles a tree into Django template source.
///
/// Nodes with no Django specific form fall through to the defaults in
/// [`base`].
///
/// Cross-file references are rewritten relative to the first of
/// `template_dirs` that contains them, which requires the `origin` option.
pub struct Django {
    base: Compiler,
    template_dirs: Vec<Utf8PathBuf>,
}

impl Django {
    /// Create a new [`Django`] compiler.
    pub fn new(options: Options, filters: Arc<Registry>, template_dirs: Vec<Utf8PathBuf>) -> Self {
        Self {
            base: Compiler::with_autoclose(options, filters, AUTOCLOSE),
            template_dirs,
        }
    }

    /// Set the function that rewrites variable references.
    pub fn with_var_processor(mut self, processor: VarProcessor) -> Self {
        self.base = self.base.with_var_processor(processor);
        self
    }

    /// Return the file being compiled, if known.
    #[inline]
    pub fn origin(&self) -> Option<&Utf8Path> {
        self.base.options.origin.as_deref()
    }

    #[inline]
    pub fn template_dirs(&self) -> &[Utf8PathBuf] {
        &self.template_dirs
    }

    /// Rewrite `path` relative to the template directory that contains it.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] of kind [`Configuration`][crate::ErrorKind::Configuration]
    /// when there is no origin, or no template directory contains the path.
    pub fn make_relative(&self, path: &str) -> Result<String, Error> {
        let origin = self.origin().ok_or_else(|| error_missing_origin(path))?;

        path::make_relative(origin, path, &self.template_dirs)
    }

    fn kwacro(&mut self, mixin: &Mixin, pipe: &mut Pipe) -> Result<(), Error> {
        if mixin.call {
            return pipe.push_fmt(format_args!(
                "{{% __pyjade_usekwacro {} {} %}}",
                mixin.name, mixin.args
            ));
        }

        pipe.push_fmt(format_args!(
            "{{% __pyjade_kwacro {} {} %}}",
            mixin.name, mixin.args
        ))?;
        if let Some(block) = &mixin.block {
            self.visit_block(block, pipe)?;
        }

        pipe.push("{% end__pyjade_kwacro %}")
    }
}

impl Visit for Django {
    fn compiler(&self) -> &Compiler {
        &self.base
    }

    fn compiler_mut(&mut self) -> &mut Compiler {
        &mut self.base
    }

    fn visit_code_block(&mut self, block: &CodeBlock, pipe: &mut Pipe) -> Result<(), Error> {
        let options = self.base.options();
        let parent = format!(
            "{}block.super{}",
            options.variable_start_string, options.variable_end_string
        );

        base::code_block(self, block, &parent, pipe)
    }

    fn visit_code(&mut self, code: &Code, pipe: &mut Pipe) -> Result<(), Error> {
        if code.buffer {
            let filter = if code.escape { "|force_escape" } else { "" };
            pipe.push(&base::variable(&*self, code.val.trim_start(), filter))?;
        } else {
            pipe.push_fmt(format_args!("{{% {} %}}", code.val))?;
        }

        base::code_body(self, code, pipe)
    }

    fn visit_assignment(&mut self, assignment: &Assignment, pipe: &mut Pipe) -> Result<(), Error> {
        pipe.push_fmt(format_args!(
            "{{% __pyjade_set {} = {} %}}",
            assignment.name, assignment.val
        ))
    }

    fn visit_mixin(&mut self, mixin: &Mixin, pipe: &mut Pipe) -> Result<(), Error> {
        if mixin.call && base::has_body(mixin) {
            return Err(Error::not_supported(MIXIN_BLOCK_UNSUPPORTED).with_help(format!(
                "mixin `{}` is called with a block, pass the content as an argument instead",
                mixin.name
            )));
        }

        self.base.state.mixing += 1;
        let result = self.kwacro(mixin, pipe);
        self.base.state.mixing -= 1;

        result
    }

    fn visit_extends(&mut self, extends: &Extends, pipe: &mut Pipe) -> Result<(), Error> {
        let extends = Extends {
            path: self.make_relative(&extends.path)?,
            region: extends.region,
        };

        base::visit_extends(self, &extends, pipe)
    }

    fn visit_include(&mut self, include: &Include, pipe: &mut Pipe) -> Result<(), Error> {
        let include = Include {
            path: self.make_relative(&include.path)?,
            region: include.region,
        };

        base::visit_include(self, &include, pipe)
    }

    fn attributes(&self, payload: &str) -> String {
        format!("{{% __pyjade_attrs {payload} %}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{report::ErrorKind, Region};

    fn options() -> Options {
        Options {
            pretty: false,
            origin: Some("/proj/templates/app/page.jade".into()),
            ..Default::default()
        }
    }

    fn django() -> Django {
        Django::new(
            options(),
            Arc::new(Registry::new()),
            vec!["/proj/templates".into()],
        )
    }

    fn compile(nodes: Vec<Node>) -> Result<String, Error> {
        django().compile(&Node::Block(Block::new(nodes)))
    }

    #[test]
    fn test_append_block() {
        let block = CodeBlock::new("content", BlockMode::Append, Block::new(["body"]));

        assert_eq!(
            compile(vec![block.into()]).unwrap(),
            "{% block content %}{{block.super}}body{% endblock %}"
        );
    }

    #[test]
    fn test_prepend_block() {
        let block = CodeBlock::new("content", BlockMode::Prepend, Block::new(["body"]));

        assert_eq!(
            compile(vec![block.into()]).unwrap(),
            "{% block content %}body{{block.super}}{% endblock %}"
        );
    }

    #[test]
    fn test_replace_block() {
        let block = CodeBlock::new("content", BlockMode::Replace, Block::new(["body"]));
        let output = compile(vec![block.into()]).unwrap();

        assert_eq!(output, "{% block content %}body{% endblock %}");
        assert!(!output.contains("block.super"));
    }

    #[test]
    fn test_assignment() {
        assert_eq!(
            compile(vec![Assignment::new("total", "price * 2").into()]).unwrap(),
            "{% __pyjade_set total = price * 2 %}"
        );
    }

    #[test]
    fn test_mixin_definition() {
        let mixin = Mixin::definition("card", "title, body=None", Block::new(["<div>"]));

        assert_eq!(
            compile(vec![mixin.into()]).unwrap(),
            "{% __pyjade_kwacro card title, body=None %}<div>{% end__pyjade_kwacro %}"
        );
    }

    #[test]
    fn test_mixin_call() {
        assert_eq!(
            compile(vec![Mixin::call("foo", "bar, baz=1").into()]).unwrap(),
            "{% __pyjade_usekwacro foo bar, baz=1 %}"
        );
    }

    #[test]
    fn test_mixin_call_with_empty_block() {
        let mixin = Mixin::call("foo", "bar").with_block(Block::default());

        assert_eq!(
            compile(vec![mixin.into()]).unwrap(),
            "{% __pyjade_usekwacro foo bar %}"
        );
    }

    #[test]
    fn test_mixin_call_with_body() {
        let mut django = django();
        let mixin = Mixin::call("foo", "bar").with_block(Block::new(["x"]));
        let error = django.compile(&mixin.into()).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::NotSupported);
        assert_eq!(error.reason(), MIXIN_BLOCK_UNSUPPORTED);
        assert_eq!(django.compiler().state().mixing, 0);
    }

    #[test]
    fn test_mixin_nesting_is_balanced() {
        let inner = Mixin::call("badge", "item");
        let outer = Mixin::definition("card", "item", Block::new([inner]));
        let mut django = django();
        django.compile(&outer.into()).unwrap();

        assert!(!django.compiler().state().in_mixin());
    }

    #[test]
    fn test_failed_call_inside_definition() {
        let call = Mixin::call("badge", "item").with_block(Block::new(["x"]));
        let outer = Mixin::definition("card", "item", Block::new([call]));
        let mut django = django();
        let error = django.compile(&outer.into()).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::NotSupported);
        assert_eq!(django.compiler().state().mixing, 0);
        assert!(!django.compiler().state().in_mixin());
    }

    #[test]
    fn test_compile_twice() {
        let options = Options {
            doctype: Some("5".into()),
            ..options()
        };
        let mut django = Django::new(options, Arc::new(Registry::new()), vec![]);
        let root: Node = Tag::new("html").into();
        let first = django.compile(&root).unwrap();

        assert_eq!(first, "<!DOCTYPE html><html></html>");
        assert_eq!(django.compile(&root).unwrap(), first);
    }

    #[test]
    fn test_buffered_code() {
        let output = compile(vec![
            Code::escaped(" user.name").into(),
            Code::output("  user.email").into(),
        ])
        .unwrap();

        assert_eq!(output, "{{user.name|force_escape}}{{user.email}}");
    }

    #[test]
    fn test_buffered_code_never_autocloses() {
        let code = Code::output("if").with_block(Block::new(["x"]));

        assert_eq!(compile(vec![code.into()]).unwrap(), "{{if}}x");
    }

    #[test]
    fn test_statement() {
        assert_eq!(
            compile(vec![Code::statement("csrf_token").into()]).unwrap(),
            "{% csrf_token %}"
        );
    }

    #[test]
    fn test_nested_autoclose() {
        let code = Code::statement("for item in items").with_block(Block::new([
            Code::statement("if item.visible").with_block(Block::new([
                Code::statement("with name=item.name")
                    .with_block(Block::new(["{{name}}"])),
            ])),
            Code::statement("ifchanged item.group").with_block(Block::new(["-"])),
        ]));

        assert_eq!(
            compile(vec![code.into()]).unwrap(),
            "{% for item in items %}\
            {% if item.visible %}{% with name=item.name %}{{name}}{% endwith %}{% endif %}\
            {% ifchanged item.group %}-{% endifchanged %}\
            {% endfor %}"
        );
    }

    #[test]
    fn test_autoclose_is_case_sensitive() {
        let code = Code::statement("If x").with_block(Block::new(["y"]));

        assert_eq!(compile(vec![code.into()]).unwrap(), "{% If x %}y");
    }

    #[test]
    fn test_autoclose_override() {
        let options = Options {
            autoclose_code: Some(vec!["cycle".into()]),
            ..options()
        };
        let mut django = Django::new(options, Arc::new(Registry::new()), vec![]);
        let nodes = Block::new([
            Code::statement("cycle a b").with_block(Block::new(["x"])),
            Code::statement("if a").with_block(Block::new(["y"])),
        ]);

        assert_eq!(
            django.compile(&nodes.into()).unwrap(),
            "{% cycle a b %}x{% endcycle %}{% if a %}y"
        );
    }

    #[test]
    fn test_attributes() {
        let tag = Tag::new("a")
            .with_attribute(Attribute::dynamic("href", "url"))
            .with_attribute(Attribute::fixed("id", "\"nav\""));

        assert_eq!(
            compile(vec![tag.into()]).unwrap(),
            "<a{% __pyjade_attrs attrs=[('href',(url))] %} id=\"nav\"></a>"
        );
    }

    #[test]
    fn test_extends_and_include() {
        let output = compile(vec![
            Extends::new("../layout").into(),
            Include::new("../shared/header").into(),
            Include::new("widgets/nav.html").into(),
        ])
        .unwrap();

        assert_eq!(
            output,
            "{% extends \"layout.jade\" %}\
            {% include \"shared/header.jade\" %}\
            {% include \"app/widgets/nav.html\" %}"
        );
    }

    #[test]
    fn test_include_outside_roots() {
        let error = compile(vec![Include::new("../../secrets").into()]).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_include_without_origin() {
        let options = Options {
            origin: None,
            ..options()
        };
        let mut django = Django::new(options, Arc::new(Registry::new()), vec!["/".into()]);
        let error = django.compile(&Include::new("header").into()).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_error_carries_region() {
        let mut mixin = Mixin::call("foo", "").with_block(Block::new(["x"]));
        mixin.region = Some(Region::new(4..10));
        let error = compile(vec![mixin.into()]).unwrap_err();

        assert_eq!(error.region(), Some(Region::new(4..10)));
    }

    #[test]
    fn test_gettext() {
        let mut django = django().with_var_processor(base::gettext);
        let output = django.compile(&Code::output("_ Sign in").into()).unwrap();

        assert_eq!(output, "{{_(\"Sign in\")}}");
    }

    #[test]
    fn test_deterministic() {
        let tree = || -> Node {
            Block::new([
                Node::from(Tag::new("p").with_text("hi #{user}")),
                Code::statement("for x in xs").with_block(Block::new(["."])).into(),
            ])
            .into()
        };

        assert_eq!(django().compile(&tree()).unwrap(), django().compile(&tree()).unwrap());
    }
}
