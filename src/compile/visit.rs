use crate::{
    compile::{
        base::{self, Compiler},
        tree::*,
    },
    pipe::Pipe,
    report::Error,
};
use std::borrow::Cow;

/// Emits template directives for each kind of [`Node`].
///
/// Every method has a default that calls the function of the same name in
/// [`base`], so a dialect overrides only the nodes it renders differently and
/// can still call the default explicitly:
///
/// ```
/// use jadeite::{base, tree::Include, Compiler, Error, Pipe, Visit};
///
/// struct Quiet(Compiler);
///
/// impl Visit for Quiet {
///     fn compiler(&self) -> &Compiler {
///         &self.0
///     }
///
///     fn compiler_mut(&mut self) -> &mut Compiler {
///         &mut self.0
///     }
///
///     fn visit_include(&mut self, include: &Include, pipe: &mut Pipe) -> Result<(), Error> {
///         pipe.push("{# include #}")?;
///         base::visit_include(self, include, pipe)
///     }
/// }
/// ```
pub trait Visit {
    /// Return the shared compiler state.
    fn compiler(&self) -> &Compiler;

    /// Return the shared compiler state.
    fn compiler_mut(&mut self) -> &mut Compiler;

    /// Compile the tree rooted at `node` and return the output.
    ///
    /// # Errors
    ///
    /// Returns the first [`Error`] raised while visiting the tree, no partial
    /// output is returned.
    fn compile(&mut self, node: &Node) -> Result<String, Error> {
        self.compiler_mut().reset();

        let mut buffer = String::new();
        self.visit(node, &mut Pipe::new(&mut buffer))?;

        Ok(buffer)
    }

    /// Dispatch `node` to the method for its kind.
    fn visit(&mut self, node: &Node, pipe: &mut Pipe) -> Result<(), Error> {
        walk(self, node, pipe)
    }

    fn visit_block(&mut self, block: &Block, pipe: &mut Pipe) -> Result<(), Error> {
        base::visit_block(self, block, pipe)
    }

    fn visit_code_block(&mut self, block: &CodeBlock, pipe: &mut Pipe) -> Result<(), Error> {
        base::visit_code_block(self, block, pipe)
    }

    fn visit_code(&mut self, code: &Code, pipe: &mut Pipe) -> Result<(), Error> {
        base::visit_code(self, code, pipe)
    }

    fn visit_assignment(&mut self, assignment: &Assignment, pipe: &mut Pipe) -> Result<(), Error> {
        base::visit_assignment(self, assignment, pipe)
    }

    fn visit_mixin(&mut self, mixin: &Mixin, pipe: &mut Pipe) -> Result<(), Error> {
        base::visit_mixin(self, mixin, pipe)
    }

    fn visit_tag(&mut self, tag: &Tag, pipe: &mut Pipe) -> Result<(), Error> {
        base::visit_tag(self, tag, pipe)
    }

    fn visit_attributes(&mut self, attrs: &[Attribute], pipe: &mut Pipe) -> Result<(), Error> {
        base::visit_attributes(self, attrs, pipe)
    }

    fn visit_text(&mut self, text: &Text, pipe: &mut Pipe) -> Result<(), Error> {
        base::visit_text(self, text, pipe)
    }

    fn visit_inline(&mut self, text: &Text, pipe: &mut Pipe) -> Result<(), Error> {
        base::visit_inline(self, text, pipe)
    }

    fn visit_literal(&mut self, literal: &Literal, pipe: &mut Pipe) -> Result<(), Error> {
        base::visit_literal(self, literal, pipe)
    }

    fn visit_comment(&mut self, comment: &Comment, pipe: &mut Pipe) -> Result<(), Error> {
        base::visit_comment(self, comment, pipe)
    }

    fn visit_block_comment(&mut self, comment: &BlockComment, pipe: &mut Pipe) -> Result<(), Error> {
        base::visit_block_comment(self, comment, pipe)
    }

    fn visit_doctype(&mut self, doctype: &Doctype, pipe: &mut Pipe) -> Result<(), Error> {
        base::visit_doctype(self, Some(doctype), pipe)
    }

    fn visit_filter(&mut self, filter: &Filter, pipe: &mut Pipe) -> Result<(), Error> {
        base::visit_filter(self, filter, pipe)
    }

    fn visit_conditional(&mut self, conditional: &Conditional, pipe: &mut Pipe) -> Result<(), Error> {
        base::visit_conditional(self, conditional, pipe)
    }

    fn visit_each(&mut self, each: &Each, pipe: &mut Pipe) -> Result<(), Error> {
        base::visit_each(self, each, pipe)
    }

    fn visit_extends(&mut self, extends: &Extends, pipe: &mut Pipe) -> Result<(), Error> {
        base::visit_extends(self, extends, pipe)
    }

    fn visit_include(&mut self, include: &Include, pipe: &mut Pipe) -> Result<(), Error> {
        base::visit_include(self, include, pipe)
    }

    /// Rewrite a variable reference before it is interpolated.
    fn process_variable<'v>(&self, val: &'v str) -> Cow<'v, str> {
        (self.compiler().var_processor)(val)
    }

    /// Return the directive that renders dynamic attributes at runtime.
    fn attributes(&self, payload: &str) -> String {
        let options = &self.compiler().options;
        format!(
            "{}__pyjade_attrs({payload}){}",
            options.variable_start_string, options.variable_end_string
        )
    }

    /// Return true if a statement beginning with `keyword` opens a block
    /// that must be closed with `end<keyword>`.
    fn autocloses(&self, keyword: &str) -> bool {
        self.compiler().autoclose.iter().any(|k| k == keyword)
    }
}

/// Call the [`Visit`] method matching the kind of `node`.
pub fn walk<V>(visitor: &mut V, node: &Node, pipe: &mut Pipe) -> Result<(), Error>
where
    V: Visit + ?Sized,
{
    let result = match node {
        Node::Block(n) => visitor.visit_block(n, pipe),
        Node::CodeBlock(n) => visitor.visit_code_block(n, pipe),
        Node::Code(n) => visitor.visit_code(n, pipe),
        Node::Assignment(n) => visitor.visit_assignment(n, pipe),
        Node::Mixin(n) => visitor.visit_mixin(n, pipe),
        Node::Tag(n) => visitor.visit_tag(n, pipe),
        Node::Text(n) => visitor.visit_text(n, pipe),
        Node::Inline(n) => visitor.visit_inline(n, pipe),
        Node::Literal(n) => visitor.visit_literal(n, pipe),
        Node::Comment(n) => visitor.visit_comment(n, pipe),
        Node::BlockComment(n) => visitor.visit_block_comment(n, pipe),
        Node::Doctype(n) => visitor.visit_doctype(n, pipe),
        Node::Filter(n) => visitor.visit_filter(n, pipe),
        Node::Conditional(n) => visitor.visit_conditional(n, pipe),
        Node::Each(n) => visitor.visit_each(n, pipe),
        Node::Extends(n) => visitor.visit_extends(n, pipe),
        Node::Include(n) => visitor.visit_include(n, pipe),
    };

    result.map_err(|e| e.with_region(node.region()))
}
