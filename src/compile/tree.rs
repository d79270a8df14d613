//! The document tree handed to the compiler by a Jade parser.
//!
//! The compiler never builds or validates these nodes itself, it only reads
//! them. Constructors and `with_` methods exist so that parsers and tests can
//! assemble trees without spelling out every field.
use crate::region::Region;
use std::{collections::BTreeMap, fmt::Display};

/// A node in the Jade document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Ordered children with no output of their own.
    Block(Block),
    /// A named, overridable block of template inheritance.
    CodeBlock(CodeBlock),
    /// An expression to render or a statement to execute.
    Code(Code),
    /// `- var name = value`.
    Assignment(Assignment),
    /// A mixin definition or call.
    Mixin(Mixin),
    /// An HTML element.
    Tag(Tag),
    /// Piped text, followed by a newline when pretty printing.
    Text(Text),
    /// Text inlined into a tag, never followed by a newline.
    Inline(Text),
    /// Output copied verbatim.
    Literal(Literal),
    /// `// comment`.
    Comment(Comment),
    /// A comment with a nested body.
    BlockComment(BlockComment),
    /// `doctype name`.
    Doctype(Doctype),
    /// `:name` with the text beneath it.
    Filter(Filter),
    /// An `if`/`unless` chain.
    Conditional(Conditional),
    /// `each value, key in object`.
    Each(Each),
    /// `extends path`.
    Extends(Extends),
    /// `include path`.
    Include(Include),
}

impl Node {
    /// Return the source location recorded by the parser, if any.
    pub fn region(&self) -> Option<Region> {
        match self {
            Node::Block(n) => n.region,
            Node::CodeBlock(n) => n.region,
            Node::Code(n) => n.region,
            Node::Assignment(n) => n.region,
            Node::Mixin(n) => n.region,
            Node::Tag(n) => n.region,
            Node::Text(n) | Node::Inline(n) => n.region,
            Node::Literal(n) => n.region,
            Node::Comment(n) => n.region,
            Node::BlockComment(n) => n.region,
            Node::Doctype(n) => n.region,
            Node::Filter(n) => n.region,
            Node::Conditional(n) => n.region,
            Node::Each(n) => n.region,
            Node::Extends(n) => n.region,
            Node::Include(n) => n.region,
        }
    }
}

/// Ordered sequence of child nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub nodes: Vec<Node>,
    pub region: Option<Region>,
}

impl Block {
    /// Create a new [`Block`] holding the given nodes.
    pub fn new<I>(nodes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        Self {
            nodes: nodes.into_iter().map(Into::into).collect(),
            region: None,
        }
    }

    /// Return true if the block has no children.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// How a child template's block combines with the parent block of the
/// same name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlockMode {
    /// The body replaces the parent content.
    #[default]
    Replace,
    /// The body follows the parent content.
    Append,
    /// The body precedes the parent content.
    Prepend,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    pub name: String,
    pub mode: BlockMode,
    pub block: Block,
    pub region: Option<Region>,
}

impl CodeBlock {
    pub fn new<T: Into<String>>(name: T, mode: BlockMode, block: Block) -> Self {
        Self {
            name: name.into(),
            mode,
            block,
            region: None,
        }
    }
}

/// A line of code.
///
/// When `buffer` is true the value is an expression rendered into the
/// output, otherwise it is a statement such as `if user`.
#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    pub val: String,
    pub buffer: bool,
    pub escape: bool,
    pub block: Option<Block>,
    pub region: Option<Region>,
}

impl Code {
    /// Create a statement, `- for x in y` in Jade.
    pub fn statement<T: Into<String>>(val: T) -> Self {
        Self {
            val: val.into(),
            buffer: false,
            escape: false,
            block: None,
            region: None,
        }
    }

    /// Create an unescaped expression, `!= value` in Jade.
    pub fn output<T: Into<String>>(val: T) -> Self {
        Self {
            buffer: true,
            ..Self::statement(val)
        }
    }

    /// Create an escaped expression, `= value` in Jade.
    pub fn escaped<T: Into<String>>(val: T) -> Self {
        Self {
            escape: true,
            ..Self::output(val)
        }
    }

    /// Attach a body.
    pub fn with_block(mut self, block: Block) -> Self {
        self.block = Some(block);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub val: String,
    pub region: Option<Region>,
}

impl Assignment {
    pub fn new<T: Into<String>, Y: Into<String>>(name: T, val: Y) -> Self {
        Self {
            name: name.into(),
            val: val.into(),
            region: None,
        }
    }
}

/// A reusable fragment.
///
/// `call` separates `+name(args)` call sites from `mixin name(args)`
/// definitions. `args` is kept as the raw argument list text.
#[derive(Debug, Clone, PartialEq)]
pub struct Mixin {
    pub name: String,
    pub args: String,
    pub call: bool,
    pub block: Option<Block>,
    pub region: Option<Region>,
}

impl Mixin {
    /// Create a mixin definition with the given body.
    pub fn definition<T: Into<String>, Y: Into<String>>(name: T, args: Y, block: Block) -> Self {
        Self {
            name: name.into(),
            args: args.into(),
            call: false,
            block: Some(block),
            region: None,
        }
    }

    /// Create a mixin call without a body.
    pub fn call<T: Into<String>, Y: Into<String>>(name: T, args: Y) -> Self {
        Self {
            name: name.into(),
            args: args.into(),
            call: true,
            block: None,
            region: None,
        }
    }

    /// Attach a body.
    pub fn with_block(mut self, block: Block) -> Self {
        self.block = Some(block);
        self
    }
}

/// Value of a tag attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// Expression text, or a quoted literal for static attributes.
    Text(String),
    /// A boolean attribute such as `checked`.
    Bool(bool),
}

impl Display for AttributeValue {
    /// Formats the value the way the runtime attribute helper expects to
    /// read it back.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Text(text) => write!(f, "{text}"),
            AttributeValue::Bool(true) => write!(f, "True"),
            AttributeValue::Bool(false) => write!(f, "False"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub val: AttributeValue,
    /// True when the value is known at compile time.
    pub is_static: bool,
}

impl Attribute {
    /// Create an attribute whose value is evaluated by the runtime.
    pub fn dynamic<T: Into<String>, Y: Into<String>>(name: T, val: Y) -> Self {
        Self {
            name: name.into(),
            val: AttributeValue::Text(val.into()),
            is_static: false,
        }
    }

    /// Create an attribute whose value is written as is.
    pub fn fixed<T: Into<String>, Y: Into<String>>(name: T, val: Y) -> Self {
        Self {
            name: name.into(),
            val: AttributeValue::Text(val.into()),
            is_static: true,
        }
    }

    /// Create a static boolean attribute.
    pub fn flag<T: Into<String>>(name: T, val: bool) -> Self {
        Self {
            name: name.into(),
            val: AttributeValue::Bool(val),
            is_static: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tag {
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub text: Option<Text>,
    pub code: Option<Code>,
    pub block: Block,
    /// Written without surrounding pretty-print whitespace.
    pub inline: bool,
    /// The body holds only text.
    pub text_only: bool,
    pub region: Option<Region>,
}

impl Tag {
    pub fn new<T: Into<String>>(name: T) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attrs.push(attribute);
        self
    }

    pub fn with_text<T: Into<String>>(mut self, text: T) -> Self {
        self.text = Some(Text::new([text]));
        self
    }

    pub fn with_code(mut self, code: Code) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.block = block;
        self
    }
}

/// Lines of text, joined without a separator when compiled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Text {
    pub nodes: Vec<String>,
    pub inline: bool,
    pub region: Option<Region>,
}

impl Text {
    pub fn new<I>(nodes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            nodes: nodes.into_iter().map(Into::into).collect(),
            inline: false,
            region: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub text: String,
    pub region: Option<Region>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub val: String,
    /// Comments that are not buffered produce no output.
    pub buffer: bool,
    pub region: Option<Region>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockComment {
    pub val: String,
    pub buffer: bool,
    pub block: Block,
    pub region: Option<Region>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Doctype {
    /// Doctype name, `None` selects the default.
    pub val: Option<String>,
    pub region: Option<Region>,
}

/// Text transformed by a registered filter at compile time.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub name: String,
    pub attrs: BTreeMap<String, String>,
    pub text: Vec<String>,
    pub region: Option<Region>,
}

impl Filter {
    pub fn new<T, I>(name: T, text: I) -> Self
    where
        T: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            name: name.into(),
            attrs: BTreeMap::new(),
            text: text.into_iter().map(Into::into).collect(),
            region: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalKind {
    If,
    Unless,
    Elif,
    Else,
}

/// One branch of a conditional chain.
///
/// The head branch is `If` or `Unless`, the following branches are kept in
/// `next`.
#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub kind: ConditionalKind,
    pub sentence: String,
    pub block: Option<Block>,
    pub next: Vec<Conditional>,
    pub region: Option<Region>,
}

impl Conditional {
    pub fn new<T: Into<String>>(kind: ConditionalKind, sentence: T, block: Block) -> Self {
        Self {
            kind,
            sentence: sentence.into(),
            block: Some(block),
            next: vec![],
            region: None,
        }
    }

    pub fn with_next(mut self, next: Conditional) -> Self {
        self.next.push(next);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Each {
    pub keys: Vec<String>,
    pub obj: String,
    pub block: Block,
    pub region: Option<Region>,
}

/// `extends` reference, with the path as written by the author.
#[derive(Debug, Clone, PartialEq)]
pub struct Extends {
    pub path: String,
    pub region: Option<Region>,
}

impl Extends {
    pub fn new<T: Into<String>>(path: T) -> Self {
        Self {
            path: path.into(),
            region: None,
        }
    }
}

/// `include` reference, with the path as written by the author.
#[derive(Debug, Clone, PartialEq)]
pub struct Include {
    pub path: String,
    pub region: Option<Region>,
}

impl Include {
    pub fn new<T: Into<String>>(path: T) -> Self {
        Self {
            path: path.into(),
            region: None,
        }
    }
}

macro_rules! impl_into_node {
    ($($kind:ident),* $(,)?) => {
        $(
            impl From<$kind> for Node {
                fn from(value: $kind) -> Self {
                    Node::$kind(value)
                }
            }
        )*
    };
}

impl_into_node!(
    Block,
    CodeBlock,
    Code,
    Assignment,
    Mixin,
    Tag,
    Text,
    Literal,
    Comment,
    BlockComment,
    Doctype,
    Filter,
    Conditional,
    Each,
    Extends,
    Include,
);

impl From<&str> for Node {
    /// Shortcut for a [`Literal`] node.
    fn from(value: &str) -> Self {
        Node::Literal(Literal {
            text: value.to_owned(),
            region: None,
        })
    }
}
