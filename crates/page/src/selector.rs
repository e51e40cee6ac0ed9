//! A CSS selector subset, enough to address the player controls.
//!
//! Supported: type and universal selectors, `.class`, `#id`, attribute
//! selectors with `=`, `~=`, `|=`, `^=`, `$=`, `*=`, the `:checked` and
//! `:not(<compound>)` pseudo-classes, descendant and child combinators, and
//! comma-separated lists.

use crate::{NodeId, error::SelectorError, page::Element};

/// Read access to the element tree used while matching.
pub(crate) trait ElementTree {
    /// Element data for `node`.
    fn element(&self, node: NodeId) -> Option<&Element>;
    /// Parent element of `node`.
    fn parent(&self, node: NodeId) -> Option<NodeId>;
}

/// A parsed, comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    /// Alternatives; an element matches when any alternative does.
    alternatives: Vec<Complex>,
}

impl SelectorList {
    /// Parse `src` into a selector list.
    pub fn parse(src: &str) -> Result<Self, SelectorError> {
        let mut parser = Parser { src, pos: 0 };
        let mut alternatives = Vec::new();
        loop {
            parser.skip_ws();
            alternatives.push(parser.complex()?);
            parser.skip_ws();
            match parser.peek() {
                Some(',') => {
                    parser.bump();
                }
                None => break,
                Some(_) => return Err(parser.error("unexpected character")),
            }
        }
        Ok(Self { alternatives })
    }

    /// True when `node` matches any alternative.
    pub(crate) fn matches<T: ElementTree>(&self, tree: &T, node: NodeId) -> bool {
        self.alternatives.iter().any(|c| c.matches(tree, node))
    }
}

/// How two compounds relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
}

/// Compounds joined by combinators, stored left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    /// The leftmost compound.
    head: Compound,
    /// Each following compound with the combinator that precedes it.
    rest: Vec<(Combinator, Compound)>,
}

impl Complex {
    /// Match right to left, walking ancestors for combinators.
    fn matches<T: ElementTree>(&self, tree: &T, node: NodeId) -> bool {
        self.matches_at(tree, self.rest.len(), node)
    }

    /// Match the compound at `idx` (0 = head) against `node` and everything to its left.
    fn matches_at<T: ElementTree>(&self, tree: &T, idx: usize, node: NodeId) -> bool {
        let Some(element) = tree.element(node) else {
            return false;
        };
        if idx == 0 {
            return self.head.matches(element);
        }
        let (combinator, compound) = &self.rest[idx - 1];
        if !compound.matches(element) {
            return false;
        }
        match combinator {
            Combinator::Child => tree
                .parent(node)
                .is_some_and(|parent| self.matches_at(tree, idx - 1, parent)),
            Combinator::Descendant => {
                let mut cur = tree.parent(node);
                while let Some(ancestor) = cur {
                    if self.matches_at(tree, idx - 1, ancestor) {
                        return true;
                    }
                    cur = tree.parent(ancestor);
                }
                false
            }
        }
    }
}

/// Attribute comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    /// `=`
    Equals,
    /// `~=`
    Includes,
    /// `|=`
    DashMatch,
    /// `^=`
    Prefix,
    /// `$=`
    Suffix,
    /// `*=`
    Substring,
}

impl AttrOp {
    /// Apply the operator.
    fn test(self, actual: &str, expected: &str) -> bool {
        match self {
            Self::Equals => actual == expected,
            Self::Includes => actual.split_whitespace().any(|w| w == expected),
            Self::DashMatch => {
                actual == expected
                    || actual
                        .strip_prefix(expected)
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            Self::Prefix => !expected.is_empty() && actual.starts_with(expected),
            Self::Suffix => !expected.is_empty() && actual.ends_with(expected),
            Self::Substring => !expected.is_empty() && actual.contains(expected),
        }
    }
}

/// One simple condition inside a compound.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Condition {
    /// `#id`
    Id(String),
    /// `.class`
    Class(String),
    /// `[name]` or `[name op value]`
    Attr {
        /// Attribute name, lowercased.
        name: String,
        /// Optional comparison.
        test: Option<(AttrOp, String)>,
    },
    /// `:checked`
    Checked,
    /// `:not(...)`
    Not(Box<Compound>),
}

/// A type selector plus conditions, e.g. `input.bui-checkbox:checked`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Compound {
    /// Lowercased tag name; `None` for `*` or an omitted type.
    tag: Option<String>,
    /// All conditions must hold.
    conditions: Vec<Condition>,
}

impl Compound {
    /// Test a single element.
    fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag
            && tag != element.tag()
        {
            return false;
        }
        self.conditions.iter().all(|cond| match cond {
            Condition::Id(id) => element.id() == Some(id.as_str()),
            Condition::Class(class) => element.classes().any(|c| c == class),
            Condition::Attr { name, test } => match (element.attr(name), test) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some((op, expected))) => op.test(actual, expected),
            },
            Condition::Checked => element.is_checked(),
            Condition::Not(inner) => !inner.matches(element),
        })
    }
}

/// Recursive-descent parser over the selector text.
struct Parser<'a> {
    /// Source text.
    src: &'a str,
    /// Current byte offset.
    pos: usize,
}

impl Parser<'_> {
    /// Build an error at the current offset.
    fn error(&self, reason: &'static str) -> SelectorError {
        SelectorError {
            selector: self.src.to_string(),
            offset: self.pos,
            reason,
        }
    }

    /// Next character without consuming it.
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    /// Consume one character.
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consume `expected` or fail.
    fn expect(&mut self, expected: char, reason: &'static str) -> Result<(), SelectorError> {
        if self.peek() == Some(expected) {
            self.bump();
            Ok(())
        } else {
            Err(self.error(reason))
        }
    }

    /// Skip whitespace, reporting whether any was skipped.
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos != start
    }

    /// Parse an identifier, or `None` when none starts here.
    fn ident(&mut self) -> Option<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
                self.bump();
            } else if c == '\\' {
                self.bump();
                self.bump();
            } else {
                break;
            }
        }
        if self.pos == start {
            None
        } else {
            Some(self.src[start..self.pos].replace('\\', ""))
        }
    }

    /// Compounds separated by combinators.
    fn complex(&mut self) -> Result<Complex, SelectorError> {
        let head = self.compound()?;
        let mut rest = Vec::new();
        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.bump();
                    self.skip_ws();
                    Combinator::Child
                }
                Some(_) if had_ws => Combinator::Descendant,
                Some(_) => return Err(self.error("expected combinator")),
            };
            rest.push((combinator, self.compound()?));
        }
        Ok(Complex { head, rest })
    }

    /// Type selector and trailing conditions.
    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut explicit_universal = false;
        let tag = if self.peek() == Some('*') {
            self.bump();
            explicit_universal = true;
            None
        } else {
            self.ident().map(|t| t.to_ascii_lowercase())
        };
        let mut conditions = Vec::new();
        loop {
            match self.peek() {
                Some('.') => {
                    self.bump();
                    let class = self.ident().ok_or_else(|| self.error("expected class name"))?;
                    conditions.push(Condition::Class(class));
                }
                Some('#') => {
                    self.bump();
                    let id = self.ident().ok_or_else(|| self.error("expected id"))?;
                    conditions.push(Condition::Id(id));
                }
                Some('[') => {
                    self.bump();
                    conditions.push(self.attribute()?);
                }
                Some(':') => {
                    self.bump();
                    conditions.push(self.pseudo()?);
                }
                _ => break,
            }
        }
        if tag.is_none() && !explicit_universal && conditions.is_empty() {
            return Err(self.error("expected selector"));
        }
        Ok(Compound { tag, conditions })
    }

    /// Body of `[...]`, after the opening bracket.
    fn attribute(&mut self) -> Result<Condition, SelectorError> {
        self.skip_ws();
        let name = self
            .ident()
            .ok_or_else(|| self.error("expected attribute name"))?
            .to_ascii_lowercase();
        self.skip_ws();
        let op = match self.peek() {
            Some(']') => None,
            Some('=') => Some(AttrOp::Equals),
            Some(c) => {
                let op = match c {
                    '~' => AttrOp::Includes,
                    '|' => AttrOp::DashMatch,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    '*' => AttrOp::Substring,
                    _ => return Err(self.error("expected attribute operator")),
                };
                self.bump();
                if self.peek() != Some('=') {
                    return Err(self.error("expected '='"));
                }
                Some(op)
            }
            None => return Err(self.error("unterminated attribute selector")),
        };
        let test = match op {
            None => None,
            Some(op) => {
                self.bump();
                self.skip_ws();
                let value = self.value()?;
                self.skip_ws();
                Some((op, value))
            }
        };
        self.expect(']', "expected ']'")?;
        Ok(Condition::Attr { name, test })
    }

    /// Quoted string or bare identifier.
    fn value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let mut out = String::new();
                loop {
                    match self.bump() {
                        None => return Err(self.error("unterminated string")),
                        Some('\\') => {
                            if let Some(c) = self.bump() {
                                out.push(c);
                            }
                        }
                        Some(c) if c == quote => return Ok(out),
                        Some(c) => out.push(c),
                    }
                }
            }
            _ => self.ident().ok_or_else(|| self.error("expected attribute value")),
        }
    }

    /// Pseudo-class after the colon.
    fn pseudo(&mut self) -> Result<Condition, SelectorError> {
        let name = self
            .ident()
            .ok_or_else(|| self.error("expected pseudo-class"))?
            .to_ascii_lowercase();
        match name.as_str() {
            "checked" => Ok(Condition::Checked),
            "not" => {
                self.expect('(', "expected '('")?;
                self.skip_ws();
                let inner = self.compound()?;
                self.skip_ws();
                self.expect(')', "expected ')'")?;
                Ok(Condition::Not(Box::new(inner)))
            }
            _ => Err(self.error("unsupported pseudo-class")),
        }
    }
}
