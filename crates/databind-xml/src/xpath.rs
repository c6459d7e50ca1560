//! A location-path subset of XPath 1.0.
//!
//! Supported: absolute (`/a/b`) and relative (`a/b`) paths, `//`, `.`, `..`,
//! `*`, `@name`, `@*`, `text()`, `node()`, and the predicates `[n]`,
//! `[last()]`, `[@name]`, `[@name='value']` and `[child='value']`.

use databind_model::{DataError, Result};

use crate::document::{NodeId, NodeKind, XmlDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Attribute,
    SelfNode,
    Parent,
    DescendantOrSelf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeTest {
    Name(String),
    Wildcard,
    Text,
    Node,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    Position(usize),
    Last,
    HasAttribute(String),
    AttributeEquals(String, String),
    ChildEquals(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    test: NodeTest,
    predicates: Vec<Predicate>,
}

/// A compiled location path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPath {
    source: String,
    absolute: bool,
    steps: Vec<Step>,
}

impl XPath {
    /// Compile `expression`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::XPath`] if the expression is empty or outside the
    /// supported subset.
    pub fn parse(expression: &str) -> Result<Self> {
        Parser::new(expression).parse()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Nodes selected from `context`, in document order without duplicates.
    pub fn select(&self, document: &XmlDocument, context: NodeId) -> Vec<NodeId> {
        let mut current = vec![if self.absolute { document.root() } else { context }];
        for step in &self.steps {
            let mut next = Vec::new();
            for node in &current {
                next.extend(step.apply(document, *node));
            }
            next.sort_unstable();
            next.dedup();
            current = next;
        }
        current
    }
}

impl Step {
    fn apply(&self, document: &XmlDocument, node: NodeId) -> Vec<NodeId> {
        let candidates: Vec<NodeId> = match self.axis {
            Axis::Child => document.children(node).to_vec(),
            Axis::Attribute => document.attributes(node).to_vec(),
            Axis::SelfNode => vec![node],
            Axis::Parent => document.parent(node).into_iter().collect(),
            Axis::DescendantOrSelf => document.descendants_or_self(node),
        };
        let mut selected: Vec<NodeId> = candidates
            .into_iter()
            .filter(|candidate| self.matches(document, *candidate))
            .collect();
        for predicate in &self.predicates {
            selected = predicate.filter(document, selected);
        }
        selected
    }

    fn matches(&self, document: &XmlDocument, node: NodeId) -> bool {
        let kind = document.kind(node);
        match &self.test {
            NodeTest::Node => true,
            NodeTest::Text => matches!(kind, NodeKind::Text(_)),
            NodeTest::Wildcard => match self.axis {
                Axis::Attribute => matches!(kind, NodeKind::Attribute { .. }),
                _ => matches!(kind, NodeKind::Element { .. }),
            },
            NodeTest::Name(name) => match kind {
                NodeKind::Element { name: actual } | NodeKind::Attribute { name: actual, .. } => {
                    actual == name
                }
                NodeKind::Root | NodeKind::Text(_) => false,
            },
        }
    }
}

impl Predicate {
    fn filter(&self, document: &XmlDocument, nodes: Vec<NodeId>) -> Vec<NodeId> {
        match self {
            Predicate::Position(position) => {
                nodes.get(*position - 1).copied().into_iter().collect()
            }
            Predicate::Last => nodes.last().copied().into_iter().collect(),
            Predicate::HasAttribute(name) => nodes
                .into_iter()
                .filter(|node| document.attribute(*node, name).is_some())
                .collect(),
            Predicate::AttributeEquals(name, value) => nodes
                .into_iter()
                .filter(|node| document.attribute(*node, name) == Some(value.as_str()))
                .collect(),
            Predicate::ChildEquals(name, value) => nodes
                .into_iter()
                .filter(|node| {
                    document.element_children(*node).any(|child| {
                        document.name(child) == Some(name.as_str())
                            && document.string_value(child) == *value
                    })
                })
                .collect(),
        }
    }
}

struct Parser<'s> {
    source: &'s str,
    chars: Vec<char>,
    position: usize,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            chars: source.trim().chars().collect(),
            position: 0,
        }
    }

    fn parse(mut self) -> Result<XPath> {
        if self.chars.is_empty() {
            return Err(self.error("empty expression"));
        }
        let mut steps = Vec::new();
        let absolute = self.peek() == Some('/');
        if absolute {
            if self.eat_str("//") {
                steps.push(descendant_or_self());
            } else {
                self.position += 1;
                if self.at_end() {
                    return Ok(self.finish(true, steps));
                }
            }
        }
        loop {
            steps.push(self.step()?);
            if self.at_end() {
                break;
            }
            if self.eat_str("//") {
                steps.push(descendant_or_self());
            } else if !self.eat('/') {
                return Err(self.error("expected '/' between steps"));
            }
        }
        Ok(self.finish(absolute, steps))
    }

    fn finish(&self, absolute: bool, steps: Vec<Step>) -> XPath {
        XPath {
            source: self.source.to_string(),
            absolute,
            steps,
        }
    }

    fn step(&mut self) -> Result<Step> {
        if self.eat_str("..") {
            return Ok(bare(Axis::Parent, NodeTest::Node));
        }
        if self.eat('.') {
            return Ok(bare(Axis::SelfNode, NodeTest::Node));
        }
        let (axis, test) = if self.eat('@') {
            let test = if self.eat('*') {
                NodeTest::Wildcard
            } else {
                NodeTest::Name(self.name()?)
            };
            (Axis::Attribute, test)
        } else if self.eat('*') {
            (Axis::Child, NodeTest::Wildcard)
        } else {
            let name = self.name()?;
            if self.eat_str("()") {
                let test = match name.as_str() {
                    "text" => NodeTest::Text,
                    "node" => NodeTest::Node,
                    other => return Err(self.error(&format!("unsupported node test {other}()"))),
                };
                (Axis::Child, test)
            } else {
                (Axis::Child, NodeTest::Name(name))
            }
        };
        let mut predicates = Vec::new();
        while self.eat('[') {
            predicates.push(self.predicate()?);
            if !self.eat(']') {
                return Err(self.error("expected ']'"));
            }
        }
        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    fn predicate(&mut self) -> Result<Predicate> {
        self.skip_spaces();
        if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            let digits = self.take_while(|c| c.is_ascii_digit());
            let position: usize = digits
                .parse()
                .map_err(|_| self.error("position out of range"))?;
            if position == 0 {
                return Err(self.error("positions start at 1"));
            }
            self.skip_spaces();
            return Ok(Predicate::Position(position));
        }
        if self.eat_str("last()") {
            self.skip_spaces();
            return Ok(Predicate::Last);
        }
        let attribute = self.eat('@');
        let name = self.name()?;
        self.skip_spaces();
        if !self.eat('=') {
            return if attribute {
                Ok(Predicate::HasAttribute(name))
            } else {
                Err(self.error("expected '=' after a child name in a predicate"))
            };
        }
        self.skip_spaces();
        let value = self.literal()?;
        self.skip_spaces();
        Ok(if attribute {
            Predicate::AttributeEquals(name, value)
        } else {
            Predicate::ChildEquals(name, value)
        })
    }

    fn name(&mut self) -> Result<String> {
        let starts_name = self
            .peek()
            .is_some_and(|c| c.is_alphabetic() || c == '_');
        if !starts_name {
            return Err(self.error("expected a name"));
        }
        Ok(self.take_while(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')))
    }

    fn literal(&mut self) -> Result<String> {
        let Some(quote) = self.peek().filter(|c| matches!(c, '\'' | '"')) else {
            return Err(self.error("expected a quoted literal"));
        };
        self.position += 1;
        let value = self.take_while(|c| c != quote);
        if !self.eat(quote) {
            return Err(self.error("unterminated literal"));
        }
        Ok(value)
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> String {
        let start = self.position;
        while self.peek().is_some_and(&keep) {
            self.position += 1;
        }
        self.chars[start..self.position].iter().collect()
    }

    fn skip_spaces(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.position += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn at_end(&self) -> bool {
        self.position >= self.chars.len()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, expected: &str) -> bool {
        let matches = expected
            .chars()
            .enumerate()
            .all(|(offset, c)| self.chars.get(self.position + offset) == Some(&c));
        if matches {
            self.position += expected.chars().count();
        }
        matches
    }

    fn error(&self, message: &str) -> DataError {
        DataError::xpath(
            self.source,
            format!("{message} at position {}", self.position),
        )
    }
}

fn bare(axis: Axis, test: NodeTest) -> Step {
    Step {
        axis,
        test,
        predicates: Vec::new(),
    }
}

fn descendant_or_self() -> Step {
    bare(Axis::DescendantOrSelf, NodeTest::Node)
}
