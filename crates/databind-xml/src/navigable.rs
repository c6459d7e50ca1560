use databind_model::Result;

use crate::document::{NodeId, XmlDocument};
use crate::xpath::XPath;

/// A document that can be queried with XPath location paths.
///
/// Expressions are compiled once with [`compile`](Self::compile) and then
/// evaluated against any number of context nodes.
pub trait XPathNavigable {
    type Node: Copy + Eq + 'static;
    type Expression;

    fn root(&self) -> Self::Node;

    /// # Errors
    ///
    /// Returns [`databind_model::DataError::XPath`] for unsupported or
    /// malformed expressions.
    fn compile(&self, expression: &str) -> Result<Self::Expression>;

    /// Nodes selected by a compiled expression evaluated against `context`.
    fn evaluate(&self, context: Self::Node, expression: &Self::Expression) -> Vec<Self::Node>;

    /// Compile and evaluate in one step.
    ///
    /// # Errors
    ///
    /// As [`compile`](Self::compile).
    fn select(&self, context: Self::Node, expression: &str) -> Result<Vec<Self::Node>> {
        let compiled = self.compile(expression)?;
        Ok(self.evaluate(context, &compiled))
    }

    fn string_value(&self, node: Self::Node) -> String;

    fn name(&self, node: Self::Node) -> Option<&str>;
}

impl XPathNavigable for XmlDocument {
    type Node = NodeId;
    type Expression = XPath;

    fn root(&self) -> NodeId {
        XmlDocument::root(self)
    }

    fn compile(&self, expression: &str) -> Result<XPath> {
        XPath::parse(expression)
    }

    fn evaluate(&self, context: NodeId, expression: &XPath) -> Vec<NodeId> {
        expression.select(self, context)
    }

    fn string_value(&self, node: NodeId) -> String {
        XmlDocument::string_value(self, node)
    }

    fn name(&self, node: NodeId) -> Option<&str> {
        XmlDocument::name(self, node)
    }
}
