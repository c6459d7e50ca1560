//! XML support for databind: a parsed document model, a location-path
//! subset of XPath, and [`XmlDataSet`], which turns selected nodes into rows.

pub mod data_set;
pub mod document;
pub mod navigable;
pub mod xpath;

pub use data_set::XmlDataSet;
pub use document::{NodeId, NodeKind, XmlDocument};
pub use navigable::XPathNavigable;
pub use xpath::XPath;
