//! Data set over the nodes an XPath expression selects.

use std::rc::Rc;

use databind_core::{DataProvider, DataRow, DataSet, Row, Rows};
use databind_model::{DataBinding, DataError, Metadata, Result, Value};
use tracing::{debug, trace};

use crate::document::XmlDocument;
use crate::navigable::XPathNavigable;

/// One row per node selected by the row path.
///
/// Bindings address values by path, evaluated relative to the row node; the
/// value is the string-value of the first selected node. Index-only bindings
/// are not supported and the column count is zero.
pub struct XmlDataSet<D: XPathNavigable = XmlDocument> {
    document: D,
    row_path: String,
    rows: D::Expression,
    is_dynamic: bool,
}

impl<D: XPathNavigable> XmlDataSet<D> {
    /// # Errors
    ///
    /// Returns an invalid-argument error for an empty row path and an XPath
    /// error if the row path cannot be compiled.
    pub fn new(document: D, row_path: impl Into<String>, is_dynamic: bool) -> Result<Self> {
        let row_path = row_path.into();
        if row_path.trim().is_empty() {
            return Err(DataError::invalid_argument("the row path must not be empty"));
        }
        let rows = document.compile(&row_path)?;
        Ok(Self {
            document,
            row_path,
            rows,
            is_dynamic,
        })
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn row_path(&self) -> &str {
        &self.row_path
    }

    fn first_value(&self, node: D::Node, path: &D::Expression) -> Option<Value> {
        self.document
            .evaluate(node, path)
            .first()
            .map(|first| Value::Text(self.document.string_value(*first)))
    }
}

impl<D: XPathNavigable> DataProvider for XmlDataSet<D> {
    fn is_dynamic(&self) -> bool {
        self.is_dynamic
    }

    /// # Errors
    ///
    /// Returns an XPath error, before any row is produced, if a binding path
    /// cannot be compiled.
    fn get_rows<'a>(
        &'a self,
        bindings: &[DataBinding],
        include_dynamic_rows: bool,
    ) -> Result<Rows<'a>> {
        let paths = bindings
            .iter()
            .filter_map(DataBinding::path)
            .map(|path| Ok((path.to_string(), self.document.compile(path)?)))
            .collect::<Result<Vec<_>>>()?;
        if self.is_dynamic && !include_dynamic_rows {
            return Ok(databind_core::no_rows());
        }
        let nodes = self.document.evaluate(self.document.root(), &self.rows);
        debug!(row_path = %self.row_path, rows = nodes.len(), "selected xml rows");
        Ok(Box::new(nodes.into_iter().map(move |node| -> Result<Row<'a>> {
            let slots = paths
                .iter()
                .map(|(path, compiled)| (path.clone(), self.first_value(node, compiled)))
                .collect();
            let row: Row<'a> = Rc::new(XmlDataRow {
                data_set: self,
                node,
                slots,
            });
            Ok(row)
        })))
    }
}

impl<D: XPathNavigable> DataSet for XmlDataSet<D> {
    fn column_count(&self) -> usize {
        0
    }

    fn can_bind(&self, binding: &DataBinding) -> bool {
        let Some(path) = binding.path() else {
            return false;
        };
        let expression = format!("{}/{path}", self.row_path);
        self.document
            .select(self.document.root(), &expression)
            .is_ok_and(|nodes| !nodes.is_empty())
    }
}

struct XmlDataRow<'a, D: XPathNavigable> {
    data_set: &'a XmlDataSet<D>,
    node: D::Node,
    /// Values for the paths requested with the rows, `None` if nothing was
    /// selected.
    slots: Vec<(String, Option<Value>)>,
}

impl<D: XPathNavigable> DataRow for XmlDataRow<'_, D> {
    fn is_dynamic(&self) -> bool {
        self.data_set.is_dynamic
    }

    fn metadata(&self) -> Metadata {
        let name = self.data_set.document.name(self.node).unwrap_or_default();
        Metadata::new().with("XmlNode", name)
    }

    fn get_value(&self, binding: &DataBinding) -> Result<Value> {
        let path = binding.path().ok_or_else(|| {
            DataError::binding(format!(
                "binding {binding} has no path; xml rows are addressed by path"
            ))
        })?;
        let value = match self.slots.iter().find(|(slot, _)| slot == path) {
            Some((_, value)) => value.clone(),
            None => {
                trace!(path, "evaluating path on demand");
                let compiled = self.data_set.document.compile(path)?;
                self.data_set.first_value(self.node, &compiled)
            }
        };
        value.ok_or_else(|| DataError::binding(format!("path '{path}' selects no node")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use databind_model::ValueType;

    const PEOPLE: &str = r#"<people>
  <person id="1"><name>Ada</name><born>1815</born></person>
  <person id="2"><name>Alan</name></person>
</people>"#;

    fn people(is_dynamic: bool) -> XmlDataSet {
        XmlDataSet::new(XmlDocument::parse(PEOPLE).unwrap(), "/people/person", is_dynamic).unwrap()
    }

    #[test]
    fn binds_paths_that_select_something() {
        let set = people(false);
        assert_eq!(set.column_count(), 0);
        assert!(set.can_bind(&DataBinding::for_path("name")));
        assert!(set.can_bind(&DataBinding::for_path("@id")));
        assert!(set.can_bind(&DataBinding::for_path("born")));
        assert!(!set.can_bind(&DataBinding::for_path("died")));
        assert!(!set.can_bind(&DataBinding::for_path("[")));
        assert!(!set.can_bind(&DataBinding::for_index(0)));
    }

    #[test]
    fn rows_carry_requested_and_ad_hoc_values() {
        let set = people(false);
        let name = DataBinding::new(ValueType::Text, Some("name".into()), None);
        let born = DataBinding::for_path("born");
        let rows: Vec<_> = set
            .get_rows(&[name.clone(), born.clone(), DataBinding::for_index(0)], true)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get_value(&name).unwrap(), Value::text("Ada"));
        assert_eq!(rows[0].get_value(&born).unwrap(), Value::text("1815"));
        assert_eq!(
            rows[1].get_value(&DataBinding::for_path("@id")).unwrap(),
            Value::text("2")
        );
        assert!(rows[1].get_value(&born).unwrap_err().is_binding_error());
        assert!(rows[0].get_value(&DataBinding::for_index(0)).unwrap_err().is_binding_error());
        assert!(matches!(
            rows[0].get_value(&DataBinding::for_path("a[")).unwrap_err(),
            DataError::XPath { .. }
        ));
        assert_eq!(rows[0].metadata().get("XmlNode"), Some("person"));
    }

    #[test]
    fn malformed_binding_paths_fail_the_request() {
        let set = people(false);
        let err = set
            .get_rows(&[DataBinding::for_path("name"), DataBinding::for_path("n[")], true)
            .err()
            .unwrap();
        assert!(matches!(err, DataError::XPath { ref expression, .. } if expression == "n["));

        let dynamic = people(true);
        assert!(
            dynamic
                .get_rows(&[DataBinding::for_path("n[")], false)
                .is_err()
        );
    }

    #[test]
    fn dynamic_documents_are_withheld_unless_requested() {
        let set = people(true);
        assert_eq!(set.get_rows(&[], false).unwrap().count(), 0);
        let row = set.get_rows(&[], true).unwrap().next().unwrap().unwrap();
        assert!(row.is_dynamic());
    }

    #[test]
    fn row_path_is_validated() {
        let document = XmlDocument::parse(PEOPLE).unwrap();
        assert!(matches!(
            XmlDataSet::new(document.clone(), " ", false).err().unwrap(),
            DataError::InvalidArgument { .. }
        ));
        assert!(matches!(
            XmlDataSet::new(document, "/people/[", false).err().unwrap(),
            DataError::XPath { .. }
        ));
    }
}
