//! XML data sets combined with the rest of the engine.

use std::rc::Rc;

use databind_core::{
    ColumnSequenceDataSet, DataBinder, DataSet, DataSource, JoinedDataSet, SequentialJoinStrategy,
};
use databind_model::{DataBinding, Value, ValueType};
use databind_xml::{XmlDataSet, XmlDocument};

const ORDERS: &str = r#"<orders>
  <order number="17"><customer>acme</customer><quantity> 3 </quantity></order>
  <order number="18"><customer>globex</customer><quantity>12</quantity></order>
</orders>"#;

fn orders() -> XmlDataSet {
    XmlDataSet::new(XmlDocument::parse(ORDERS).unwrap(), "//order", false).unwrap()
}

#[test]
fn xml_rows_join_with_value_lists() {
    let mut joined = JoinedDataSet::new();
    joined.add_data_set(Rc::new(orders())).unwrap();
    joined
        .add_data_set(Rc::new(ColumnSequenceDataSet::new(["express", "ground"])))
        .unwrap();
    assert_eq!(joined.column_count(), 1);

    let bindings = vec![
        DataBinding::for_path("@number").with_value_type(ValueType::Int),
        DataBinding::for_path("quantity").with_value_type(ValueType::Int),
        DataBinding::for_index(0),
    ];
    let values: Vec<Vec<Value>> = DataBinder::default()
        .bind(&joined, bindings)
        .unwrap()
        .map(|item| item.unwrap().values().unwrap())
        .collect();
    assert_eq!(values.len(), 4);
    assert_eq!(
        values[1],
        vec![Value::Int(17), Value::Int(3), Value::text("ground")]
    );
    assert_eq!(
        values[2],
        vec![Value::Int(18), Value::Int(12), Value::text("express")]
    );
}

#[test]
fn aliased_paths_still_reach_xml_rows() {
    let mut source = DataSource::new("orders");
    source.add_data_set(Rc::new(orders())).unwrap();
    source.add_index_alias("customer", 0).unwrap();
    let customer = DataBinding::for_path("customer");
    assert_eq!(source.translate_binding(&customer).index(), Some(0));
    assert!(source.can_bind(&customer));
    let names: Vec<Value> = DataBinder::default()
        .bind(&source, vec![customer])
        .unwrap()
        .map(|item| item.unwrap().get_value(0).unwrap())
        .collect();
    assert_eq!(names, vec![Value::text("acme"), Value::text("globex")]);
}

#[test]
fn sequential_join_pads_short_xml_sets() {
    let mut joined = JoinedDataSet::new();
    joined.add_data_set(Rc::new(orders())).unwrap();
    joined
        .add_data_set(Rc::new(ColumnSequenceDataSet::new([1, 2, 3])))
        .unwrap();
    joined.set_strategy(Rc::new(SequentialJoinStrategy));
    let customer = DataBinding::for_path("customer").with_value_type(ValueType::Text);
    let items: Vec<_> = DataBinder::default()
        .bind(&joined, vec![customer, DataBinding::for_index(0)])
        .unwrap()
        .collect::<databind_model::Result<_>>()
        .unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[2].get_value(0).unwrap(), Value::text(""));
    assert_eq!(items[2].get_value(1).unwrap(), Value::Int(3));
    assert_eq!(items[0].metadata().get("XmlNode"), Some("order"));
}

#[test]
fn out_of_range_index_falls_through_to_a_later_path_member() {
    let shipments =
        XmlDocument::parse(r#"<shipments><shipment carrier="dhl"/></shipments>"#).unwrap();
    let mut joined = JoinedDataSet::new();
    joined
        .add_data_set(Rc::new(ColumnSequenceDataSet::new(["express"])))
        .unwrap();
    joined
        .add_data_set(Rc::new(XmlDataSet::new(shipments, "//shipment", false).unwrap()))
        .unwrap();
    joined.add_data_set(Rc::new(orders())).unwrap();

    let binding = DataBinding::new(ValueType::Any, Some("quantity".into()), Some(5));
    let resolved = joined.resolve_binding(&binding).unwrap();
    assert_eq!(resolved.member_index(), 2);
    assert_eq!(resolved.inner().index(), None);
    assert_eq!(resolved.inner().path(), Some("quantity"));
    assert_eq!(resolved.external_index(), Some(5));
}
