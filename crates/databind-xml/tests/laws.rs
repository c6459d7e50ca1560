use proptest::prelude::*;

use databind_core::DataProvider;
use databind_model::DataBinding;
use databind_xml::{XmlDataSet, XmlDocument};

fn list_document(values: &[i64]) -> String {
    let items: String = values
        .iter()
        .map(|value| format!("<item n=\"{value}\"><n>{value}</n></item>"))
        .collect();
    format!("<list>{items}</list>")
}

proptest! {
    #[test]
    fn every_selected_node_becomes_one_row(values in prop::collection::vec(-1000i64..1000, 0..16)) {
        let document = XmlDocument::parse(&list_document(&values)).unwrap();
        let data_set = XmlDataSet::new(document, "/list/item", false).unwrap();
        let element = DataBinding::for_path("n");
        let attribute = DataBinding::for_path("@n");
        let rows: Vec<(String, String)> = data_set
            .get_rows(&[element.clone()], true)
            .unwrap()
            .map(|row| {
                let row = row.unwrap();
                (
                    row.get_value(&element).unwrap().to_string(),
                    row.get_value(&attribute).unwrap().to_string(),
                )
            })
            .collect();
        let expected: Vec<(String, String)> = values
            .iter()
            .map(|value| (value.to_string(), value.to_string()))
            .collect();
        prop_assert_eq!(rows, expected);
    }

    #[test]
    fn dynamic_sets_withhold_rows_unless_asked(count in 0usize..8) {
        let values: Vec<i64> = (0..count as i64).collect();
        let document = XmlDocument::parse(&list_document(&values)).unwrap();
        let data_set = XmlDataSet::new(document, "//item", true).unwrap();
        prop_assert_eq!(data_set.get_rows(&[], false).unwrap().count(), 0);
        prop_assert_eq!(data_set.get_rows(&[], true).unwrap().count(), count);
    }
}
