//! Data sets, join and merge strategies, and the data binder.
//!
//! Data flows from leaf data sets through aggregates into the binder:
//!
//! - Leaf sets ([`ColumnSequenceDataSet`], [`RowSequenceDataSet`]) produce
//!   rows from in-memory values.
//! - A [`DataSource`] overlays member sets and rewrites aliased paths into
//!   column indexes.
//! - A [`JoinedDataSet`] lays members side by side and combines their rows
//!   with a [`JoinStrategy`].
//! - The [`DataBinder`] reads converted values out of each row.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use databind_core::{ColumnSequenceDataSet, DataBinder, DataSource, JoinedDataSet};
//! use databind_model::{DataBinding, Value, ValueType};
//!
//! let mut letters = DataSource::new("letters");
//! letters.add_data_set(Rc::new(ColumnSequenceDataSet::new(["a", "b"])))?;
//! letters.add_index_alias("letter", 0)?;
//!
//! let mut joined = JoinedDataSet::new();
//! joined.add_data_set(Rc::new(letters))?;
//! joined.add_data_set(Rc::new(ColumnSequenceDataSet::new(["1", "2", "3"])))?;
//!
//! let bindings = vec![
//!     DataBinding::for_path("letter"),
//!     DataBinding::for_index(1).with_value_type(ValueType::Int),
//! ];
//! let items = DataBinder::default().bind(&joined, bindings)?;
//! let values = items
//!     .map(|item| item?.values())
//!     .collect::<databind_model::Result<Vec<_>>>()?;
//! assert_eq!(values.len(), 6);
//! assert_eq!(values[4], vec![Value::text("b"), Value::Int(2)]);
//! # Ok::<(), databind_model::DataError>(())
//! ```

pub mod aggregate;
pub mod binder;
pub mod conversion;
pub mod data_source;
pub mod join;
pub mod joined;
pub mod merge;
pub mod merged;
pub mod provider;
pub mod resolver;
pub mod row;
pub mod sets;

pub use aggregate::AggregateDataSet;
pub use binder::{DataBinder, Item, Items};
pub use conversion::{ConversionCost, ConversionRule, Converter, RuleBasedConverter};
pub use data_source::DataSource;
pub use join::{
    CombinatorialJoinStrategy, JoinStrategy, PairwiseJoinStrategy, RowTuple, RowTuples,
    SequentialJoinStrategy,
};
pub use joined::{DataSetInfo, JoinedDataSet};
pub use merge::{
    ConcatenationMergeStrategy, IntersectionMergeStrategy, MergeStrategy, UnionMergeStrategy,
};
pub use merged::MergedDataSet;
pub use provider::{DataProvider, DataSet, Rows, no_rows};
pub use resolver::{DataSourceResolver, DataSourceTable};
pub use row::{DataRow, ListDataRow, NullDataRow, Row, ScalarDataRow};
pub use sets::{ColumnSequenceDataSet, RowSequenceDataSet};
