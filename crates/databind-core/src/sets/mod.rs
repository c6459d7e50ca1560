//! Leaf data sets over in-memory values and rows.

mod column_sequence;
mod row_sequence;

pub use column_sequence::ColumnSequenceDataSet;
pub use row_sequence::RowSequenceDataSet;
