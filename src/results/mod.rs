// Result normalization: every engine value becomes text, every row a name → text lookup.

mod result_set;
mod row;

pub use result_set::ResultSet;
pub use row::Row;
