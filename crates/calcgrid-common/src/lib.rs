pub mod error;
pub mod position;
pub mod value;

pub use error::CellError;
pub use position::{col_from_label, col_to_label, Position, Size, MAX_COLS, MAX_ROWS};
pub use value::Value;
