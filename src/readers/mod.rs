pub mod block_scanner;
pub mod column_mapper;
pub mod profile_reader;
pub mod tokenizer;

pub use block_scanner::{BlockScanner, LocationMarker};
pub use column_mapper::{map_columns, ColumnMap, LayoutKind, LineOffsets};
pub use profile_reader::ProfileReader;
pub use tokenizer::{tokenize, Token, TokenizedRow};
