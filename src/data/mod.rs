//! Training data plumbing: line sources, row parsing, the cyclic row stream,
//! and min/max normalization.

mod normalize;
mod parser;
mod source;
mod stream;

pub use normalize::{denormalize_grid, normalize_grid, Bounds};
pub use parser::{RowParser, DELIMITER};
pub use source::{FileSource, LineSource, LineStatus, MemorySource};
pub use stream::CyclicRows;
