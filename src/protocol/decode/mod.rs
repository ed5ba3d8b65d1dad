//! Coercions from decoded cell values into typed scalars.
//!
//! | Target | Module |
//! |--------|--------|
//! | Int64, Double | `number` |
//! | DateTime | `date` |
//!
//! Booleans and strings need no dedicated parser.

mod date;
mod number;

pub use date::parse_datetime;
pub use number::{f64_to_i64, parse_f64, parse_i64};
