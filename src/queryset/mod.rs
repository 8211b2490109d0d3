//! QuerySet for dynaquery
//!
//! A `QuerySet` describes one range query: partition, optional condition,
//! optional index, direction, limit and resume cursor. Builder calls return
//! new querysets; terminal calls execute once and memoize the page.
//!
//! ```ignore
//! let page = QuerySet::new(table)
//!     .set_hash_key("tenant-1")
//!     .filter("number__gte", 4)?
//!     .set_limit(10);
//! for item in page.iter()? {
//!     // ...
//! }
//! let next = page.next_cursor()?;
//! ```

mod errors;
mod execution;
mod query;

pub use errors::{QueryResult, QuerySetError};
pub use execution::{Execution, ExecutionIter};
pub use query::QuerySet;

pub(crate) use query::{at_most_one, exactly_one};
