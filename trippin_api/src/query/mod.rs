mod common;
pub use self::common::{Query, SortDirection};

mod filter;
pub use self::filter::{Filter, Value};

mod entity_set;
pub use self::entity_set::{EntitySetQuery, OrderKey};
