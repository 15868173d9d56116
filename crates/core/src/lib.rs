pub mod cell;
pub mod coerce;
pub mod date;
pub mod money;
pub mod transaction;

pub use cell::{RawCell, RawRow};
pub use coerce::{coerce, coerce_checked, Coerced};
pub use date::{is_valid_date, normalize, CanonicalDate, CanonicalDateError};
pub use money::Money;
pub use transaction::{Direction, StatementBalances, Transaction};
