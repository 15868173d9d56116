/// Rows shown after deriving a bank statement.
pub const BANK_STATEMENT_PREVIEW: usize = 10;

/// Rows shown while checking a column mapping.
pub const MAPPED_PREVIEW: usize = 7;

/// The first `limit` rows, in their original order.
pub fn preview<T>(rows: &[T], limit: usize) -> &[T] {
    &rows[..limit.min(rows.len())]
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn never_longer_than_limit_and_keeps_order(
            rows in prop::collection::vec(any::<u32>(), 0..50),
            limit in 0usize..60,
        ) {
            let shown = preview(&rows, limit);
            prop_assert!(shown.len() <= limit);
            prop_assert_eq!(shown.len(), limit.min(rows.len()));
            prop_assert_eq!(shown, &rows[..shown.len()]);
        }
    }
}
