//! Branch restriction.

use crate::domain::{BranchSelection, SalesRecord};

/// Keep only the records belonging to the selected branch.
///
/// `BranchSelection::All` returns every record; an unknown branch returns none.
pub fn filter_branch<'a>(records: &'a [SalesRecord], selection: &BranchSelection) -> Vec<&'a SalesRecord> {
    records.iter().filter(|r| selection.matches(&r.branch)).collect()
}
