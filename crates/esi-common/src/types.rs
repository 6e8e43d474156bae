use std::collections::HashMap;

use smol_str::SmolStr;

/// Numeric ESI identifier.
///
/// Unique within its resource type (alliance ids never collide with other
/// alliance ids, but may collide with a corporation id).
pub type Id = u64;

/// Secondary keys for resources whose details need more than the id to fetch,
/// such as killmail hashes.
pub type Links = HashMap<Id, SmolStr>;

/// Remove repeated ids, keeping the first occurrence of each.
pub fn dedup_ids(ids: impl IntoIterator<Item = Id>) -> Vec<Id> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        assert_eq!(dedup_ids([3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }

    #[test]
    fn dedup_of_empty_is_empty() {
        assert!(dedup_ids(Vec::new()).is_empty());
    }
}
