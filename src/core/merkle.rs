// Merkle commitment over a block's transaction ids

use crate::core::hash_concat;

/// Root returned for a block without transactions
pub const EMPTY_MERKLE_ROOT: &str = "";

/// Reduce an ordered list of transaction ids to a single commitment
///
/// Each layer hashes every *consecutive* pair `(i-1, i)`, so a layer of `n`
/// hashes yields `n-1` hashes. This is a sliding window, not the usual
/// halving tree, and the resulting roots differ from a balanced merkle
/// tree for any input longer than two. Blocks already on disk commit to
/// this exact reduction.
pub fn merkle_root<S: AsRef<str>>(ids: &[S]) -> String {
    let mut layer: Vec<String> = ids.iter().map(|id| id.as_ref().to_string()).collect();

    while layer.len() > 1 {
        layer = layer
            .windows(2)
            .map(|pair| hash_concat(&[&pair[0], &pair[1]]))
            .collect();
    }

    layer
        .pop()
        .unwrap_or_else(|| EMPTY_MERKLE_ROOT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merkle_root_empty() {
        let ids: Vec<String> = vec![];
        assert_eq!(merkle_root(&ids), EMPTY_MERKLE_ROOT);
    }

    #[test]
    fn test_merkle_root_single_tx() {
        assert_eq!(merkle_root(&["abc"]), "abc");
    }

    #[test]
    fn test_merkle_root_two_tx() {
        assert_eq!(merkle_root(&["a", "b"]), hash_concat(&["a", "b"]));
    }

    #[test]
    fn test_merkle_root_sliding_window() {
        // [a, b, c] -> [h(ab), h(bc)] -> [h(h(ab) h(bc))]
        let ab = hash_concat(&["a", "b"]);
        let bc = hash_concat(&["b", "c"]);
        let expected = hash_concat(&[&ab, &bc]);
        assert_eq!(merkle_root(&["a", "b", "c"]), expected);

        // A halving tree would pair (a, b) and (c, c) instead
        let cc = hash_concat(&["c", "c"]);
        assert_ne!(merkle_root(&["a", "b", "c"]), hash_concat(&[&ab, &cc]));
    }

    #[test]
    fn test_merkle_root_deterministic_and_order_sensitive() {
        let ids = ["t1", "t2", "t3", "t4", "t5"];
        assert_eq!(merkle_root(&ids), merkle_root(&ids));

        let reordered = ["t2", "t1", "t3", "t4", "t5"];
        assert_ne!(merkle_root(&ids), merkle_root(&reordered));
    }
}
