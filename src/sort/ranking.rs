//! Counting of strictly smaller elements.

/// Sorted copy of a participant's column content.
pub fn sorted_reference(column: &[u8]) -> Vec<u8> {
    let mut reference = column.to_vec();
    reference.sort_unstable();
    reference
}

/// For every element of `row_data`, the number of elements of `reference` strictly less than it.
///
/// `reference` must be sorted. Runs on the calling thread, one binary search per element.
pub fn local_rank(reference: &[u8], row_data: &[u8]) -> Vec<usize> {
    debug_assert!(reference.windows(2).all(|w| w[0] <= w[1]));
    row_data
        .iter()
        .map(|c| reference.partition_point(|x| x < c))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_strictly_less() {
        let reference = sorted_reference(b"CABBA");
        assert_eq!(reference, b"AABBC".to_vec());
        assert_eq!(local_rank(&reference, b"ABCD@"), vec![0, 2, 4, 5, 0]);
    }

    #[test]
    fn test_duplicates_do_not_count_themselves() {
        let reference = sorted_reference(b"AAAAAAAA");
        assert_eq!(local_rank(&reference, b"AAAB"), vec![0, 0, 0, 8]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(local_rank(b"ABC", b"").is_empty());
        assert_eq!(local_rank(b"", b"xyz"), vec![0, 0, 0]);
    }
}
