/// Pick the group that applies to outer position `requested`
///
/// A single group broadcasts to every position; otherwise groups line up
/// one-to-one and a missing group is `None`.
pub fn broadcast_index(outer_len: usize, requested: usize) -> Option<usize> {
    match outer_len {
        0 => None,
        1 => Some(0),
        _ if requested < outer_len => Some(requested),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_group_broadcasts() {
        assert_eq!(broadcast_index(1, 0), Some(0));
        assert_eq!(broadcast_index(1, 7), Some(0));
    }

    #[test]
    fn test_groups_align() {
        assert_eq!(broadcast_index(3, 0), Some(0));
        assert_eq!(broadcast_index(3, 2), Some(2));
        assert_eq!(broadcast_index(3, 3), None);
        assert_eq!(broadcast_index(0, 0), None);
    }
}
