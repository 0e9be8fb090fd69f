//! Set-theoretic helpers over ordered sets, shared with consumers that
//! post-process reduction logs and frontiers.

use std::collections::BTreeSet;

/// Elements present in either set.
pub fn union<T: Ord + Copy>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> BTreeSet<T> {
    a.union(b).copied().collect()
}

/// Elements present in both sets.
pub fn intersection<T: Ord + Copy>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> BTreeSet<T> {
    a.intersection(b).copied().collect()
}

/// Elements of `a` that are not in `b`.
pub fn difference<T: Ord + Copy>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> BTreeSet<T> {
    a.difference(b).copied().collect()
}

/// Membership test.
pub fn contains<T: Ord>(haystack: &BTreeSet<T>, needle: &T) -> bool {
    haystack.contains(needle)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn set(values: &[i32]) -> BTreeSet<i32> {
        values.iter().copied().collect()
    }

    #[test]
    fn basic_algebra() {
        let a = set(&[1, 2, 3]);
        let b = set(&[3, 4]);

        assert_eq!(union(&a, &b), set(&[1, 2, 3, 4]));
        assert_eq!(intersection(&a, &b), set(&[3]));
        assert_eq!(difference(&a, &b), set(&[1, 2]));
        assert_eq!(difference(&b, &a), set(&[4]));
        assert!(contains(&a, &2));
        assert!(!contains(&b, &2));
    }

    #[test]
    fn empty_sets() {
        let empty = set(&[]);
        let a = set(&[1]);

        assert_eq!(union(&empty, &a), a);
        assert_eq!(intersection(&empty, &a), empty);
        assert_eq!(difference(&a, &empty), a);
        assert!(!contains(&empty, &1));
    }
}
