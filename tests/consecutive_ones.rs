//! Randomized consecutive-ones runs: every column of a matrix built with
//! the property must reduce, and the resulting frontier must give each
//! column a single run of ones.

use std::{iter, panic};

use rand::seq::SliceRandom;
use rand::{thread_rng, Rng, RngCore, SeedableRng};
use rand_pcg::Pcg64;

use pqtree::PQTree;

#[test]
fn consecutive_ones_property() {
    let mut rng = thread_rng();
    for i in 0..500 {
        let seed = rng.next_u64();
        let rows = rng.gen_range(2..=16);
        let cols = rng.gen_range(2..=16);

        if panic::catch_unwind(|| consecutive_ones_case(rows, cols, seed)).is_err() {
            dbg!(i, rows, cols, seed);
            panic!();
        }
    }
}

fn consecutive_ones_case(rows: usize, cols: usize, seed: u64) {
    let mut rng = Pcg64::seed_from_u64(seed);

    // each column is a contiguous run of ones before the shuffle
    let mut data = vec![vec![0u8; cols]; rows];
    for col in 0..cols {
        let s = rng.gen_range(0..rows);
        let e = rng.gen_range((s + 1)..=rows);
        data[s..e].iter_mut().for_each(|row| row[col] = 1);
    }
    data.shuffle(&mut rng);

    let mut tree = PQTree::new(&(0..rows).collect::<Vec<usize>>()).unwrap();
    for col in 0..cols {
        let s: Vec<usize> = (0..rows).filter(|&r| data[r][col] == 1).collect();
        assert!(!s.is_empty());
        tree.reduce(&s).unwrap();
    }

    let frontier = tree.frontier();
    for col in 0..cols {
        let changes = frontier
            .iter()
            .map(|&r| data[r][col])
            .chain(iter::once(0))
            .fold((0, 0), |(prev, acc), curr| (curr, if curr == prev { acc } else { acc + 1 }))
            .1;
        assert_eq!(changes, 2, "column {col} is not a single run in the frontier");
    }
}
