// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use ndarray::parallel::prelude::*;
use ndarray::{s, Array2, ArrayView2, Axis, Zip};

/// Number of output columns processed together by `find_minimum_times`.
pub const DEFAULT_BLOCK_SIZE: usize = 256;

/// Min-plus product of two time matrices sharing a middle interface.
///
/// For `time_ab` of shape `[n, m]` and `time_bc` of shape `[m, p]`, returns
/// `(best_time, best_index)`, both `[n, p]`, with
/// `best_time[i, j] = min_k time_ab[i, k] + time_bc[k, j]` and
/// `best_index[i, j]` the smallest `k` reaching that minimum.
///
/// # Panics
/// Panics if the inner dimensions differ or if the middle interface is empty.
pub fn find_minimum_times(
    time_ab: ArrayView2<'_, f64>,
    time_bc: ArrayView2<'_, f64>,
) -> (Array2<f64>, Array2<usize>) {
    find_minimum_times_blocked(time_ab, time_bc, DEFAULT_BLOCK_SIZE)
}

/// Same as [`find_minimum_times`] with an explicit column block size.
///
/// The block size only affects memory access order; results are identical
/// for every block size and thread count.
///
/// # Panics
/// Panics if the inner dimensions differ, if the middle interface is empty,
/// or if `block_size` is zero.
pub fn find_minimum_times_blocked(
    time_ab: ArrayView2<'_, f64>,
    time_bc: ArrayView2<'_, f64>,
    block_size: usize,
) -> (Array2<f64>, Array2<usize>) {
    let (n, m) = time_ab.dim();
    let (m2, p) = time_bc.dim();
    assert_eq!(
        m, m2,
        "inner dimensions differ: time_ab is [{}, {}], time_bc is [{}, {}]",
        n, m, m2, p
    );
    assert!(m > 0, "middle interface has no point");
    assert!(block_size > 0, "block size must be positive");

    let mut best_time = Array2::<f64>::zeros((n, p));
    let mut best_index = Array2::<usize>::zeros((n, p));
    best_time
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(best_index.axis_iter_mut(Axis(0)))
        .zip(time_ab.axis_iter(Axis(0)))
        .for_each(|((mut time_row, mut index_row), a_row)| {
            for start in (0..p).step_by(block_size) {
                let end = (start + block_size).min(p);
                let mut times = time_row.slice_mut(s![start..end]);
                let mut indices = index_row.slice_mut(s![start..end]);

                // k = 0 seeds the block so infinite times still get index 0
                let a0 = a_row[0];
                Zip::from(&mut times)
                    .and(time_bc.slice(s![0, start..end]))
                    .for_each(|t, &b| *t = a0 + b);
                indices.fill(0);

                for k in 1..m {
                    let a = a_row[k];
                    Zip::from(&mut times)
                        .and(&mut indices)
                        .and(time_bc.slice(s![k, start..end]))
                        .for_each(|t, idx, &b| {
                            let candidate = a + b;
                            // strict: the first k reaching the minimum is kept
                            if candidate < *t {
                                *t = candidate;
                                *idx = k;
                            }
                        });
                }
            }
        });

    (best_time, best_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use proptest::prelude::*;

    fn brute_force(a: &Array2<f64>, b: &Array2<f64>) -> (Array2<f64>, Array2<usize>) {
        let (n, m) = a.dim();
        let p = b.ncols();
        let mut t = Array2::from_elem((n, p), f64::INFINITY);
        let mut idx = Array2::zeros((n, p));
        for i in 0..n {
            for j in 0..p {
                for k in 0..m {
                    let c = a[[i, k]] + b[[k, j]];
                    if c < t[[i, j]] {
                        t[[i, j]] = c;
                        idx[[i, j]] = k;
                    }
                }
            }
        }
        (t, idx)
    }

    #[test]
    fn three_interfaces_geometry() {
        //         A1      A2
        // B1      B2        B3
        //         C1
        // B3 sits slightly to the right so there is a single global minimum.
        let rt2 = 2.0_f64.sqrt();
        let rt5 = 5.0_f64.sqrt();
        let distance1 = array![[rt2, 1.0, rt2 + 0.1], [rt5, rt2, 1.1]];
        let distance2 = array![[rt2], [1.0], [rt2 + 0.1]];

        // Same speed in both media: A1->B2->C1 and A2->B2->C1.
        let (best_times, best_indices) = find_minimum_times(distance1.view(), distance2.view());
        assert!((best_times[[0, 0]] - 2.0).abs() < 1e-12);
        assert!((best_times[[1, 0]] - (1.0 + rt2)).abs() < 1e-12);
        assert_eq!(best_indices, array![[1], [1]]);

        // Medium 2 much faster: spend as little distance as possible in medium 1.
        let time2 = distance2.mapv(|d| d / 50.0);
        let (_, best_indices) = find_minimum_times(distance1.view(), time2.view());
        assert_eq!(best_indices, array![[1], [2]]);
    }

    #[test]
    fn large_shifted_minimum() {
        let (n, m, p) = (300, 301, 302);
        // The unique minimum of row i of time_1 sits on column i and is 0.
        let time_1 = Array2::from_shape_fn((n, m), |(i, j)| ((j + m - i) % m) as f64);
        // Each column of time_2 is constant.
        let time_2 = Array2::from_shape_fn((m, p), |(_, j)| (j * m) as f64);

        let (best_times, best_indices) = find_minimum_times(time_1.view(), time_2.view());
        for i in 0..n {
            for j in 0..p {
                assert_eq!(best_times[[i, j]], (m * j) as f64);
                assert_eq!(best_indices[[i, j]], i);
            }
        }
    }

    #[test]
    fn ties_pick_smallest_index() {
        let a = array![[1.0, 0.0, 0.0, 1.0]];
        let b = array![[0.0], [1.0], [1.0], [0.0]];
        let (t, idx) = find_minimum_times(a.view(), b.view());
        assert_eq!(t[[0, 0]], 1.0);
        assert_eq!(idx[[0, 0]], 0);
    }

    #[test]
    fn infinite_times_keep_first_index() {
        let a = array![[f64::INFINITY, f64::INFINITY]];
        let b = array![[1.0], [2.0]];
        let (t, idx) = find_minimum_times(a.view(), b.view());
        assert!(t[[0, 0]].is_infinite());
        assert_eq!(idx[[0, 0]], 0);
    }

    #[test]
    fn transposed_inputs() {
        let a = Array2::from_shape_fn((4, 3), |(i, k)| ((i * 7 + k * 3) % 5) as f64);
        let b = Array2::from_shape_fn((6, 3), |(j, k)| ((j * 2 + k * 5) % 7) as f64);
        // b.t() is a non-contiguous [3, 6] view
        let (t, idx) = find_minimum_times(a.view(), b.t());
        let (t_ref, idx_ref) = brute_force(&a, &b.t().to_owned());
        assert_eq!(t, t_ref);
        assert_eq!(idx, idx_ref);
    }

    #[test]
    #[should_panic(expected = "inner dimensions differ")]
    fn mismatched_inner_dimension() {
        let a = Array2::<f64>::zeros((2, 3));
        let b = Array2::<f64>::zeros((4, 2));
        let _ = find_minimum_times(a.view(), b.view());
    }

    #[test]
    #[should_panic(expected = "middle interface has no point")]
    fn empty_middle_interface() {
        let a = Array2::<f64>::zeros((2, 0));
        let b = Array2::<f64>::zeros((0, 2));
        let _ = find_minimum_times(a.view(), b.view());
    }

    fn time_matrices() -> impl Strategy<Value = (Array2<f64>, Array2<f64>)> {
        (1usize..6, 1usize..8, 1usize..6).prop_flat_map(|(n, m, p)| {
            // Small integers make exact ties frequent.
            (
                proptest::collection::vec(0u8..5, n * m),
                proptest::collection::vec(0u8..5, m * p),
            )
                .prop_map(move |(a, b)| {
                    let a = Array2::from_shape_vec((n, m), a.into_iter().map(f64::from).collect())
                        .unwrap();
                    let b = Array2::from_shape_vec((m, p), b.into_iter().map(f64::from).collect())
                        .unwrap();
                    (a, b)
                })
        })
    }

    proptest! {
        #[test]
        fn matches_brute_force((a, b) in time_matrices(), block in 1usize..5) {
            let (t, idx) = find_minimum_times_blocked(a.view(), b.view(), block);
            let (t_ref, idx_ref) = brute_force(&a, &b);
            prop_assert_eq!(t, t_ref);
            prop_assert_eq!(idx, idx_ref);
        }
    }
}
