// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use fermat_rays::{FermatPath, FermatSolver, Interface, Points};

fn dist(a: [f64; 3], b: [f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| start + (stop - start) * i as f64 / (n - 1) as f64)
        .collect()
}

/// Three interfaces: a tilted probe, a flat frontwall and a parabolic backwall.
fn interfaces(n: usize, m: usize) -> (Interface, Interface, Interface) {
    let standoff = 11.1;
    let z = 66.6;
    let theta = 30.0_f64.to_radians();

    let x_n: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let x_m = linspace(-(n as f64), 2.0 * n as f64, m);

    let y_a: Vec<f64> = x_n.iter().map(|x| standoff + x * theta.sin()).collect();
    let a = Points::from_xyz("Interface A", &x_n, &y_a, &vec![z; n]).unwrap();
    let b = Points::from_xyz("Interface B", &x_m, &vec![0.0; m], &vec![z; m]).unwrap();
    let y_c: Vec<f64> = x_m.iter().map(|x| -(x - 5.0).powi(2) - 10.0).collect();
    let c = Points::from_xyz("Interface C", &x_m, &y_c, &vec![z; m]).unwrap();

    (a.into_interface(), b.into_interface(), c.into_interface())
}

/// Brute force over every intermediate point: A -> B -> C, C a single point.
#[test]
fn three_interfaces_match_brute_force() {
    let (n, m) = (5, 12);
    let (v1, v2) = (99.0, 130.0);
    let (a, b, c_full) = interfaces(n, m);
    let [cx, cy, cz] = c_full.point(3);
    let c = Points::from_xyz("Interface C0", &[cx], &[cy], &[cz])
        .unwrap()
        .into_interface();

    let path = FermatPath::new(vec![a.clone(), b.clone(), c.clone()], vec![v1, v2]).unwrap();
    let mut solver = FermatSolver::new(vec![path.clone()]).unwrap();
    let result = solver.solve().unwrap();
    let rays = &result[&path];

    assert_eq!(rays.times().shape(), &[n, 1]);
    assert_eq!(rays.indices().shape(), &[3, n, 1]);
    for i in 0..n {
        let mut min_tof = f64::INFINITY;
        let mut best = 0;
        for k in 0..m {
            let tof = dist(a.point(i), b.point(k)) / v1 + dist(b.point(k), c.point(0)) / v2;
            if tof < min_tof {
                min_tof = tof;
                best = k;
            }
        }
        assert!(
            (min_tof - rays.times()[[i, 0]]).abs() < 1e-12,
            "wrong time for ray {}: {} vs {}",
            i,
            rays.times()[[i, 0]],
            min_tof
        );
        assert_eq!(rays.indices()[[1, i, 0]], best, "wrong index for ray {}", i);
    }
}

/// Two paths sharing A -> B, one of them going back up to B.
#[test]
fn three_and_four_interfaces_match_brute_force() {
    let (n, m) = (5, 12);
    let (v1, v2, v3, v4) = (99.0, 130.0, 99.0, 50.0);
    let (a, b, c) = interfaces(n, m);

    let path_1 = FermatPath::new(vec![a.clone(), b.clone(), c.clone()], vec![v1, v2]).unwrap();
    let path_2 = FermatPath::new(
        vec![a.clone(), b.clone(), c.clone(), b.clone()],
        vec![v1, v3, v4],
    )
    .unwrap();

    let mut solver = FermatSolver::new(vec![path_1.clone(), path_2.clone()]).unwrap();
    let result = solver.solve().unwrap();

    assert_eq!(result.len(), 2);
    for path in [&path_1, &path_2] {
        let rays = &result[path];
        assert_eq!(rays.fermat_path(), path);
        assert_eq!(rays.indices().shape(), &[path.num_points_sets(), n, m]);
        assert_eq!(rays.times().shape(), &[n, m]);
        let d = path.num_points_sets();
        for i in 0..n {
            for j in 0..m {
                assert_eq!(rays.indices()[[0, i, j]], i);
                assert_eq!(rays.indices()[[d - 1, i, j]], j);
            }
        }
    }

    let rays_1 = &result[&path_1];
    for i in 0..n {
        for j in 0..m {
            let mut min_tof = f64::INFINITY;
            let mut best = 0;
            for k in 0..m {
                let tof = dist(a.point(i), b.point(k)) / v1 + dist(b.point(k), c.point(j)) / v2;
                if tof < min_tof {
                    min_tof = tof;
                    best = k;
                }
            }
            assert!(
                (min_tof - rays_1.times()[[i, j]]).abs() < 1e-12,
                "wrong time of flight for ray (start={}, end={}) in path 1",
                i,
                j
            );
            assert_eq!(
                rays_1.indices()[[1, i, j]],
                best,
                "wrong indices for ray (start={}, end={}) in path 1",
                i,
                j
            );
        }
    }

    let rays_2 = &result[&path_2];
    for i in 0..n {
        for j in 0..m {
            let mut min_tof = f64::INFINITY;
            let mut best = (0, 0);
            for k1 in 0..m {
                for k2 in 0..m {
                    let tof = dist(a.point(i), b.point(k1)) / v1
                        + dist(b.point(k1), c.point(k2)) / v3
                        + dist(c.point(k2), b.point(j)) / v4;
                    if tof < min_tof {
                        min_tof = tof;
                        best = (k1, k2);
                    }
                }
            }
            assert!(
                (min_tof - rays_2.times()[[i, j]]).abs() < 1e-9,
                "wrong time of flight for ray (start={}, end={}) in path 2",
                i,
                j
            );
            assert_eq!(
                (rays_2.indices()[[1, i, j]], rays_2.indices()[[2, i, j]]),
                best,
                "wrong indices for ray (start={}, end={}) in path 2",
                i,
                j
            );
        }
    }

    // A->B shared, B->C at two velocities, C->B
    assert_eq!(solver.stats().num_segment_times, 4);
}

/// Ray times are the sum of the segment times along the reported route.
#[test]
fn reported_route_reproduces_time() {
    let (a, b, c) = interfaces(6, 20);
    let path = FermatPath::new(vec![a, b.clone(), c, b], vec![1480.0, 6320.0, 3130.0]).unwrap();
    let mut solver = FermatSolver::new(vec![path.clone()])
        .unwrap()
        .with_threads(3)
        .with_block_size(7)
        .unwrap();
    let result = solver.solve().unwrap();
    let rays = &result[&path];

    for i in 0..6 {
        for j in 0..20 {
            let coords = rays.ray_coordinates(i, j);
            let total: f64 = coords
                .windows(2)
                .zip(path.velocities())
                .map(|(w, v)| dist(w[0], w[1]) / v)
                .sum();
            assert!((total - rays.times()[[i, j]]).abs() < 1e-12);
        }
    }
}

/// Solving the reversed path gives the reversed rays of the forward path.
#[test]
fn reverse_path_matches_reversed_rays() {
    let (a, b, c) = interfaces(5, 12);
    let forward = FermatPath::new(vec![a, b, c], vec![99.0, 130.0]).unwrap();
    let backward = forward.reverse();
    let mut solver = FermatSolver::new(vec![forward.clone(), backward.clone()]).unwrap();
    let result = solver.solve().unwrap();

    let reversed = result[&forward].reverse();
    let direct = &result[&backward];
    assert_eq!(reversed.fermat_path(), direct.fermat_path());
    for (x, y) in reversed.times().iter().zip(direct.times()) {
        assert!((x - y).abs() < 1e-12);
    }
}
