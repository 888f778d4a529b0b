//! Property tests for the Cholesky factorisation on random SPD matrices.

use pricer_core::math::linalg::CholeskyFactor;
use proptest::prelude::*;

/// `B^T B + shift * I` for a flat row-major `B`.
fn spd(b: &[f64], dim: usize, shift: f64) -> Vec<f64> {
    let mut a = vec![0.0; dim * dim];
    for i in 0..dim {
        for j in 0..dim {
            a[i * dim + j] = (0..dim).map(|k| b[k * dim + i] * b[k * dim + j]).sum();
        }
        a[i * dim + i] += shift;
    }
    a
}

fn matrix_and_rhs() -> impl Strategy<Value = (usize, Vec<f64>, Vec<f64>)> {
    (1usize..8).prop_flat_map(|dim| {
        (
            Just(dim),
            proptest::collection::vec(-2.0..2.0f64, dim * dim),
            proptest::collection::vec(-10.0..10.0f64, dim),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_factor_reconstructs_matrix((dim, b, _) in matrix_and_rhs()) {
        let a = spd(&b, dim, 0.5);
        let factor = CholeskyFactor::factorise(&a, dim).unwrap();

        for i in 0..dim {
            for j in 0..dim {
                let llt: f64 = (0..dim).map(|k| factor.get(i, k) * factor.get(j, k)).sum();
                prop_assert!((llt - a[i * dim + j]).abs() < 1e-9 * (1.0 + a[i * dim + j].abs()));
            }
        }
    }

    #[test]
    fn prop_solve_has_small_residual((dim, b, rhs) in matrix_and_rhs()) {
        let a = spd(&b, dim, 0.5);
        let x = CholeskyFactor::factorise(&a, dim).unwrap().solve(&rhs);

        for i in 0..dim {
            let ax: f64 = (0..dim).map(|j| a[i * dim + j] * x[j]).sum();
            prop_assert!((ax - rhs[i]).abs() < 1e-8 * (1.0 + rhs[i].abs()));
        }
    }
}

#[test]
fn test_indefinite_matrix_rejected() {
    let a = [1.0, 2.0, 2.0, 1.0];
    assert!(CholeskyFactor::factorise(&a, 2).is_err());
}
