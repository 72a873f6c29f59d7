//! Precision comparison tests between scalar and SIMD sine implementations.
//!
//! This test suite validates that the SIMD sine implementation maintains
//! acceptable precision compared to the standard library scalar
//! implementation, including the documented error growth with |x|.
#![cfg(avx2)]

use std::f32::consts::{PI, TAU};

use packmath::simd::SimdSin;

/// Test precision of SIMD sine against scalar sine for various input ranges.
#[test]
fn test_sine_precision_comparison() {
    let test_cases = vec![
        // Small angles near zero
        vec![0.0f32, 0.1, 0.2, 0.3],
        // Quarter circle
        vec![0.5f32, 1.0, 1.2, 1.5],
        // Around π/2
        vec![1.4f32, 1.5, 1.57, 1.6],
        // Around π
        vec![3.0f32, 3.1, PI, 3.2],
        // Around 3π/2
        vec![4.5f32, 4.7, 4.71, 4.8],
        // Around 2π
        vec![6.0f32, 6.2, TAU, 6.3],
        // Negative values
        vec![-0.5f32, -1.0, -1.57, -PI],
        // Larger values
        vec![10.0f32, 15.0, 20.0, 25.0],
        // Mixed range
        vec![-10.0f32, -5.0, 0.0, 5.0],
    ];

    for (i, test_case) in test_cases.iter().enumerate() {
        println!("Testing case {}: {:?}", i + 1, test_case);

        let scalar_results: Vec<f32> = test_case.iter().map(|x| x.sin()).collect();
        let simd_results = test_case.as_slice().simd_sin();

        assert_eq!(
            scalar_results.len(),
            simd_results.len(),
            "Result vectors have different lengths"
        );

        for (j, (&scalar_val, &simd_val)) in
            scalar_results.iter().zip(simd_results.iter()).enumerate()
        {
            let input_val = test_case[j];
            let absolute_error = (scalar_val - simd_val).abs();

            println!(
                "  Input: {input_val:.6}, Scalar: {scalar_val:.8}, SIMD: {simd_val:.8}, Abs Error: {absolute_error:.2e}"
            );

            // The interpolants are minimax fits with ~1e-7 worst case near
            // the origin; modest slack for the reduction rounding.
            assert!(
                absolute_error < 1e-5,
                "Precision error too large for input {input_val}: scalar={scalar_val}, simd={simd_val}, abs_error={absolute_error:.2e}"
            );
        }
    }
}

/// Test precision with randomly generated inputs across [-1000, 1000].
///
/// The approximation error grows with |x| as range-reduction rounding
/// accumulates; the bound below scales accordingly.
#[test]
fn test_sine_precision_random_inputs() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(12345);
    let test_size = 4000;

    let inputs: Vec<f32> = (0..test_size)
        .map(|_| rng.random_range(-1000.0f32..=1000.0))
        .collect();

    let scalar_results: Vec<f32> = inputs.iter().map(|x| x.sin()).collect();
    let simd_results = inputs.as_slice().simd_sin();

    let mut max_abs_error = 0.0f32;

    for (i, (&scalar_val, &simd_val)) in scalar_results.iter().zip(simd_results.iter()).enumerate()
    {
        let input_val = inputs[i];
        let absolute_error = (scalar_val - simd_val).abs();

        max_abs_error = max_abs_error.max(absolute_error);

        // Magnitude-dependent bound: ~1e-7 near the origin, growing with |x|.
        let bound = 1e-6 + input_val.abs() * 1e-7;
        assert!(
            absolute_error < bound,
            "Precision error too large at index {i}: input={input_val}, scalar={scalar_val}, simd={simd_val}, abs_error={absolute_error:.2e}, bound={bound:.2e}"
        );
    }

    println!("Random precision test summary:");
    println!("  Test size: {test_size}");
    println!("  Max absolute error: {max_abs_error:.2e}");
}

/// Test edge cases at the quarter-period points.
#[test]
fn test_sine_edge_cases() {
    let edge_cases = vec![
        (0.0f32, 0.0f32),                            // sin(0) = 0
        (std::f32::consts::PI / 2.0, 1.0f32),        // sin(π/2) = 1
        (std::f32::consts::PI, 0.0f32),              // sin(π) = 0
        (3.0 * std::f32::consts::PI / 2.0, -1.0f32), // sin(3π/2) = -1
        (2.0 * std::f32::consts::PI, 0.0f32),        // sin(2π) = 0
    ];

    for (input, expected) in edge_cases {
        let input_vec = vec![input];
        let simd_result = input_vec.as_slice().simd_sin()[0];

        let simd_error = (simd_result - expected).abs();

        println!("Edge case: sin({input:.6}) = {simd_result:.8} (expected: {expected:.8}, error: {simd_error:.2e})");

        assert!(
            simd_error < 1e-5,
            "SIMD sine error too large for {input}: {simd_error:.2e}"
        );
    }
}

/// sin(0) must be exactly zero, and sin(-x) must mirror sin(x).
#[test]
fn test_sine_zero_and_odd_symmetry() {
    let zeros = vec![0.0f32; 16];
    for y in zeros.as_slice().simd_sin() {
        assert_eq!(y, 0.0);
    }

    let x: Vec<f32> = (1..=100).map(|i| i as f32 * 0.173).collect();
    let neg_x: Vec<f32> = x.iter().map(|v| -v).collect();

    let pos = x.as_slice().simd_sin();
    let neg = neg_x.as_slice().simd_sin();

    for (i, (p, n)) in pos.iter().zip(neg.iter()).enumerate() {
        assert!(
            (p + n).abs() < 1e-6,
            "odd symmetry violated at index {i}: {p} vs {n}"
        );
    }
}

/// Test precision with very small values near zero.
#[test]
fn test_sine_precision_near_zero() {
    let small_values: Vec<f32> = vec![
        1e-8, 1e-7, 1e-6, 1e-5, 1e-4, 1e-3, 1e-2, 1e-1, -1e-8, -1e-7, -1e-6, -1e-5, -1e-4, -1e-3,
        -1e-2, -1e-1,
    ];

    let scalar_results: Vec<f32> = small_values.iter().map(|x| x.sin()).collect();
    let simd_results = small_values.as_slice().simd_sin();

    for (i, (&scalar_val, &simd_val)) in scalar_results.iter().zip(simd_results.iter()).enumerate()
    {
        let input_val = small_values[i];
        let absolute_error = (scalar_val - simd_val).abs();

        println!(
            "Small value: sin({input_val:.2e}) -> Scalar: {scalar_val:.8}, SIMD: {simd_val:.8}, Error: {absolute_error:.2e}"
        );

        // For small values sin(x) ≈ x
        assert!(
            (simd_val - input_val).abs() < input_val.abs() * 0.1,
            "SIMD sine should be close to input for small values"
        );
        assert!(
            absolute_error < 1e-6,
            "SIMD precision error too large for small input {input_val}: {absolute_error:.2e}"
        );
    }
}

/// Sequential and parallel SIMD paths must agree bit-for-bit, including the
/// masked tail.
#[test]
fn test_sine_parallel_consistency() {
    let inputs: Vec<f32> = (0..1013).map(|i| (i as f32 - 500.0) * 0.11).collect();

    let sequential = inputs.as_slice().simd_sin();
    let parallel = inputs.as_slice().par_simd_sin();

    for (i, (s, p)) in sequential.iter().zip(parallel.iter()).enumerate() {
        assert_eq!(
            s.to_bits(),
            p.to_bits(),
            "sequential/parallel mismatch at index {i}: {s} vs {p}"
        );
    }
}

/// Identical input bit patterns must produce identical output bit patterns.
#[test]
fn test_sine_determinism() {
    let inputs: Vec<f32> = (0..64).map(|i| i as f32 * 0.77 - 25.0).collect();

    let first = inputs.as_slice().simd_sin();
    let second = inputs.as_slice().simd_sin();

    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
}
