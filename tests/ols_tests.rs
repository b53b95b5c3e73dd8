//! Least squares fits of BOD5 on other parameters.

mod common;

use approx::assert_relative_eq;
use faer::{Col, Mat};
use wq_regress::solvers::{FittedRegressor, OlsRegressor, RegressionError, Regressor};

// Exact fits

#[test]
fn test_bod5_proportional_to_cod() {
    // BOD5 = 2 + 0.3 * COD
    let cod = Mat::from_fn(5, 1, |i, _| 40.0 + 10.0 * i as f64);
    let bod5 = Col::from_fn(5, |i| 2.0 + 0.3 * cod[(i, 0)]);

    let fitted = OlsRegressor::default().fit(&cod, &bod5).expect("fit should succeed");

    assert_relative_eq!(fitted.coefficients()[0], 0.3, epsilon = 1e-10);
    assert_relative_eq!(fitted.intercept(), 2.0, epsilon = 1e-10);
    assert_relative_eq!(fitted.r_squared(), 1.0, epsilon = 1e-10);
}

#[test]
fn test_two_predictors() {
    // COD rises linearly, dissolved oxygen falls off quadratically
    let x = Mat::from_fn(10, 2, |i, j| if j == 0 { i as f64 } else { (i * i) as f64 });
    let y = Col::from_fn(10, |i| 1.0 + 2.0 * x[(i, 0)] + 3.0 * x[(i, 1)]);

    let fitted = OlsRegressor::default().fit(&x, &y).expect("fit should succeed");

    assert_relative_eq!(fitted.coefficients()[0], 2.0, epsilon = 1e-8);
    assert_relative_eq!(fitted.coefficients()[1], 3.0, epsilon = 1e-8);
    assert_relative_eq!(fitted.intercept(), 1.0, epsilon = 1e-8);
    assert_relative_eq!(fitted.r_squared(), 1.0, epsilon = 1e-10);
}

#[test]
fn test_two_observations_edge_case() {
    // One slope and an intercept through two samples
    let x = Mat::from_fn(2, 1, |i, _| i as f64);
    let y = Col::from_fn(2, |i| 1.0 + 2.0 * i as f64);

    let fitted = OlsRegressor::default().fit(&x, &y).expect("fit should succeed");

    assert_relative_eq!(fitted.coefficients()[0], 2.0, epsilon = 1e-10);
    assert_relative_eq!(fitted.intercept(), 1.0, epsilon = 1e-10);
    // No residual degrees of freedom, so no inference
    assert!(fitted.result().p_values.is_none());
}

#[test]
fn test_no_features_is_intercept_only() {
    let x = Mat::<f64>::zeros(4, 0);
    let y = Col::from_fn(4, |i| i as f64);

    let fitted = OlsRegressor::default().fit(&x, &y).expect("fit should succeed");

    assert_relative_eq!(fitted.intercept(), 1.5, epsilon = 1e-12);
    let residual_sum: f64 = fitted.result().residuals.iter().sum();
    assert!(residual_sum.abs() < 1e-12);
}

// Singular designs

#[test]
fn test_rank_deficient_matrix() {
    // Second column is twice the first
    let (x, y) = common::generate_collinear_data(10);

    let result = OlsRegressor::default().fit(&x, &y);
    assert!(matches!(result, Err(RegressionError::SingularMatrix)));
    assert!(!OlsRegressor::is_full_rank(&x));
}

#[test]
fn test_constant_column_is_singular() {
    let (x, y) = common::generate_constant_column_data(10);

    let result = OlsRegressor::default().fit(&x, &y);
    assert!(matches!(result, Err(RegressionError::SingularMatrix)));
}

// Noisy fits

#[test]
fn test_r_squared_bounds() {
    let (x, y, _) = common::generate_linear_data(100, 3, 1.0, 0.1, 42);

    let fitted = OlsRegressor::default().fit(&x, &y).expect("fit should succeed");

    assert!(fitted.r_squared() >= 0.0);
    assert!(fitted.r_squared() <= 1.0);
    assert!(fitted.result().adj_r_squared <= fitted.r_squared() + 1e-10);
}

#[test]
fn test_recovers_coefficients() {
    let (x, y, beta) = common::generate_linear_data(200, 3, 5.0, 0.01, 7);

    let fitted = OlsRegressor::default().fit(&x, &y).expect("fit should succeed");

    for j in 0..3 {
        assert_relative_eq!(fitted.coefficients()[j], beta[j], epsilon = 0.05);
    }
    assert_relative_eq!(fitted.intercept(), 5.0, epsilon = 0.05);
}

#[test]
fn test_residual_sum_with_intercept() {
    let (x, y, _) = common::generate_linear_data(50, 2, 5.0, 0.5, 123);

    let fitted = OlsRegressor::default().fit(&x, &y).expect("fit should succeed");

    let residual_sum: f64 = fitted.result().residuals.iter().sum();
    assert!(
        residual_sum.abs() < 1e-10,
        "residuals should sum to zero, got {}",
        residual_sum
    );
}

#[test]
fn test_fitted_values_consistency() {
    let (x, y, _) = common::generate_linear_data(50, 2, 5.0, 0.5, 123);

    let fitted = OlsRegressor::default().fit(&x, &y).expect("fit should succeed");
    let result = fitted.result();

    for i in 0..50 {
        assert_relative_eq!(
            result.residuals[i],
            y[i] - result.fitted_values[i],
            epsilon = 1e-10
        );
    }
}

#[test]
fn test_predict_on_new_data() {
    let x = Mat::from_fn(6, 1, |i, _| i as f64);
    let y = Col::from_fn(6, |i| 1.0 + 0.5 * i as f64);

    let fitted = OlsRegressor::default().fit(&x, &y).expect("fit should succeed");

    let x_new = Mat::from_fn(3, 1, |i, _| (10 + i) as f64);
    let predictions = fitted.predict(&x_new);
    for i in 0..3 {
        assert_relative_eq!(predictions[i], 1.0 + 0.5 * (10 + i) as f64, epsilon = 1e-10);
    }
}

#[test]
fn test_score_method() {
    let (x, y, _) = common::generate_linear_data(40, 2, 1.0, 0.3, 9);

    let fitted = OlsRegressor::default().fit(&x, &y).expect("fit should succeed");
    assert_relative_eq!(fitted.score(&x, &y), fitted.r_squared(), epsilon = 1e-10);
}

// Coefficient inference

#[test]
fn test_inference_statistics() {
    let (x, y, _) = common::generate_linear_data(100, 3, 1.0, 0.5, 42);

    let fitted = OlsRegressor::default().fit(&x, &y).expect("fit should succeed");
    let result = fitted.result();

    assert_eq!(result.n_parameters, 4);
    assert_eq!(result.n_observations, 100);
    assert_relative_eq!(result.rmse, result.mse.sqrt(), epsilon = 1e-12);
    assert!(result.f_pvalue >= 0.0 && result.f_pvalue <= 1.0);

    let se = result.std_errors.as_ref().expect("standard errors");
    let p = result.p_values.as_ref().expect("p-values");
    let lower = result.conf_interval_lower.as_ref().expect("CI lower");
    let upper = result.conf_interval_upper.as_ref().expect("CI upper");
    for j in 0..3 {
        assert!(se[j] > 0.0);
        assert!((0.0..=1.0).contains(&p[j]));
        assert!(lower[j] < result.coefficients[j] && result.coefficients[j] < upper[j]);
    }

    let p_int = result.intercept_p_value.expect("intercept p-value");
    assert!((0.0..=1.0).contains(&p_int));
}

#[test]
fn test_inference_can_be_disabled() {
    let (x, y, _) = common::generate_linear_data(30, 2, 1.0, 0.5, 3);

    let fitted = OlsRegressor::builder()
        .compute_inference(false)
        .build()
        .fit(&x, &y)
        .expect("fit should succeed");

    assert!(fitted.result().std_errors.is_none());
    assert!(fitted.result().p_value(0).is_none());
}

#[test]
fn test_exact_fit_p_value_is_zero() {
    let x = Mat::from_fn(10, 1, |i, _| i as f64);
    let y = Col::from_fn(10, |i| 2.0 * i as f64);

    let fitted = OlsRegressor::default().fit(&x, &y).expect("fit should succeed");
    let p = fitted.result().p_value(0).expect("p-value");
    assert!(p < 1e-10);
    assert!(fitted.result().is_exact_fit());
}

// Rejected inputs

#[test]
fn test_dimension_mismatch() {
    let x = Mat::from_fn(10, 2, |i, j| (i + j) as f64);
    let y = Col::from_fn(5, |i| i as f64);

    let result = OlsRegressor::default().fit(&x, &y);
    assert!(matches!(
        result,
        Err(RegressionError::DimensionMismatch { x_rows: 10, y_len: 5 })
    ));
}

#[test]
fn test_insufficient_observations() {
    // 3 features + intercept need 4 observations
    let x = Mat::from_fn(3, 3, |i, j| (i * 3 + j) as f64);
    let y = Col::from_fn(3, |i| i as f64);

    let result = OlsRegressor::default().fit(&x, &y);
    assert!(matches!(
        result,
        Err(RegressionError::InsufficientObservations { needed: 4, got: 3 })
    ));
}
