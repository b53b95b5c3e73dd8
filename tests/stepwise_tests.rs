//! Stepwise selection tests.

mod common;

use approx::assert_relative_eq;
use faer::{Col, Mat};
use wq_regress::core::{StepAction, StepwiseOptions};
use wq_regress::data::{Observation, ObservationTable, Parameter};
use wq_regress::solvers::{
    FittedRegressor, OlsRegressor, RegressionError, Regressor, StepwiseRegressor,
};
use wq_regress::utils::select_columns;

fn predictor_names() -> Vec<&'static str> {
    Parameter::PREDICTORS.iter().map(|p| p.header()).collect()
}

/// DBO5 = 2·DQO_TOT exactly, everything else noise.
fn exact_cod_table(n: usize) -> ObservationTable {
    (0..n)
        .map(|i| {
            let cod = 30.0 + 40.0 * common::noise(i, 1);
            Observation::new(
                None,
                [
                    7.0 + common::noise(i, 2),
                    cod,
                    6.0 + common::noise(i, 3),
                    12.0 + 5.0 * common::noise(i, 4),
                    20.0 + 2.0 * common::noise(i, 5),
                    2.0 * cod,
                ],
            )
        })
        .collect()
}

#[test]
fn test_perfectly_correlated_predictor_is_the_only_one_selected() {
    let table = exact_cod_table(40);
    let x = table.design_matrix(&Parameter::PREDICTORS);
    let y = table.target(Parameter::Bod5);

    let fitted = StepwiseRegressor::default()
        .fit_named(&x, &y, &predictor_names())
        .expect("stepwise should succeed");

    assert_eq!(fitted.selected_names(), vec!["DQO_TOT"]);
    assert_relative_eq!(fitted.r_squared(), 1.0, epsilon = 1e-9);
    assert_relative_eq!(fitted.coefficient("DQO_TOT").unwrap(), 2.0, epsilon = 1e-8);
    assert!(fitted.converged());
    assert!(fitted.trace().contains(StepAction::ExactFit));
}

#[test]
fn test_selection_is_deterministic() {
    let table = common::river_table(80, 21);
    let x = table.design_matrix(&Parameter::PREDICTORS);
    let y = table.target(Parameter::Bod5);

    let a = StepwiseRegressor::default()
        .fit_named(&x, &y, &predictor_names())
        .unwrap();
    let b = StepwiseRegressor::default()
        .fit_named(&x, &y, &predictor_names())
        .unwrap();

    assert_eq!(a.selected_names(), b.selected_names());
    assert_eq!(a.trace(), b.trace());
    assert_eq!(a.intercept().to_bits(), b.intercept().to_bits());
}

#[test]
fn test_river_model_selects_cod() {
    let table = common::river_table(80, 21);
    let x = table.design_matrix(&Parameter::PREDICTORS);
    let y = table.target(Parameter::Bod5);

    let fitted = StepwiseRegressor::default()
        .fit_named(&x, &y, &predictor_names())
        .unwrap();

    assert!(fitted.selected_names().contains(&"DQO_TOT"));
    assert!(fitted.r_squared() > 0.8 && fitted.r_squared() <= 1.0);
    for name in fitted.selected_names() {
        let p = fitted.p_value(name).expect("selected predictor has a p-value");
        assert!(p <= 0.10, "{} kept with p = {}", name, p);
    }

    let first = fitted
        .trace()
        .with_action(StepAction::Add)
        .next()
        .expect("at least one predictor entered");
    assert_eq!(first.feature.as_deref(), Some("DQO_TOT"));
}

#[test]
fn test_r_squared_non_decreasing_in_nested_models() {
    let table = common::river_table(60, 5);
    let x = table.design_matrix(&Parameter::PREDICTORS);
    let y = table.target(Parameter::Bod5);

    let mut previous = 0.0;
    let mut columns = Vec::new();
    for j in 0..x.ncols() {
        columns.push(j);
        let fitted = OlsRegressor::default()
            .fit(&select_columns(&x, &columns), &y)
            .expect("fit should succeed");
        let r2 = fitted.r_squared();
        assert!((0.0..=1.0).contains(&r2));
        assert!(r2 + 1e-12 >= previous, "R² fell from {} to {}", previous, r2);
        previous = r2;
    }
}

#[test]
fn test_intercept_only_model_predicts_mean() {
    let n = 30;
    let x = Mat::from_fn(n, 3, |i, j| common::noise(i, 40 + j as u64));
    let y = Col::from_fn(n, |i| 5.0 + common::noise(i, 99));

    let fitted = StepwiseRegressor::builder()
        .threshold_in(1e-8)
        .threshold_out(1e-7)
        .build()
        .unwrap()
        .fit(&x, &y)
        .unwrap();

    assert!(fitted.is_intercept_only());
    let mean = y.iter().sum::<f64>() / n as f64;
    assert_relative_eq!(fitted.intercept(), mean, epsilon = 1e-12);

    let residual_sum: f64 = fitted.result().residuals.iter().sum();
    assert!(residual_sum.abs() < 1e-10);
    assert_eq!(fitted.trace().with_action(StepAction::InterceptOnly).count(), 1);
}

#[test]
fn test_collinear_candidate_is_skipped() {
    let n = 30;
    // Column 2 duplicates column 0
    let x = Mat::from_fn(n, 3, |i, j| match j {
        0 | 2 => i as f64,
        _ => common::noise(i, 7),
    });
    let y = Col::from_fn(n, |i| 1.0 + 0.7 * i as f64 + common::noise(i, 8));

    let fitted = StepwiseRegressor::default()
        .fit_named(&x, &y, &["a", "b", "a_copy"])
        .expect("collinearity must not surface as an error");

    let selected = fitted.selected_names();
    assert!(selected.contains(&"a"));
    assert!(!selected.contains(&"a_copy"));
    assert!(fitted
        .trace()
        .records()
        .iter()
        .any(|r| r.action == StepAction::Singular && r.feature.as_deref() == Some("a_copy")));
}

#[test]
fn test_iteration_limit_is_recorded() {
    let table = common::river_table(60, 11);
    let x = table.design_matrix(&Parameter::PREDICTORS);
    let y = table.target(Parameter::Bod5);

    let options = StepwiseOptions {
        max_iterations: 1,
        ..StepwiseOptions::default()
    };
    let fitted = StepwiseRegressor::new(options)
        .unwrap()
        .fit_named(&x, &y, &predictor_names())
        .unwrap();

    assert_eq!(fitted.iterations(), 1);
    assert!(!fitted.converged());
    assert!(fitted.trace().contains(StepAction::IterationLimit));
}

#[test]
fn test_invalid_thresholds_are_rejected() {
    let options = StepwiseOptions {
        threshold_in: 0.2,
        threshold_out: 0.1,
        ..StepwiseOptions::default()
    };
    assert!(matches!(
        StepwiseRegressor::new(options),
        Err(RegressionError::InvalidOptions(_))
    ));
}

#[test]
fn test_trace_serializes() {
    let table = exact_cod_table(20);
    let x = table.design_matrix(&Parameter::PREDICTORS);
    let y = table.target(Parameter::Bod5);

    let fitted = StepwiseRegressor::default()
        .fit_named(&x, &y, &predictor_names())
        .unwrap();
    let json = serde_json::to_value(fitted.trace()).unwrap();

    let records = json["records"].as_array().expect("records array");
    assert!(!records.is_empty());
    assert!(records.iter().any(|r| r["action"] == "add"));
    assert!(fitted.trace().to_string().contains("DQO_TOT"));
}

#[test]
fn test_single_row_is_intercept_only() {
    let x = Mat::from_fn(1, 5, |_, j| j as f64 + 1.0);
    let y = Col::from_fn(1, |_| 4.2);

    let fitted = StepwiseRegressor::default()
        .fit_named(&x, &y, &predictor_names())
        .expect("a single row is not an error");

    assert!(fitted.is_intercept_only());
    assert_relative_eq!(fitted.intercept(), 4.2, epsilon = 1e-12);
    assert!(fitted.result().mse.is_nan());
    assert!(fitted.result().p_values.is_none());
    assert_eq!(fitted.iterations(), 0);
    assert_eq!(fitted.trace().len(), 1);
    assert!(fitted.trace().contains(StepAction::InterceptOnly));
    assert_relative_eq!(fitted.predict(&x)[0], 4.2, epsilon = 1e-12);
}
