pub mod heuristic_efficiency;
pub mod off_target_estimator;
