pub mod grid;
pub mod impact;
mod math;
pub mod realized_cost;
pub mod risk_adjusted;
pub mod trajectory;

pub use grid::TimeGrid;
pub use impact::ImpactParameters;
pub use math::SMALL_KAPPA_HORIZON;
pub use realized_cost::{evaluate_realized_cost, realized_cost, RealizedCostInput};
pub use risk_adjusted::{
    estimate_risk_adjusted_cost, risk_adjusted_cost_per_share, RiskAdjustedCostInput,
    DEFAULT_RISK_AVERSION,
};
pub use trajectory::{optimal_trajectory, solve_trajectory, TrajectoryInput};
