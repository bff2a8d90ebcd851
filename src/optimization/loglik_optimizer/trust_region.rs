//! loglik_optimizer::trust_region — derivative-free, bound-constrained solver.
//!
//! Purpose
//! -------
//! Minimize an expensive cost `c(θ)` inside a box without gradients. Each
//! objective evaluation of a Gaussian-field likelihood builds and factorizes
//! an `N × N` covariance, so the solver is frugal with evaluations and
//! treats `c = +∞` (a failed factorization) as a rejected candidate.
//!
//! Key behaviors
//! -------------
//! - Works in the unit cube `u = (θ - lower) / (upper - lower)`; a fixed
//!   parameter (`lower == upper`) is never sampled.
//! - Every iteration samples each free coordinate twice at distance `Δ`
//!   (central when both sides fit in the box, one-sided otherwise) and fits
//!   a separable quadratic model `m(s) = Σ gᵢ sᵢ + ½ cᵢ sᵢ²`.
//! - The box/trust-region subproblem `|sᵢ| ≤ Δ`, `0 ≤ uᵢ + sᵢ ≤ 1` is solved
//!   coordinate-wise in closed form; a sample that returned `+∞` caps steps
//!   in its direction.
//! - The centre always moves to the best point evaluated so far (sample or
//!   model step). The ratio `ρ = actual / predicted` decrease drives `Δ`:
//!   `ρ < 0.25` without any improvement halves it, `ρ > 0.75` with a step on
//!   the trust boundary doubles it (capped at `0.25`).
//!
//! Invariants & assumptions
//! ------------------------
//! - `center_cost` is non-increasing across iterations, so argmin's
//!   best-parameter bookkeeping always equals the current centre.
//! - Each call to `evaluate` checks the evaluation budget first; a run never
//!   spends more than `max_evals` cost evaluations.
//!
//! Conventions
//! -----------
//! - Termination reasons: `SolverConverged` (accepted improvement below
//!   `tol_f`), `SolverExit("trust radius below tolerance")`,
//!   `SolverExit("maximum evaluations reached")`.
use argmin::core::{
    ArgminError, CostFunction, Error, KV, Problem, Solver, State, TerminationReason,
    TerminationStatus,
};
use argmin::kv;
use argmin_math::ArgminL2Norm;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        bounds::ParamBounds,
        traits::Tolerances,
        types::{DEFAULT_FINAL_RADIUS, MAX_RADIUS, Theta, TrustRegionState},
    },
};

const SHRINK_BELOW: f64 = 0.25;
const GROW_ABOVE: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Exit {
    Converged,
    RadiusExhausted,
    BudgetExhausted,
}

/// Quadratic-model trust-region solver over a parameter box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundedTrustRegion {
    bounds: ParamBounds,
    radius: f64,
    radius_end: f64,
    tol_f: Option<f64>,
    max_evals: Option<u64>,
    evals: u64,
    center: Vec<f64>,
    center_cost: f64,
    initial_cost: f64,
    exit: Option<Exit>,
}

impl BoundedTrustRegion {
    /// Create a solver for `bounds` with the given starting radius and
    /// stopping rules. `tols.tol_radius = None` falls back to `1e-8`.
    pub fn new(bounds: ParamBounds, initial_radius: f64, tols: &Tolerances) -> Self {
        Self {
            bounds,
            radius: initial_radius.min(MAX_RADIUS),
            radius_end: tols.tol_radius.unwrap_or(DEFAULT_FINAL_RADIUS),
            tol_f: tols.tol_f,
            max_evals: tols.max_evals.map(|m| m as u64),
            evals: 0,
            center: Vec::new(),
            center_cost: f64::INFINITY,
            initial_cost: f64::INFINITY,
            exit: None,
        }
    }

    /// Cost at the starting point (`+∞` if the start was infeasible).
    pub fn initial_cost(&self) -> f64 {
        self.initial_cost
    }

    /// Current trust radius in unit-cube coordinates.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Evaluations spent so far.
    pub fn evaluations(&self) -> u64 {
        self.evals
    }

    /// Evaluate the cost at unit-cube point `u`; `None` once the budget is spent.
    fn evaluate<O>(&mut self, problem: &mut Problem<O>, u: &[f64]) -> Result<Option<f64>, Error>
    where
        O: CostFunction<Param = Theta, Output = f64>,
    {
        if let Some(max) = self.max_evals {
            if self.evals >= max {
                self.exit = Some(Exit::BudgetExhausted);
                return Ok(None);
            }
        }
        self.evals += 1;
        let theta = self.bounds.from_unit(u);
        Ok(Some(problem.cost(&theta)?))
    }

    fn shifted(&self, index: usize, offset: f64) -> Vec<f64> {
        let mut u = self.center.clone();
        u[index] = (u[index] + offset).clamp(0.0, 1.0);
        u
    }

    fn state_for_center(&self, state: TrustRegionState) -> TrustRegionState {
        state.param(self.bounds.from_unit(&self.center)).cost(self.center_cost)
    }
}

/// Per-coordinate model and admissible step interval.
#[derive(Debug, Clone, Copy)]
struct CoordinateModel {
    g: f64,
    c: f64,
    lo: f64,
    hi: f64,
}

impl CoordinateModel {
    fn frozen() -> Self {
        Self { g: 0.0, c: 0.0, lo: 0.0, hi: 0.0 }
    }

    fn value(&self, s: f64) -> f64 {
        self.g * s + 0.5 * self.c * s * s
    }

    /// Minimizer of the 1-D model on `[lo, hi]`; zero when no decrease exists.
    fn minimize(&self) -> f64 {
        if self.lo >= self.hi {
            return 0.0;
        }
        let s = if self.c > 0.0 {
            (-self.g / self.c).clamp(self.lo, self.hi)
        } else if self.value(self.lo) <= self.value(self.hi) {
            self.lo
        } else {
            self.hi
        };
        if self.value(s) < 0.0 { s } else { 0.0 }
    }
}

/// Fit the coordinate model from the centre value and two samples.
///
/// `s1`/`s2` are signed offsets; either they are symmetric (`s2 == -s1`) or
/// one-sided with `s2 == 2 s1`.
fn fit_coordinate(
    f0: f64, s1: f64, f1: f64, s2: f64, f2: f64, lo: f64, hi: f64,
) -> CoordinateModel {
    let mut model = CoordinateModel { g: 0.0, c: 0.0, lo, hi };
    let symmetric = s2 == -s1;
    match (f1.is_finite(), f2.is_finite()) {
        (true, true) => {
            if symmetric {
                model.g = (f1 - f2) / (2.0 * s1);
                model.c = (f1 - 2.0 * f0 + f2) / (s1 * s1);
            } else {
                model.g = (-3.0 * f0 + 4.0 * f1 - f2) / (2.0 * s1);
                model.c = (f0 - 2.0 * f1 + f2) / (s1 * s1);
            }
        }
        (true, false) => {
            model.g = (f1 - f0) / s1;
            cap_towards(&mut model, s2, if symmetric { 0.0 } else { s1 });
        }
        (false, true) => {
            model.g = (f2 - f0) / s2;
            cap_towards(&mut model, s1, 0.0);
        }
        (false, false) => return CoordinateModel::frozen(),
    }
    model
}

/// Forbid steps beyond `limit` in the direction of the rejected offset.
fn cap_towards(model: &mut CoordinateModel, rejected: f64, limit: f64) {
    if rejected > 0.0 {
        model.hi = model.hi.min(limit);
    } else {
        model.lo = model.lo.max(limit);
    }
}

impl<O> Solver<O, TrustRegionState> for BoundedTrustRegion
where
    O: CostFunction<Param = Theta, Output = f64>,
{
    const NAME: &'static str = "Bounded quadratic-model trust region";

    fn init(
        &mut self, problem: &mut Problem<O>, state: TrustRegionState,
    ) -> Result<(TrustRegionState, Option<KV>), Error> {
        let theta0 = state.get_param().cloned().ok_or_else(|| {
            Error::from(ArgminError::NotInitialized {
                text: "initial parameter vector is required".to_string(),
            })
        })?;
        if theta0.len() != self.bounds.len() {
            return Err(OptError::BoundsLengthMismatch {
                expected: theta0.len(),
                actual: self.bounds.len(),
            }
            .into());
        }
        self.center = self.bounds.to_unit(&theta0);
        let center = self.center.clone();
        let f0 = self.evaluate(problem, &center)?.unwrap_or(f64::INFINITY);
        self.initial_cost = f0;
        self.center_cost = f0;

        if !f0.is_finite() {
            // Infeasible start: fall back to the best feasible neighbour.
            let mut best: Option<(Vec<f64>, f64)> = None;
            for i in 0..center.len() {
                if self.bounds.is_fixed(i) {
                    continue;
                }
                for offset in [self.radius, -self.radius] {
                    let u = self.shifted(i, offset);
                    if u[i] == center[i] {
                        continue;
                    }
                    let Some(f) = self.evaluate(problem, &u)? else { break };
                    if f.is_finite() && best.as_ref().map_or(true, |(_, fb)| f < *fb) {
                        best = Some((u, f));
                    }
                }
            }
            match best {
                Some((u, f)) => {
                    self.center = u;
                    self.center_cost = f;
                }
                None => return Err(OptError::NoFeasiblePoint.into()),
            }
        }
        Ok((self.state_for_center(state), None))
    }

    fn next_iter(
        &mut self, problem: &mut Problem<O>, state: TrustRegionState,
    ) -> Result<(TrustRegionState, Option<KV>), Error> {
        let n = self.center.len();
        let delta = self.radius;
        let f0 = self.center_cost;
        let mut models = vec![CoordinateModel::frozen(); n];
        let mut best_u = self.center.clone();
        let mut best_f = f0;

        'sweep: for (i, model) in models.iter_mut().enumerate() {
            if self.bounds.is_fixed(i) {
                continue;
            }
            let ui = self.center[i];
            let (s1, s2) = if ui + delta <= 1.0 && ui - delta >= 0.0 {
                (delta, -delta)
            } else if ui + delta > 1.0 {
                (-delta, -2.0 * delta)
            } else {
                (delta, 2.0 * delta)
            };
            let mut values = [f64::INFINITY; 2];
            for (slot, offset) in values.iter_mut().zip([s1, s2]) {
                let u = self.shifted(i, offset);
                let Some(f) = self.evaluate(problem, &u)? else { break 'sweep };
                if f < best_f {
                    best_f = f;
                    best_u = u;
                }
                *slot = f;
            }
            let lo = (-delta).max(-ui);
            let hi = delta.min(1.0 - ui);
            *model = fit_coordinate(f0, s1, values[0], s2, values[1], lo, hi);
        }

        let mut rho = f64::NEG_INFINITY;
        let mut on_boundary = false;
        if self.exit.is_none() {
            let steps: Vec<f64> = models.iter().map(CoordinateModel::minimize).collect();
            let predicted: f64 = -models.iter().zip(&steps).map(|(m, &s)| m.value(s)).sum::<f64>();
            if predicted > 0.0 {
                let trial: Vec<f64> = self
                    .center
                    .iter()
                    .zip(&steps)
                    .map(|(&u, &s)| (u + s).clamp(0.0, 1.0))
                    .collect();
                if let Some(ft) = self.evaluate(problem, &trial)? {
                    if ft < best_f {
                        best_f = ft;
                        best_u = trial;
                    }
                    rho = if ft.is_finite() { (f0 - ft) / predicted } else { f64::NEG_INFINITY };
                    on_boundary = steps.iter().any(|s| (s.abs() - delta).abs() <= 1e-12 * delta);
                }
            }
        }

        let improvement = f0 - best_f;
        let step: Array1<f64> = best_u.iter().zip(&self.center).map(|(a, b)| a - b).collect();
        let step_norm = step.l2_norm();
        if improvement > 0.0 {
            self.center = best_u;
            self.center_cost = best_f;
        }
        if rho > GROW_ABOVE && on_boundary {
            self.radius = (2.0 * delta).min(MAX_RADIUS);
        } else if rho < SHRINK_BELOW && improvement <= 0.0 {
            self.radius = 0.5 * delta;
        }

        if self.exit.is_none() {
            if improvement > 0.0 && self.tol_f.is_some_and(|tol| improvement < tol) {
                self.exit = Some(Exit::Converged);
            } else if self.radius < self.radius_end {
                self.exit = Some(Exit::RadiusExhausted);
            }
        }
        let kv = kv!("radius" => self.radius; "step_norm" => step_norm;);
        Ok((self.state_for_center(state), Some(kv)))
    }

    fn terminate(&mut self, _state: &TrustRegionState) -> TerminationStatus {
        match self.exit {
            None => TerminationStatus::NotTerminated,
            Some(Exit::Converged) => {
                TerminationStatus::Terminated(TerminationReason::SolverConverged)
            }
            Some(Exit::RadiusExhausted) => TerminationStatus::Terminated(
                TerminationReason::SolverExit("trust radius below tolerance".to_string()),
            ),
            Some(Exit::BudgetExhausted) => TerminationStatus::Terminated(
                TerminationReason::SolverExit("maximum evaluations reached".to_string()),
            ),
        }
    }
}
