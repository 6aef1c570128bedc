//! Offline synthetic service.
//!
//! Produces plausible payloads without any network access. Output is a pure
//! function of `(seed, request)`: the RNG is seeded from a BLAKE3 hash of
//! both, so the same inputs always give the same result.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::{OptimizationService, ServiceError};
use crate::domain::{
    Allocation, CvarResult, DistributionPoint, OptimizationResponse, PortfolioResult,
    QuantumBackend, RunPayload, RunRequest, ScheduledTask, SchedulingParams, ViewParams,
};

const ASSETS: [&str; 8] = ["BA", "AIR", "LMT", "RTX", "NOC", "GD", "SAF", "HII"];
const RISK_FREE_PCT: f64 = 2.0;

pub struct SyntheticService {
    seed: u64,
}

impl SyntheticService {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn rng_for(&self, request: &RunRequest) -> StdRng {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.seed.to_le_bytes());
        hasher.update(serde_json::to_string(request).unwrap_or_default().as_bytes());
        StdRng::from_seed(*hasher.finalize().as_bytes())
    }
}

impl OptimizationService for SyntheticService {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn simulate(&self, request: &RunRequest) -> Result<OptimizationResponse, ServiceError> {
        let mut rng = self.rng_for(request);
        let backend = request.backend;
        let (result, explanation) = match request.params {
            ViewParams::Portfolio => (
                RunPayload::Portfolio(portfolio(&mut rng)),
                portfolio_explanation(backend),
            ),
            ViewParams::Scheduling(p) => (
                RunPayload::Scheduling(schedule(&mut rng, p)),
                schedule_explanation(backend, p),
            ),
            ViewParams::Risk => (RunPayload::Risk(risk(&mut rng)), risk_explanation(backend)),
        };
        result.validate()?;
        debug!(view = ?request.view(), "synthetic result generated");
        Ok(OptimizationResponse { result, explanation })
    }
}

fn round_to(x: f64, places: i32) -> f64 {
    let f = 10f64.powi(places);
    (x * f).round() / f
}

fn portfolio(rng: &mut StdRng) -> PortfolioResult {
    let n = rng.gen_range(5..=ASSETS.len());
    let mut assets: Vec<&str> = ASSETS.to_vec();
    assets.shuffle(rng);
    assets.truncate(n);

    let raw: Vec<f64> = (0..n).map(|_| rng.gen_range(0.05..1.0)).collect();
    let total: f64 = raw.iter().sum();
    let mut allocations: Vec<Allocation> = assets
        .iter()
        .zip(&raw)
        .map(|(asset, w)| Allocation {
            asset: asset.to_string(),
            weight: round_to(w / total, 4),
        })
        .collect();
    allocations.sort_by(|a, b| b.weight.total_cmp(&a.weight));

    let expected_return = round_to(rng.gen_range(6.0..14.0), 2);
    let volatility = round_to(rng.gen_range(10.0..22.0), 2);
    PortfolioResult {
        allocations,
        expected_return,
        volatility,
        sharpe_ratio: round_to((expected_return - RISK_FREE_PCT) / volatility, 2),
    }
}

/// Each task goes to the least-loaded resource, so no resource overlaps
/// and the busiest one stays under 48 hours.
fn schedule(rng: &mut StdRng, params: SchedulingParams) -> Vec<ScheduledTask> {
    let resources = params.resource_count() as usize;
    let mut free_at = vec![0.0_f64; resources];
    let mut tasks = Vec::with_capacity(params.task_count() as usize);

    for t in 1..=params.task_count() {
        let least = free_at.iter().copied().fold(f64::INFINITY, f64::min);
        let candidates: Vec<usize> = (0..resources).filter(|&r| free_at[r] == least).collect();
        let r = *candidates.choose(rng).unwrap_or(&0);
        let duration = f64::from(rng.gen_range(3u8..=9));
        let start = free_at[r];
        let end = start + duration;
        free_at[r] = end;
        tasks.push(ScheduledTask::new(format!("T{t}"), format!("R{}", r + 1), start, end));
    }
    tasks
}

fn risk(rng: &mut StdRng) -> CvarResult {
    let mean = rng.gen_range(-0.5..1.5);
    let sd = rng.gen_range(2.5..4.5);
    let values: Vec<f64> = (-10..=10).map(f64::from).collect();
    let weights: Vec<f64> = values
        .iter()
        .map(|v| (-(v - mean).powi(2) / (2.0 * sd * sd)).exp() * rng.gen_range(0.85..1.15))
        .collect();
    let total: f64 = weights.iter().sum();

    let mut distribution: Vec<DistributionPoint> = values
        .iter()
        .zip(&weights)
        .map(|(&value, w)| DistributionPoint {
            value,
            probability: round_to(w / total, 4),
        })
        .collect();

    let (var95, cvar95) = tail_metrics(&distribution, 0.05);
    // unsorted on purpose: consumers sort before charting
    distribution.shuffle(rng);

    CvarResult {
        var95: round_to(var95, 2),
        cvar95: round_to(cvar95, 2),
        distribution,
    }
}

/// VaR and CVaR at tail probability `alpha`, as positive loss percentages.
fn tail_metrics(distribution: &[DistributionPoint], alpha: f64) -> (f64, f64) {
    let mut sorted = distribution.to_vec();
    sorted.sort_by(|a, b| a.value.total_cmp(&b.value));

    let mut cumulative = 0.0;
    let mut tail_mass = 0.0;
    let mut tail_sum = 0.0;
    let mut var = sorted.first().map(|p| p.value).unwrap_or(0.0);
    for p in &sorted {
        let take = p.probability.min(alpha - cumulative).max(0.0);
        tail_mass += take;
        tail_sum += take * p.value;
        cumulative += p.probability;
        var = p.value;
        if cumulative >= alpha {
            break;
        }
    }
    let cvar = if tail_mass > 0.0 { tail_sum / tail_mass } else { var };
    (-var, -cvar)
}

fn portfolio_explanation(backend: QuantumBackend) -> String {
    format!(
        "The allocation problem was encoded as a QUBO over discretised asset weights and \
         sampled on {}. Low-energy samples were filtered for the budget constraint and the \
         best mean-variance trade-off was kept.",
        backend.display_name()
    )
}

fn schedule_explanation(backend: QuantumBackend, p: SchedulingParams) -> String {
    format!(
        "Assigning {} tasks to {} resources was mapped to a constrained binary model on {}. \
         Penalty terms forbid overlapping tasks on a resource while the objective minimises \
         the makespan.",
        p.task_count(),
        p.resource_count(),
        backend.display_name()
    )
}

fn risk_explanation(backend: QuantumBackend) -> String {
    format!(
        "Quantum amplitude estimation on {} estimates tail probabilities with quadratically \
         fewer samples than classical Monte Carlo. The 95% VaR marks the loss threshold and \
         CVaR averages the losses beyond it.",
        backend.display_name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(params: ViewParams) -> RunRequest {
        RunRequest::new(QuantumBackend::Willow, params)
    }

    #[test]
    fn deterministic_per_seed() {
        let a = SyntheticService::new(7).simulate(&req(ViewParams::Risk)).unwrap();
        let b = SyntheticService::new(7).simulate(&req(ViewParams::Risk)).unwrap();
        let c = SyntheticService::new(8).simulate(&req(ViewParams::Risk)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn schedule_respects_counts_and_no_overlap() {
        for (tasks, resources) in [(3, 2), (8, 2), (8, 5), (5, 3)] {
            let p = SchedulingParams::new(tasks, resources);
            let resp = SyntheticService::new(1).simulate(&req(ViewParams::Scheduling(p))).unwrap();
            let RunPayload::Scheduling(s) = resp.result else {
                panic!("expected schedule");
            };
            assert_eq!(s.len(), tasks as usize);
            for a in &s {
                assert!(a.end <= 48.0);
                for b in &s {
                    if a.task != b.task && a.resource == b.resource {
                        assert!(a.end <= b.start || b.end <= a.start, "{a:?} overlaps {b:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn risk_metrics_are_ordered() {
        let resp = SyntheticService::new(3).simulate(&req(ViewParams::Risk)).unwrap();
        let RunPayload::Risk(r) = resp.result else {
            panic!("expected risk");
        };
        assert!(r.cvar95 >= r.var95);
        let mass: f64 = r.distribution.iter().map(|p| p.probability).sum();
        assert!((mass - 1.0).abs() < 0.01);
    }

    #[test]
    fn tail_metrics_simple() {
        let d = vec![
            DistributionPoint { value: -10.0, probability: 0.02 },
            DistributionPoint { value: -5.0, probability: 0.08 },
            DistributionPoint { value: 0.0, probability: 0.9 },
        ];
        let (var, cvar) = tail_metrics(&d, 0.05);
        assert_eq!(var, 5.0);
        // 0.02 at -10 and 0.03 at -5
        assert!((cvar - 7.0).abs() < 1e-9);
    }

    #[test]
    fn portfolio_weights_sum_to_one() {
        let resp = SyntheticService::new(11).simulate(&req(ViewParams::Portfolio)).unwrap();
        let RunPayload::Portfolio(p) = resp.result else {
            panic!("expected portfolio");
        };
        assert!((p.total_weight() - 1.0).abs() < 0.001);
        assert!(resp.explanation.contains("Google Willow"));
    }
}
