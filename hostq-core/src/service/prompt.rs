//! Prompt construction for the generative service.

use crate::domain::{RunRequest, ViewParams};

const PREAMBLE: &str = "You are simulating the output of a quantum optimization run for an \
aerospace-industry dashboard. Respond with a single JSON object of the form \
{\"result\": <RESULT>, \"explanation\": <STRING>} and nothing else.";

/// Full prompt text for one request.
pub fn build(request: &RunRequest) -> String {
    let backend = request.backend.display_name();
    let body = match request.params {
        ViewParams::Portfolio => format!(
            "Simulate a portfolio optimization of 5 to 8 aerospace and defense assets solved \
             as a QUBO on {backend}. RESULT must be an object with \"allocations\" (array of \
             {{\"asset\": string, \"weight\": number}} with weights between 0 and 1 summing to 1), \
             \"expectedReturn\" (annual percent), \"volatility\" (annual percent) and \
             \"sharpeRatio\" (number)."
        ),
        ViewParams::Scheduling(p) => format!(
            "Simulate an optimized schedule of {tasks} tasks named T1..T{tasks} across \
             {resources} resources named R1..R{resources} computed on {backend}. RESULT must be \
             an array of {{\"task\": string, \"resource\": string, \"start\": number, \
             \"end\": number}} with times in hours between 0 and 48, start < end, and no \
             overlapping tasks on the same resource.",
            tasks = p.task_count(),
            resources = p.resource_count(),
        ),
        ViewParams::Risk => format!(
            "Simulate a Conditional Value-at-Risk analysis of a generic aerospace portfolio \
             using quantum amplitude estimation on {backend}. RESULT must be an object with \
             \"VaR95\" (number, percent loss), \"CVaR95\" (number, percent loss, at least VaR95) \
             and \"distribution\" (array of 15 to 25 {{\"value\": number, \"probability\": \
             number}} describing portfolio returns in percent and their probabilities)."
        ),
    };
    format!(
        "{PREAMBLE}\n\n{body}\n\nThe explanation should be two or three sentences describing \
         how {backend} hardware would approach this problem."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{QuantumBackend, SchedulingParams};

    #[test]
    fn scheduling_prompt_names_counts_and_backend() {
        let req = RunRequest::new(
            QuantumBackend::DWave,
            ViewParams::Scheduling(SchedulingParams::new(6, 4)),
        );
        let p = build(&req);
        assert!(p.contains("6 tasks"));
        assert!(p.contains("4 resources"));
        assert!(p.contains("T1..T6"));
        assert!(p.contains("D-Wave"));
    }

    #[test]
    fn risk_prompt_names_wire_fields() {
        let p = build(&RunRequest::new(QuantumBackend::AzureQuantum, ViewParams::Risk));
        assert!(p.contains("\"VaR95\""));
        assert!(p.contains("\"CVaR95\""));
        assert!(p.contains("Azure Quantum"));
    }
}
