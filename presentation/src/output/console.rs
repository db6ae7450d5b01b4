//! Console output formatter

use super::formatter::OutputFormatter;
use colored::Colorize;
use pact_application::{
    AdaptationOutcome, Alert, AlertSeverity, FailureResponse, HealthReport, PerformanceMetrics,
    ReassignmentOutcome,
};
use pact_domain::{
    AdaptationPlan, CoordinationDetails, CoordinationOutcome, CoordinationReport, ReassignmentPlan,
};

/// Formats results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}\n", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn field(label: &str, value: impl std::fmt::Display) -> String {
        format!("  {:<22} {}\n", format!("{label}:").dimmed(), value)
    }

    fn report(report: &CoordinationReport) -> String {
        let mut output = String::new();
        let layers = &report.layers;

        output.push_str(&Self::section_header("Intent Layers"));
        for intent in &layers.individual {
            output.push_str(&Self::field(
                &format!("L1 {}", intent.agent_id),
                format!("{} (confidence {:.2})", intent.primary_objective, intent.confidence),
            ));
        }
        let roles = layers
            .co_intent
            .role_definitions
            .iter()
            .map(|(agent, role)| format!("{agent}={role}"))
            .collect::<Vec<_>>()
            .join(", ");
        output.push_str(&Self::field("L2 roles", roles));
        output.push_str(&Self::field(
            "L2 negotiation",
            format!("{} round(s)", layers.co_intent.negotiation_rounds),
        ));
        output.push_str(&Self::field("L3 mission", &layers.core_intent.mission_id));
        output.push_str(&Self::field(
            "L4 partnership",
            &layers.collab_intent.partnership_id,
        ));

        output.push_str(&Self::section_header("Execution"));
        for step in &report.execution.steps {
            output.push_str(&format!("  {} {}\n", "*".green(), step.step.bold()));
            output.push_str(&format!("    {}\n", step.details));
        }
        output.push_str(&Self::field(
            "Energy",
            format!(
                "{:.3}{}",
                report.energy_score,
                if report.needs_optimization {
                    " (needs optimization)"
                } else {
                    ""
                }
            ),
        ));
        output.push_str(&Self::field(
            "Processing time",
            format!("{:.2} ms", report.processing_time_ms),
        ));
        output
    }

    fn details(details: &CoordinationDetails) -> String {
        match details {
            CoordinationDetails::NotFound { missing } => Self::field(
                "Unknown agents",
                missing
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            CoordinationDetails::InvalidIntents {
                intent_a_valid,
                intent_b_valid,
            } => {
                Self::field("Agent A intent valid", intent_a_valid)
                    + &Self::field("Agent B intent valid", intent_b_valid)
            }
            CoordinationDetails::NoConsensus {
                negotiation_rounds, ..
            } => Self::field("Negotiation rounds", negotiation_rounds),
            CoordinationDetails::Misaligned {
                reason,
                mission_objective,
            } => {
                Self::field("Violation", reason)
                    + &Self::field("Mission objective", mission_objective)
            }
            CoordinationDetails::EnergyTooLow {
                energy_score,
                threshold,
                recommendation,
            } => {
                Self::field("Energy", format!("{energy_score:.3} < {threshold:.2}"))
                    + &Self::field("Recommendation", recommendation)
            }
            CoordinationDetails::Completed(report) => Self::report(report),
            CoordinationDetails::Fault { message } => Self::field("Fault", message.red()),
        }
    }

    fn reassignment_plan(plan: &ReassignmentPlan) -> String {
        let mut output = String::new();
        for assignment in &plan.objective_redistribution {
            output.push_str(&Self::field(
                &format!("Replacement {}", assignment.agent_id),
                assignment
                    .objectives
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            ));
        }
        let formation = &plan.formation_adjustment;
        output.push_str(&Self::field(
            "Formation",
            format!(
                "{} spacing {:.0} m on {}",
                formation.formation_type, formation.spacing_meters, formation.communication_channel
            ),
        ));
        output.push_str(&Self::field(
            "Confidence",
            format!("{:.2}", plan.confidence_score),
        ));
        output.push_str(&Self::field(
            "Estimated delay",
            format!("{} min", plan.estimated_delay_minutes),
        ));
        output
    }

    fn adaptation_plan(plan: &AdaptationPlan) -> String {
        let mut output = String::new();
        output.push_str(&Self::field("Trigger", &plan.trigger_event));
        output.push_str(&Self::field("Strategy", plan.adaptation_strategy));
        output.push_str(&Self::field(
            "Affected intents",
            plan.affected_intent_ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        ));
        output.push_str(&Self::field(
            "Success probability",
            format!("{:.2}", plan.success_probability),
        ));
        output.push_str(&Self::field("Risk", plan.estimated_impact.risk_level));
        for assignment in &plan.new_intent_assignments {
            if assignment.alternatives.is_empty() {
                continue;
            }
            output.push_str(&Self::field(
                &format!("Alternatives {}", assignment.intent_id),
                assignment
                    .alternatives
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            ));
        }
        for step in &plan.execution_steps {
            output.push_str(&format!(
                "  {}. {} {}\n",
                step.step,
                step.action.to_string().bold(),
                format!("({}s)", step.estimated_duration_secs).dimmed()
            ));
        }
        output
    }

    fn adaptation(outcome: &AdaptationOutcome) -> String {
        match outcome {
            AdaptationOutcome::Executed(plan) => {
                format!("{}\n", "Adaptation executed".green().bold()) + &Self::adaptation_plan(plan)
            }
            AdaptationOutcome::Deferred(plan) => {
                format!("{}\n", "Adaptation deferred to operator".yellow().bold())
                    + &Self::adaptation_plan(plan)
            }
            AdaptationOutcome::NotAffected => {
                format!("{}\n", "No intents affected".dimmed())
            }
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_coordination(&self, outcome: &CoordinationOutcome) -> String {
        let mut output = Self::header("Coordination");
        output.push_str(&Self::field("Coordination", &outcome.coordination_id));
        let result = if outcome.is_success() {
            outcome.result.as_str().green().bold()
        } else {
            outcome.result.as_str().red().bold()
        };
        output.push_str(&Self::field(
            "Result",
            format!("{} ({})", result, outcome.result.description()),
        ));
        output.push_str(&Self::details(&outcome.details));
        output
    }

    fn format_failures(&self, responses: &[FailureResponse]) -> String {
        let mut output = Self::header("Failure Response");
        if responses.is_empty() {
            output.push_str(&format!("{}\n", "No failures detected".dimmed()));
            return output;
        }

        for response in responses {
            let record = &response.record;
            output.push_str(&Self::section_header(&format!(
                "{} on mission {}",
                record.agent_id, record.mission_id
            )));
            output.push_str(&Self::field("Last status", record.last_known_status));
            output.push_str(&Self::field(
                "Resources remaining",
                format!("{:.2}", record.estimated_resource_remaining),
            ));

            if let Some(impact) = &response.impact {
                output.push_str(&Self::field(
                    "Affected objectives",
                    impact.affected_objectives.len(),
                ));
                output.push_str(&Self::field(
                    "Probability reduction",
                    format!("{:.2}", impact.clamped_reduction()),
                ));
            }

            let label = match &response.reassignment {
                ReassignmentOutcome::Reassigned(_) => "reassigned".green(),
                ReassignmentOutcome::NoPlan => "escalated: no replacement".red(),
                ReassignmentOutcome::Stale => "stale".yellow(),
                ReassignmentOutcome::Failed(error) => format!("failed: {error}").red(),
            };
            output.push_str(&Self::field("Reassignment", label));
            if let Some(plan) = response.reassignment.plan() {
                output.push_str(&Self::reassignment_plan(plan));
            }

            match &response.adaptation {
                Some(outcome) => output.push_str(&Self::adaptation(outcome)),
                None => output.push_str(&format!("{}\n", "Adaptation failed".red())),
            }
        }
        output
    }

    fn format_adaptation(&self, outcome: &AdaptationOutcome) -> String {
        Self::header("Intent Adaptation") + &Self::adaptation(outcome)
    }

    fn format_health(&self, report: &HealthReport) -> String {
        let health = &report.health;
        let mut output = Self::header("Intent Hierarchy Health");
        output.push_str(&Self::field("Intents", health.total_intents));
        output.push_str(&Self::field("Depth", health.depth));
        output.push_str(&Self::field(
            "Active",
            format!("{:.1}%", health.active_percentage),
        ));
        output.push_str(&Self::field(
            "Average effectiveness",
            format!("{:.2}", health.average_effectiveness),
        ));

        output.push_str(&Self::section_header("By status"));
        for (status, count) in &health.status_distribution {
            output.push_str(&Self::field(status.as_str(), count));
        }
        output.push_str(&Self::section_header("By type"));
        for (intent_type, count) in &health.type_distribution {
            let effectiveness = health
                .effectiveness_by_type
                .get(intent_type)
                .copied()
                .unwrap_or(0.0);
            output.push_str(&Self::field(
                intent_type.as_str(),
                format!("{count} (effectiveness {effectiveness:.2})"),
            ));
        }

        if !report.overdue.is_empty() {
            output.push_str(&Self::section_header("Deadline violations"));
            for id in &report.overdue {
                output.push_str(&format!("  {} {}\n", "!".yellow().bold(), id));
            }
        }
        if !report.issues.is_empty() {
            output.push_str(&Self::section_header("Consistency issues"));
            for issue in &report.issues {
                output.push_str(&format!("  {} {}\n", "!".red().bold(), issue));
            }
        }
        output
    }

    fn format_metrics(&self, metrics: &PerformanceMetrics) -> String {
        let mut output = Self::section_header("Coordination metrics");
        output.push_str(&Self::field("Total", metrics.totals.total_coordinations));
        output.push_str(&Self::field(
            "Successful",
            metrics.totals.successful_coordinations,
        ));
        output.push_str(&Self::field("Failed", metrics.totals.failed_coordinations));
        output.push_str(&Self::field(
            "Success rate",
            format!("{:.1}%", metrics.success_rate * 100.0),
        ));
        output.push_str(&Self::field(
            "Average time",
            format!("{:.2} ms", metrics.totals.average_processing_time_ms),
        ));
        output.push_str(&Self::field("In flight", metrics.active_coordinations));
        output
    }

    fn format_alert(&self, alert: &Alert) -> String {
        let tag = format!("[{}]", alert.as_str());
        let tag = match alert.severity() {
            AlertSeverity::Critical => tag.red().bold(),
            AlertSeverity::Warning => tag.yellow().bold(),
            AlertSeverity::Info => tag.cyan(),
        };
        format!("{} {}", tag, alert.summary())
    }
}
