//! Console output formatter for simulation reports

use colored::Colorize;
use poker_application::{RoundReport, SimulationReport};

/// Formats simulation reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete report: every round with its votes and statistics
    pub fn format(report: &SimulationReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Planning Poker Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {} ({})\n",
            "Session:".cyan().bold(),
            report.session_name,
            report.session_id
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Participants:".cyan().bold(),
            report.participants
        ));

        for (index, round) in report.rounds.iter().enumerate() {
            output.push_str(&Self::section_header(&format!(
                "Round {}: {}",
                index + 1,
                round.work_item.title
            )));
            output.push_str(&Self::format_round(round));
        }

        output.push_str(&format!(
            "\n{} {}\n",
            "Final sequence:".dimmed(),
            report.final_sequence_id
        ));
        output.push_str(&Self::footer());

        output
    }

    /// One line per work item with its agreed estimate
    pub fn format_summary(report: &SimulationReport) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            format!("=== {} ===", report.session_name).cyan().bold()
        ));

        let width = report
            .rounds
            .iter()
            .map(|round| round.work_item.title.chars().count())
            .max()
            .unwrap_or(0);

        for round in &report.rounds {
            let marker = if round.summary.consensus {
                "consensus".green()
            } else {
                "split".yellow()
            };
            output.push_str(&format!(
                "  {:<width$}  {:>5}  {}\n",
                round.work_item.title,
                round.agreed_estimate.to_string(),
                marker,
                width = width
            ));
        }

        output
    }

    /// Format as JSON
    pub fn format_json(report: &SimulationReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_round(round: &RoundReport) -> String {
        let mut output = String::new();
        let summary = &round.summary;

        for vote in &round.votes {
            output.push_str(&format!("  {:<16} {}\n", vote.participant, vote.value));
        }
        if round.votes.is_empty() {
            output.push_str(&format!("  {}\n", "(no votes)".dimmed()));
        }

        output.push('\n');
        output.push_str(&format!(
            "  {} {}  {} {}  {} {}\n",
            "Average:".bold(),
            Self::number(summary.average),
            "Median:".bold(),
            Self::number(summary.median),
            "Mode:".bold(),
            Self::number(summary.mode),
        ));

        let consensus = if summary.consensus {
            "yes".green().bold()
        } else {
            "no".yellow().bold()
        };
        output.push_str(&format!("  {} {}", "Consensus:".bold(), consensus));
        if let (Some(min), Some(max)) = (summary.outliers.min, summary.outliers.max) {
            output.push_str(&format!(
                "  {} {} / {}",
                "Outliers:".bold(),
                min,
                max
            ));
        }
        output.push('\n');

        output.push_str(&format!(
            "  {} {}\n",
            "Agreed estimate:".green().bold(),
            round.agreed_estimate
        ));

        output
    }

    fn number(value: Option<f64>) -> String {
        match value {
            Some(n) if n.fract() == 0.0 => format!("{}", n),
            Some(n) => format!("{:.1}", n),
            None => "-".to_string(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poker_application::VoteRecord;
    use poker_domain::{RoundSummary, SessionId, VoteValue, WorkItem, WorkItemId};

    fn report() -> SimulationReport {
        let votes = vec![VoteValue::from(3.0), VoteValue::from(5.0), VoteValue::from(5.0)];
        let summary = RoundSummary::from_votes(&votes, 60.0);
        let agreed_estimate = summary.suggested_estimate();
        SimulationReport {
            session_id: SessionId::new("sim"),
            session_name: "Session sim".to_string(),
            participants: 4,
            rounds: vec![RoundReport {
                work_item: WorkItem {
                    id: WorkItemId::new("w1"),
                    title: "Login page".to_string(),
                    description: None,
                    external_link: None,
                    agreed_estimate: agreed_estimate.clone(),
                },
                votes: ["Bot 1", "Bot 2", "Bot 3"]
                    .iter()
                    .zip(votes)
                    .map(|(name, value)| VoteRecord {
                        participant: name.to_string(),
                        value,
                    })
                    .collect(),
                summary,
                agreed_estimate,
            }],
            final_sequence_id: 42,
        }
    }

    #[test]
    fn test_format_lists_rounds_and_votes() {
        colored::control::set_override(false);
        let output = ConsoleFormatter::format(&report());
        assert!(output.contains("Session sim (sim)"));
        assert!(output.contains("Round 1: Login page"));
        assert!(output.contains("Bot 2"));
        assert!(output.contains("Median: 5"));
        assert!(output.contains("Consensus: yes"));
        assert!(output.contains("Agreed estimate: 5"));
    }

    #[test]
    fn test_format_summary_one_line_per_item() {
        colored::control::set_override(false);
        let output = ConsoleFormatter::format_summary(&report());
        let line = output
            .lines()
            .find(|line| line.contains("Login page"))
            .unwrap();
        assert!(line.contains('5'));
        assert!(line.contains("consensus"));
    }

    #[test]
    fn test_format_json() {
        let json: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_json(&report())).unwrap();
        assert_eq!(json["sessionId"], "sim");
        assert_eq!(json["rounds"][0]["votes"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(ConsoleFormatter::number(Some(5.0)), "5");
        assert_eq!(ConsoleFormatter::number(Some(6.33)), "6.3");
        assert_eq!(ConsoleFormatter::number(None), "-");
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "  "), "  a\n  b");
    }
}
