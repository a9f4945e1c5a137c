//! Progress reporting for simulated sessions

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use poker_application::{RoundReport, SimulationProgress};
use poker_domain::WorkItem;
use std::sync::Mutex;

/// Reports progress during a simulation with a progress bar over rounds
pub struct ProgressReporter {
    multi: MultiProgress,
    round_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            round_bar: Mutex::new(None),
        }
    }

    fn round_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationProgress for ProgressReporter {
    fn on_participants_ready(&self, participants: usize) {
        let _ = self
            .multi
            .println(format!("{} {} participants joined", "->".cyan(), participants));
    }

    fn on_round_start(&self, item: &WorkItem, _index: usize, total: usize) {
        let Ok(mut guard) = self.round_bar.lock() else {
            return;
        };
        let pb = guard.get_or_insert_with(|| {
            let pb = self.multi.add(ProgressBar::new(total as u64));
            pb.set_style(Self::round_style());
            pb.set_prefix("Estimating");
            pb
        });
        pb.set_message(format!("voting on {}", item.title));
    }

    fn on_round_complete(&self, round: &RoundReport) {
        let Ok(mut guard) = self.round_bar.lock() else {
            return;
        };
        if let Some(pb) = guard.as_ref() {
            pb.inc(1);
            pb.set_message(format!(
                "{} {} = {}",
                "v".green(),
                round.work_item.title,
                round.agreed_estimate
            ));
            if pb.length().is_some_and(|len| pb.position() >= len) {
                pb.finish_with_message(format!("{}", "All items estimated!".green()));
                *guard = None;
            }
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl SimulationProgress for SimpleProgress {
    fn on_participants_ready(&self, participants: usize) {
        println!("{} {} participants joined", "->".cyan(), participants);
    }

    fn on_round_start(&self, item: &WorkItem, index: usize, total: usize) {
        println!(
            "{} {} ({}/{})",
            "->".cyan(),
            item.title.bold(),
            index + 1,
            total
        );
    }

    fn on_round_complete(&self, round: &RoundReport) {
        let marker = if round.summary.consensus {
            "v".green()
        } else {
            "~".yellow()
        };
        println!(
            "  {} {} votes, estimate {}",
            marker,
            round.votes.len(),
            round.agreed_estimate
        );
    }
}
