//! Text rendering of throughput calculations

use std::fmt;

use crate::calculator::{ThroughputReport, TotalThroughput};
use crate::catalog::RecipeCatalog;
use crate::error::CalcError;

/// A calculation paired with its total-throughput sizing, ready to print
#[derive(Debug)]
pub struct PlanReport<'a> {
    report: &'a ThroughputReport,
    totals: Vec<TotalThroughput>,
}

impl<'a> PlanReport<'a> {
    pub fn new(report: &'a ThroughputReport, catalog: &RecipeCatalog) -> Result<Self, CalcError> {
        Ok(Self {
            report,
            totals: report.summarize_totals(catalog)?,
        })
    }
}

fn format_power(power: Option<f64>) -> String {
    match power {
        Some(p) => format!("{:.1}/min", p),
        None => "no power".to_string(),
    }
}

impl fmt::Display for PlanReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;

        writeln!(f, "=== Throughput Plan ===")?;
        writeln!(f, "Target: {} @ {:.2}/min", report.root, report.target_rate)?;
        writeln!(f)?;

        writeln!(f, "Process chain:")?;
        for record in &report.records {
            let prefix = "  ".repeat(record.depth + 1);
            writeln!(
                f,
                "{}{}x {} (needs {:.2}/min, makes {:.2}/min, {:.1}s cycle, {})",
                prefix,
                record.crafters,
                record.item,
                record.target_rate,
                record.throughput,
                record.recipe.craft_time_seconds,
                format_power(record.power_per_minute()),
            )?;
            for input in &record.inputs {
                let marker = if input.raw { " (raw input)" } else { "" };
                writeln!(
                    f,
                    "{}  <- {} @ {:.2}/min{}",
                    prefix, input.item, input.rate_per_minute, marker
                )?;
            }
        }
        writeln!(f)?;

        writeln!(f, "Total throughput:")?;
        writeln!(
            f,
            "  {:<30} {:>12} {:>9} {:>14}",
            "Item", "Rate/min", "Crafters", "Power/min"
        )?;
        for total in &self.totals {
            let power = total
                .power_per_minute
                .map_or_else(|| "---".to_string(), |p| format!("{:.1}", p));
            writeln!(
                f,
                "  {:<30} {:>12.2} {:>9} {:>14}",
                total.item, total.rate_per_minute, total.crafters, power
            )?;
        }
        writeln!(f)?;

        writeln!(f, "Raw inputs required:")?;
        if report.raw_demand.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for (name, rate) in &report.raw_demand {
            writeln!(f, "  {} @ {:.2}/min", name, rate)?;
        }
        writeln!(f)?;

        writeln!(f, "Chain crafters: {}", report.total_crafters())?;
        writeln!(f, "Chain power:    {:.1}/min", report.total_power())?;

        Ok(())
    }
}
