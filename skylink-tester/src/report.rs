//! Report generation for scenario sweeps.
use std::time::Duration;

use colored::Colorize;

use crate::scenarios::ScenarioResult;

pub fn console_report(results: &[ScenarioResult], total_duration: Duration) {
    println!();
    println!("{}", "Scenario Results".bright_cyan().bold());
    println!("{}", "================".cyan());

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = total - passed;

    println!("Total runs: {total}");
    println!("Passed: {}", passed.to_string().green());
    println!("Failed: {}", failed.to_string().red());
    if total > 0 {
        #[allow(clippy::cast_precision_loss)]
        let success_rate = (passed as f64 / total as f64) * 100.0;
        println!("Success rate: {success_rate:.1}%");
    }
    println!("Total time: {total_duration:?}");
    println!();

    for result in results {
        let status = if result.passed {
            "PASS".green()
        } else {
            "FAIL".red()
        };
        println!(
            "{status} {} (seed {})",
            result.name.bold(),
            result.seed
        );
        if let Some(error) = &result.error {
            println!("     {}", error.red());
        }
    }
}

pub fn json_report(results: &[ScenarioResult]) -> String {
    serde_json::to_string_pretty(results).unwrap_or_else(|_| "[]".to_string())
}
