//! channelmix - Main CLI Entry Point

use anyhow::{Context, Result};
use channelmix::attribution::{roi_means, summarize, PerformanceSummary, RuleAttribution};
use channelmix::budget::{AllocationPlan, BudgetAllocator};
use channelmix::dataset::MarketingDataset;
use channelmix::report::MixReport;
use channelmix::synthetic::SyntheticFit;
use channelmix::telemetry::{MixEvent, TelemetryCollector, TelemetryDisplay};
use channelmix::{
    cli::{Args, Commands, Config, Verbosity},
    BudgetConstraint, ChannelName, ModelFit,
};
use clap::Parser;
use colored::Colorize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    if let Err(e) = args.validate() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(2);
    }

    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Explicit flags win over the configured default
    let verbosity = if args.quiet || args.verbose > 0 {
        args.verbosity()
    } else {
        Verbosity::from_config(&config.telemetry.default_verbosity).unwrap_or(Verbosity::Normal)
    };

    if !config.telemetry.color_output {
        colored::control::set_override(false);
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| verbosity.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let telemetry = TelemetryCollector::new();
    let result = run(&args, &config, &telemetry);

    TelemetryDisplay::new(telemetry, verbosity).display_summary();

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

fn run(args: &Args, config: &Config, telemetry: &TelemetryCollector) -> Result<()> {
    match &args.command {
        Commands::Aggregate { fit, json } => {
            let fit: ModelFit = read_json(fit)?;
            let summary = aggregate_fit(&fit, telemetry)?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_performance(&summary);
            }
        }

        Commands::Attribute {
            fit,
            rule,
            journey,
            json,
        } => {
            let fit: ModelFit = read_json(fit)?;
            let summary = aggregate_fit(&fit, telemetry)?;

            let journey = if journey.is_empty() {
                config.report.journey_order(summary.channels.keys())
            } else {
                journey.clone()
            };
            info!(rule = %rule, touchpoints = journey.len(), "applying attribution rule");
            let attribution = rule.attribute(&journey, summary.grand_total)?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&attribution)?);
            } else {
                print_attribution(&journey, &attribution);
            }
        }

        Commands::Allocate {
            fit,
            budget,
            constraints,
            fallback_equal,
            json,
        } => {
            let fit: ModelFit = read_json(fit)?;
            let summary = aggregate_fit(&fit, telemetry)?;
            let constraints = load_constraints(constraints.as_deref())?;
            let plan = plan_allocation(config, &summary, *budget, &constraints, *fallback_equal, telemetry)?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print_plan(&plan);
            }
        }

        Commands::Report {
            fit,
            budget,
            constraints,
            output,
        } => {
            let fit: ModelFit = read_json(fit)?;
            let summary = aggregate_fit(&fit, telemetry)?;

            let title = if config.report.company_name.is_empty() {
                config.report.title.clone()
            } else {
                format!("{} - {}", config.report.company_name, config.report.title)
            };

            let plan = match budget {
                Some(budget) => {
                    let constraints = load_constraints(constraints.as_deref())?;
                    Some(plan_allocation(config, &summary, *budget, &constraints, false, telemetry)?)
                }
                None => None,
            };

            let mut report = MixReport::new(title, summary);
            if let Some(plan) = plan {
                report = report.with_allocation(plan);
            }

            match output {
                Some(path) => {
                    std::fs::write(path, report.to_json()?)
                        .with_context(|| format!("Failed to write report to {}", path.display()))?;
                    println!("{} Report {} written to {}", "✓".green(), report.id, path.display());
                }
                None => print!("{}", report.render_text()),
            }
        }

        Commands::Simulate { data, seed, output } => {
            let contents = std::fs::read_to_string(data)
                .with_context(|| format!("Failed to read dataset {}", data.display()))?;
            let dataset = MarketingDataset::from_json_str(&contents, &config.data)?;
            info!(
                rows = dataset.period_count(),
                channels = dataset.channels.len(),
                seed = *seed,
                "generating synthetic fit"
            );

            let fit = SyntheticFit::new(*seed).fit(&dataset);
            let json = serde_json::to_string_pretty(&fit)?;

            match output {
                Some(path) => {
                    std::fs::write(path, json)
                        .with_context(|| format!("Failed to write fit to {}", path.display()))?;
                    println!("{} Synthetic fit written to {}", "✓".green(), path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::Config => {
            match Config::default_path() {
                Some(path) => println!("# {}", path.display()),
                None => println!("# built-in defaults"),
            }
            println!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

fn load_constraints(path: Option<&Path>) -> Result<BTreeMap<ChannelName, BudgetConstraint>> {
    match path {
        Some(path) => read_json(path),
        None => Ok(BTreeMap::new()),
    }
}

fn aggregate_fit(fit: &ModelFit, telemetry: &TelemetryCollector) -> Result<PerformanceSummary> {
    let started = Instant::now();
    let summary = summarize(fit)?;

    telemetry.record(MixEvent::AggregationCompleted {
        channels: summary.channels.len(),
        periods: fit
            .channels
            .values()
            .next()
            .map(|c| c.contribution.len())
            .unwrap_or(0),
        duration: started.elapsed(),
        timestamp: Instant::now(),
    });

    Ok(summary)
}

fn plan_allocation(
    config: &Config,
    summary: &PerformanceSummary,
    budget: f64,
    constraints: &BTreeMap<ChannelName, BudgetConstraint>,
    fallback_equal: bool,
    telemetry: &TelemetryCollector,
) -> Result<AllocationPlan> {
    let allocator = BudgetAllocator::with_config(config.allocator.clone());
    let roi = roi_means(&summary.channels);
    let started = Instant::now();

    match allocator.plan(&roi, budget, constraints, fallback_equal) {
        Ok(plan) => {
            if plan.policy == channelmix::budget::AllocationPolicy::EqualSplit {
                telemetry.record(MixEvent::FallbackApplied {
                    policy: "equal_split".to_string(),
                    timestamp: Instant::now(),
                });
            }
            telemetry.record(MixEvent::AllocationCompleted {
                channels: plan.allocation.len(),
                iterations: plan.allocation.iterations,
                duration: started.elapsed(),
                timestamp: Instant::now(),
            });
            Ok(plan)
        }
        Err(e) => {
            telemetry.record(MixEvent::AllocationFailed {
                reason: e.to_string(),
                timestamp: Instant::now(),
            });
            Err(e.into())
        }
    }
}

fn print_performance(summary: &PerformanceSummary) {
    println!(
        "{}",
        format!(
            "{:<20} {:>14} {:>8} {:>8} {:>18}",
            "Channel", "Contribution", "Share", "ROI", "ROI interval"
        )
        .bold()
    );
    for (name, perf) in summary.ranked() {
        println!(
            "{:<20} {:>14.2} {:>7.1}% {:>8.2} {:>8.2} - {:<7.2}",
            name.cyan(),
            perf.total_contribution,
            perf.contribution_percentage * 100.0,
            perf.roi,
            perf.roi_lower,
            perf.roi_upper
        );
    }
    println!("{:<20} {:>14.2}", "Total".bold(), summary.grand_total);
}

fn print_attribution(journey: &[ChannelName], attribution: &RuleAttribution) {
    println!("{} {}", "Rule:".bold(), attribution.rule);
    println!("{} {}", "Journey:".bold(), journey.join(" -> "));
    println!(
        "{}",
        format!("{:<20} {:>8} {:>14}", "Channel", "Share", "Attributed").bold()
    );
    for (name, share) in &attribution.shares {
        let value = attribution.attributed_values.get(name).copied().unwrap_or(0.0);
        println!("{:<20} {:>7.1}% {:>14.2}", name.cyan(), share * 100.0, value);
    }
    println!("{:<20} {:>8} {:>14.2}", "Total".bold(), "", attribution.total_metric);
}

fn print_plan(plan: &AllocationPlan) {
    println!(
        "{}",
        format!("{:<20} {:>14} {:>8}", "Channel", "Spend", "Share").bold()
    );
    for (name, spend) in plan.allocation.iter() {
        let share = plan.shares.get(name).copied().unwrap_or(0.0);
        println!("{:<20} {:>14.2} {:>7.1}%", name.cyan(), spend, share * 100.0);
    }
    println!("{:<20} {:>14.2}", "Budget".bold(), plan.total_budget);
    println!("{:<20} {:>14.2}", "Expected return".bold(), plan.expected_return);
    println!("{:<20} {:>14.2}", "Blended ROI".bold(), plan.blended_roi());
}
