mod loader;

use anyhow::Context;
use audit_aggregator::telemetry;
use audit_aggregator::{
    AggregatorConfig, Aggregation, LabeledReport, Recommendation, aggregate_reports, detail_table,
    opportunity_table,
};
use table_view::Table;
use tracing::{Level, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file when one exists.
    dotenvy::dotenv().ok();

    telemetry::try_init("info", Level::INFO).context("install tracing subscriber")?;

    let cfg = AggregatorConfig::from_env().context("load AUDIT_* configuration")?;
    info!(
        reports = cfg.reports.len(),
        dedup = ?cfg.dedup,
        page_size = cfg.page_size,
        "Configuration loaded"
    );
    if cfg.reports.is_empty() {
        warn!("AUDIT_REPORTS is empty; nothing to aggregate");
    }

    let loaded = loader::load_reports(&cfg.reports).await;
    let labeled: Vec<LabeledReport<'_>> = loaded
        .iter()
        .map(|(label, report)| LabeledReport {
            label,
            report: report.as_ref(),
        })
        .collect();

    let agg = aggregate_reports(&labeled, &cfg);
    print_aggregation(&agg, &cfg);

    if let Some(path) = &cfg.output_json {
        loader::write_aggregation(path, &agg).await?;
        info!(path = %path.display(), "Aggregation written");
    }

    Ok(())
}

fn print_aggregation(agg: &Aggregation, cfg: &AggregatorConfig) {
    println!(
        "{} recommendation(s) across [{}]",
        agg.summary.total,
        agg.labels.join(", ")
    );
    for (priority, count) in &agg.summary.by_priority {
        println!("  {priority}: {count}");
    }
    for rec in &agg.recommendations {
        print_recommendation(rec, cfg);
    }
}

fn print_recommendation(rec: &Recommendation, cfg: &AggregatorConfig) {
    let worst = rec
        .worst_score
        .map(|s| format!("{s:.2}"))
        .unwrap_or_else(|| "n/a".into());
    println!();
    println!(
        "[{}] {} ({}) worst={} category={}",
        rec.priority.as_str(),
        rec.title,
        rec.id,
        worst,
        rec.category.as_deref().unwrap_or("-")
    );
    for group in rec.step_groups() {
        println!("  steps ({}): {}", group.key, group.steps.join(" "));
    }
    print_table("details", &detail_table(rec, cfg));
    print_table("opportunities", &opportunity_table(rec, cfg));
}

/// First page of a table as pipe-separated text.
fn print_table<R: table_view::TableRow>(name: &str, table: &Table<'_, R>) {
    let columns = table.visible_columns();
    if table.row_count() == 0 || columns.is_empty() {
        return;
    }
    println!("  {name}:");
    let header: Vec<&str> = columns.iter().map(|c| c.header.as_str()).collect();
    println!("    {}", header.join(" | "));
    for row in table.page_rows() {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| table.display_cell(&row, &c.id).display_text())
            .collect();
        println!("    {}", cells.join(" | "));
    }
    if table.page_count() > 1 {
        println!(
            "    page 1/{} ({} rows)",
            table.page_count(),
            table.filtered_row_count()
        );
    }
}
