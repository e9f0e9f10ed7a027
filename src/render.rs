//! Plain-text rendering of analysis results for the terminal.

use crate::models::{
    AnalysisOutcome, AnalysisReport, CohortFarmer, FieldProfile, GridCohortStatus, HarvestForecast,
    HistoricalSummary, PbwForecast, RiskAlert, RiskFindings,
};
use chrono::NaiveDate;

pub fn render_outcome(outcome: &AnalysisOutcome, field: Option<&FieldProfile>) -> String {
    let mut lines = Vec::new();
    if let Some(field) = field {
        lines.extend(field_header(field));
    }
    match outcome {
        AnalysisOutcome::Full(report) => lines.extend(report_lines(report)),
        AnalysisOutcome::InsectsOnly(summary) | AnalysisOutcome::DiseasesOnly(summary) => {
            lines.extend(history_lines(summary))
        }
    }
    lines.join("\n")
}

fn field_header(field: &FieldProfile) -> Vec<String> {
    let mut lines = vec![format!(
        "Farmer: {} (ID {})",
        field.farmer_name, field.farmer_id
    )];
    if let Some(cluster) = &field.cluster_name {
        lines.push(format!("Cluster: {}", cluster));
    }
    let location = match field.coordinates() {
        Some((lat, lon)) => format!("Grid: {} ({:.4}, {:.4})", field.grid_id, lat, lon),
        None => format!("Grid: {}", field.grid_id),
    };
    lines.push(location);
    lines.push(String::new());
    lines
}

fn report_lines(report: &AnalysisReport) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Analysis for {}, Sowing Date={} ({}), Question Date={}",
            report.location_id, report.sowing_date, report.sowing_window, report.question_date
        ),
        format!("Current Phenophase: {}", report.phenophase),
        format!("Cumulative GDD: {:.1}", report.cumulative_gdd),
        format!("Total Rainfall since Sowing: {:.1} mm", report.total_rainfall_mm),
        format!("Rainfall this Month: {:.1} mm", report.month_rainfall_mm),
        match report.average_temp_c {
            Some(t) => format!("Average Temperature on {}: {:.1}°C", report.question_date, t),
            None => "Average Temperature: N/A".to_string(),
        },
        String::new(),
        "Pink Boll Worm (PBW) Forecast:".to_string(),
    ];

    match &report.pbw {
        PbwForecast::NotActive => {
            lines.push("  Stage: Not active".to_string());
            lines.push(format!("  Weather-Based Risk Score: {:.1}%", 0.0));
        }
        PbwForecast::Active(a) => {
            lines.push(format!("  Stage: {}", a.stage));
            lines.push(format!("  Generation: Generation {}", a.generation));
            lines.push(format!("  Risk Level: {}", a.severity));
            lines.push(format!("  Weather-Based Risk Score: {:.1}%", a.risk_percentage));
        }
    }
    lines.push("  Management Recommendations:".to_string());
    lines.extend(report.pbw.recommendations().iter().map(|r| format!("    - {}", r)));

    lines.push(String::new());
    lines.push("Insect Risk Alerts (Excluding PBW):".to_string());
    lines.extend(alert_lines(&report.insect_alerts, "insect"));

    lines.push(String::new());
    lines.push("Disease Risk Alerts:".to_string());
    lines.extend(alert_lines(&report.disease_alerts, "disease"));

    lines.push(String::new());
    lines.push("Historical Summaries:".to_string());
    lines.extend(history_lines(&report.insect_history));
    lines.push(String::new());
    lines.extend(history_lines(&report.disease_history));

    lines.push(String::new());
    lines.push("Phenological Stage Start Dates:".to_string());
    for reached in &report.phenophase_dates {
        lines.push(format!("  {}: {}", reached.phenophase, reached.date));
    }

    if !report.projected_phenophases.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "Expected Phenophase Dates (based on {:.0}°C avg temp, {:.1} GDD/day):",
            crate::logic::harvest::ASSUMED_AVG_TEMP_C,
            crate::logic::harvest::PROJECTED_DAILY_GDD
        ));
        for projected in &report.projected_phenophases {
            lines.push(format!("  {}: {}", projected.phenophase, projected.date));
        }
    }

    lines.push(String::new());
    lines.push(harvest_line(&report.harvest));

    if !report.notices.is_empty() {
        lines.push(String::new());
        lines.push("Notes:".to_string());
        lines.extend(report.notices.iter().map(|n| format!("  - {}", n)));
    }

    lines
}

fn alert_lines(alerts: &[RiskAlert], noun: &str) -> Vec<String> {
    if alerts.is_empty() {
        return vec![format!("  No significant {} risks detected today.", noun)];
    }
    let mut lines = Vec::new();
    for alert in alerts {
        lines.push(format!(
            "  {} (Risk Score: {:.1}%):",
            alert.name, alert.risk_percentage
        ));
        lines.extend(alert.advisory.iter().map(|a| format!("    - {}", a)));
    }
    lines
}

pub fn history_lines(summary: &HistoricalSummary) -> Vec<String> {
    let noun = summary.kind.as_str().to_lowercase();
    match &summary.findings {
        RiskFindings::NoneDetected => vec![format!(
            "No historical {} risks with risk score >= {} detected since sowing.",
            noun, summary.risk_threshold
        )],
        RiskFindings::Detected(entries) => {
            let mut lines = vec![format!(
                "Historical {} Risk Summary (Risk Score >= {} since sowing):",
                summary.kind, summary.risk_threshold
            )];
            for entry in entries {
                lines.push(format!("{}:", entry.name));
                lines.push(format!("  First Conducive Date: {}", entry.first_conducive_date));
                lines.push(format!("  Conducive Days: {}", entry.conducive_days));
                lines.push(format!(
                    "  Highest Risk: {:.1}% on {}",
                    entry.max_risk_percentage, entry.max_risk_date
                ));
            }
            lines
        }
    }
}

fn harvest_line(harvest: &HarvestForecast) -> String {
    match harvest {
        HarvestForecast::Ready => "Crop is harvest-ready (P10 reached).".to_string(),
        HarvestForecast::Window {
            earliest,
            latest,
            assumed_avg_temp_c,
            daily_gdd,
        } => format!(
            "Harvest Prediction ({:.0}°C avg temp, {:.1} GDD/day): {} to {}",
            assumed_avg_temp_c, daily_gdd, earliest, latest
        ),
    }
}

pub fn render_grid(grid_id: &str, question_date: NaiveDate, statuses: &[GridCohortStatus]) -> String {
    let mut lines = vec![format!("Grid {} as of {}", grid_id, question_date)];
    if statuses.is_empty() {
        lines.push("  No farmers with a sowing date in this grid.".to_string());
    }
    for status in statuses {
        let stage = match &status.phenophase {
            Some(p) => p.to_string(),
            None => "Outside sowing window".to_string(),
        };
        lines.push(format!(
            "  Sown {} ({} farmers): {}",
            status.sowing_date, status.farmer_count, stage
        ));
        if let Some(harvest) = &status.harvest {
            lines.push(format!("    {}", harvest_line(harvest)));
        }
    }
    lines.join("\n")
}

/// Header and farmer roster for one sowing cohort of a grid cell.
pub fn render_cohort(grid_id: &str, sowing_date: NaiveDate, farmers: &[CohortFarmer]) -> String {
    let mut lines = vec![
        format!("Grid: {}", grid_id),
        format!("Sowing Date: {}", sowing_date),
        format!("Number of Farmers: {}", farmers.len()),
        "Farmers in this Grid and Sowing Date:".to_string(),
    ];
    for farmer in farmers {
        lines.push(format!("  {:.0}  {}", farmer.farmer_id, farmer.farmer_name));
    }
    lines.push(String::new());
    lines.join("\n")
}
