//! Output formatting and persistence for speed tier reports.
//!
//! Supports pretty-printing, JSON serialization, and CSV export.

use anyhow::Result;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use crate::analyzers::types::SpeedTierReport;
use crate::analyzers::utility::round_to;
use crate::parser::NameTable;
use csv::WriterBuilder;

/// One species row of the exported tier table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierRow {
    #[serde(rename = "Speed")]
    pub speed: u32,
    #[serde(rename = "Pokemon")]
    pub pokemon: String,
    #[serde(rename = "Usage (%)")]
    pub usage_pct: f64,
    #[serde(rename = "Nature")]
    pub nature: String,
    #[serde(rename = "Speed EVs")]
    pub speed_evs: u32,
    #[serde(rename = "Base Speed")]
    pub base_speed: u32,
    #[serde(rename = "Spread")]
    pub spread: String,
    #[serde(rename = "Speed Usage Ratio (%)")]
    pub speed_usage_ratio_pct: f64,
}

/// One row per tier for the summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    #[serde(rename = "Speed")]
    pub speed: u32,
    #[serde(rename = "Pokemon Count")]
    pub pokemon_count: usize,
    #[serde(rename = "Total Usage (%)")]
    pub total_usage_pct: f64,
    #[serde(rename = "Top Pokemon")]
    pub top_pokemon: String,
}

/// Looks up a display name, falling back to the label itself.
pub fn display_name<'a>(name: &'a str, translations: Option<&'a NameTable>) -> &'a str {
    translations
        .and_then(|t| t.get(name))
        .map(String::as_str)
        .unwrap_or(name)
}

/// Flattens the report into one row per tier membership, fastest tier first.
pub fn tier_rows(report: &SpeedTierReport, translations: Option<&NameTable>) -> Vec<TierRow> {
    report
        .tiers
        .iter()
        .flat_map(|tier| {
            tier.members.iter().map(move |m| TierRow {
                speed: tier.speed,
                pokemon: display_name(&m.name, translations).to_string(),
                usage_pct: round_to(m.usage * 100.0, 3),
                nature: m.nature.to_string(),
                speed_evs: m.speed_evs,
                base_speed: m.base_speed,
                spread: m.spread.clone(),
                speed_usage_ratio_pct: round_to(m.speed_usage_ratio * 100.0, 1),
            })
        })
        .collect()
}

pub fn summary_rows(report: &SpeedTierReport, translations: Option<&NameTable>) -> Vec<SummaryRow> {
    report
        .tiers
        .iter()
        .map(|tier| SummaryRow {
            speed: tier.speed,
            pokemon_count: tier.members.len(),
            total_usage_pct: round_to(tier.total_usage * 100.0, 3),
            top_pokemon: tier
                .members
                .first()
                .map(|m| display_name(&m.name, translations).to_string())
                .unwrap_or_default(),
        })
        .collect()
}

/// Pairs each format code with its display name, ordered by display name.
///
/// Codes without a known name are listed under the code itself.
pub fn format_listing<'a>(formats: &'a [String], names: &'a NameTable) -> Vec<(&'a str, &'a str)> {
    let mut listed: Vec<(&str, &str)> = formats
        .iter()
        .map(|code| (display_name(code, Some(names)), code.as_str()))
        .collect();
    listed.sort();
    listed
}

/// Builds `Speed_Tiers_{format}_{rating}_{YYYYmmdd_HHMMSS}.{ext}`, replacing
/// characters outside `[A-Za-z0-9_.-]` in the format name with `_`.
pub fn export_file_name(
    format_display_name: &str,
    rating: u32,
    timestamp: NaiveDateTime,
    extension: &str,
) -> String {
    let clean: String = format_display_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "Speed_Tiers_{}_{}_{}.{}",
        clean,
        rating,
        timestamp.format("%Y%m%d_%H%M%S"),
        extension
    )
}

/// Logs the report using Rust's debug pretty-print format.
pub fn print_pretty(report: &SpeedTierReport) {
    debug!("{:#?}", report);
}

/// Logs the report as pretty-printed JSON.
pub fn print_json(report: &SpeedTierReport) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Writes rows to a new CSV file with a header line, replacing any existing file.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    debug!(path = %path.display(), rows = rows.len(), "Writing CSV");

    let mut writer = WriterBuilder::new().has_headers(true).from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes any serializable value as pretty JSON.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    debug!(path = %path.display(), "Writing JSON");
    std::fs::write(path, serde_json::to_vec_pretty(value)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::{SpeedTier, TierMembership};
    use crate::stats::Nature;
    use chrono::NaiveDate;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(name)
    }

    fn member(name: &str, usage: f64) -> TierMembership {
        TierMembership {
            name: name.to_string(),
            usage,
            spread: "Timid:0/0/0/252/4/252".to_string(),
            nature: Nature::Timid,
            speed_evs: 252,
            base_speed: 135,
            speed_usage_ratio: 0.8234,
        }
    }

    fn report() -> SpeedTierReport {
        SpeedTierReport {
            tiers: vec![
                SpeedTier {
                    speed: 205,
                    members: vec![member("Flutter Mane", 0.45678), member("Miraidon", 0.25)],
                    total_usage: 0.70678,
                },
                SpeedTier {
                    speed: 100,
                    members: vec![member("Amoonguss", 0.125)],
                    total_usage: 0.125,
                },
            ],
            skipped: Default::default(),
        }
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&report());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&report()).unwrap();
    }

    #[test]
    fn test_tier_rows_flatten_and_round() {
        let rows = tier_rows(&report(), None);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].speed, 205);
        assert_eq!(rows[0].pokemon, "Flutter Mane");
        assert_eq!(rows[0].usage_pct, 45.678);
        assert_eq!(rows[0].nature, "Timid");
        assert_eq!(rows[0].speed_usage_ratio_pct, 82.3);
        assert_eq!(rows[2].speed, 100);
    }

    #[test]
    fn test_rows_use_translations() {
        let mut table = NameTable::new();
        table.insert("Flutter Mane".to_string(), "振翼发".to_string());

        let rows = tier_rows(&report(), Some(&table));
        assert_eq!(rows[0].pokemon, "振翼发");
        assert_eq!(rows[1].pokemon, "Miraidon");

        let summary = summary_rows(&report(), Some(&table));
        assert_eq!(summary[0].top_pokemon, "振翼发");
        assert_eq!(summary[0].pokemon_count, 2);
        assert_eq!(summary[1].total_usage_pct, 12.5);
    }

    #[test]
    fn test_format_listing_orders_by_display_name() {
        let formats = vec![
            "gen9ou".to_string(),
            "gen9doublesou".to_string(),
            "gen9zu".to_string(),
        ];
        let mut names = NameTable::new();
        names.insert("gen9ou".to_string(), "[Gen 9] OU".to_string());
        names.insert("gen9doublesou".to_string(), "[Gen 9] Doubles OU".to_string());

        assert_eq!(
            format_listing(&formats, &names),
            vec![
                ("[Gen 9] Doubles OU", "gen9doublesou"),
                ("[Gen 9] OU", "gen9ou"),
                ("gen9zu", "gen9zu"),
            ]
        );
    }

    #[test]
    fn test_export_file_name() {
        let ts = NaiveDate::from_ymd_opt(2025, 10, 3)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap();
        assert_eq!(
            export_file_name("[Gen 9] VGC 2025 Reg I", 1630, ts, "csv"),
            "Speed_Tiers__Gen_9__VGC_2025_Reg_I_1630_20251003_140509.csv"
        );
    }

    #[test]
    fn test_write_csv_has_single_header() {
        let path = temp_path("speed_tiers_test_rows.csv");
        let _ = fs::remove_file(&path); // clean up any prior run

        write_csv(&path, &tier_rows(&report(), None)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        // 1 header + 3 data rows
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Speed,Pokemon,Usage (%)"));
        let header_count = content.lines().filter(|l| l.contains("Base Speed")).count();
        assert_eq!(header_count, 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_json_report() {
        let path = temp_path("speed_tiers_test_report.json");
        let _ = fs::remove_file(&path);

        write_json(&path, &report()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["tiers"][0]["speed"], 205);
        assert_eq!(value["tiers"][0]["members"][1]["name"], "Miraidon");
        assert_eq!(value["skipped"]["unmatched_species"], 0);

        fs::remove_file(&path).unwrap();
    }
}
