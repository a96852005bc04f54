use speed_tiers::TierConfig;
use speed_tiers::compute_speed_tiers;
use speed_tiers::output::{summary_rows, tier_rows};
use speed_tiers::parser::{ReferenceSpecies, UsageSnapshot, parse_pokedex, parse_usage_snapshot};
use speed_tiers::store::SnapshotStore;

const FORMAT: &str = "gen9vgc2025regi";

fn fixtures() -> (UsageSnapshot, ReferenceSpecies) {
    let usage = parse_usage_snapshot(include_bytes!("fixtures/sample_usage.json"))
        .expect("Failed to parse usage fixture");
    let dex = parse_pokedex(include_bytes!("fixtures/pokedex.json"))
        .expect("Failed to parse pokedex fixture");
    (usage, dex)
}

#[test]
fn test_full_pipeline() {
    let (usage, dex) = fixtures();
    let report = compute_speed_tiers(&usage.data, FORMAT, &dex, &TierConfig::default());

    let speeds: Vec<u32> = report.tiers.iter().map(|t| t.speed).collect();
    assert_eq!(speeds, vec![205, 187, 169, 163, 80, 58, 31]);
    assert_eq!(report.membership_count(), 7);

    assert_eq!(report.skipped.unmatched_species, 1);
    assert_eq!(report.skipped.empty_build_distribution, 1);
    assert_eq!(report.skipped.malformed_spreads, 1);
}

#[test]
fn test_multi_modal_species_appear_in_each_tier() {
    let (usage, dex) = fixtures();
    let report = compute_speed_tiers(&usage.data, FORMAT, &dex, &TierConfig::default());

    let flutter: Vec<(u32, f64)> = report
        .tiers
        .iter()
        .flat_map(|t| t.members.iter().map(move |m| (t.speed, m)))
        .filter(|(_, m)| m.name == "Flutter Mane")
        .map(|(speed, m)| (speed, m.speed_usage_ratio))
        .collect();
    assert_eq!(flutter, vec![(205, 0.6), (187, 0.4)]);

    let slow_incin = report.tiers.iter().find(|t| t.speed == 58).unwrap();
    assert_eq!(slow_incin.members[0].spread, "Sassy:252/4/0/0/252/0");
}

#[test]
fn test_dominant_speed_only_for_lopsided_split() {
    let (usage, dex) = fixtures();
    let report = compute_speed_tiers(&usage.data, FORMAT, &dex, &TierConfig::default());

    let urshifu: Vec<u32> = report
        .tiers
        .iter()
        .filter(|t| t.members.iter().any(|m| m.name == "Urshifu-Rapid-Strike"))
        .map(|t| t.speed)
        .collect();
    assert_eq!(urshifu, vec![163]);
}

#[test]
fn test_unmatched_species_contributes_nothing() {
    let (usage, dex) = fixtures();
    let report = compute_speed_tiers(&usage.data, FORMAT, &dex, &TierConfig::default());

    assert!(
        report
            .tiers
            .iter()
            .all(|t| t.members.iter().all(|m| m.name != "Zzyzx" && m.name != "Ditto"))
    );
}

#[test]
fn test_tiers_are_strictly_descending_with_exact_totals() {
    let (usage, dex) = fixtures();
    let report = compute_speed_tiers(&usage.data, FORMAT, &dex, &TierConfig::default());

    for pair in report.tiers.windows(2) {
        assert!(pair[0].speed > pair[1].speed);
    }
    for tier in &report.tiers {
        let sum: f64 = tier.members.iter().map(|m| m.usage).sum();
        assert_eq!(tier.total_usage, sum);
        for pair in tier.members.windows(2) {
            assert!(pair[0].usage >= pair[1].usage);
        }
    }
}

#[test]
fn test_pipeline_is_idempotent() {
    let (usage, dex) = fixtures();
    let config = TierConfig::default();

    let first = compute_speed_tiers(&usage.data, FORMAT, &dex, &config);
    let second = compute_speed_tiers(&usage.data, FORMAT, &dex, &config);

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_singles_format_uses_level_100() {
    let (usage, dex) = fixtures();
    let report = compute_speed_tiers(&usage.data, "gen9ou", &dex, &TierConfig::default());

    // Timid 252 Flutter Mane at level 100: (270 + 31 + 63 + 5) * 1.1
    assert_eq!(report.tiers[0].speed, 405);
}

#[test]
fn test_store_backed_export_rows() {
    let dir = std::env::temp_dir().join("speed_tiers_integration_store");
    let _ = std::fs::remove_dir_all(&dir);
    let store = SnapshotStore::new(&dir);
    store
        .write(
            "2025-09-gen9vgc2025regi-1630.json",
            include_bytes!("fixtures/sample_usage.json"),
            true,
        )
        .unwrap();
    store
        .write("pokedex.json", include_bytes!("fixtures/pokedex.json"), false)
        .unwrap();

    let today = chrono::NaiveDate::from_ymd_opt(2025, 10, 2).unwrap();
    let loaded = store.load_usage(FORMAT, 1630, today).unwrap().unwrap();
    assert_eq!(loaded.snapshot.info.battles, Some(48213));

    let dex = store.load_reference().unwrap();
    let report = compute_speed_tiers(&loaded.snapshot.data, FORMAT, &dex, &TierConfig::default());

    let rows = tier_rows(&report, None);
    assert_eq!(rows.len(), 7);
    assert_eq!(rows[0].pokemon, "Flutter Mane");
    assert_eq!(rows[0].usage_pct, 45.0);
    assert_eq!(rows[0].speed_usage_ratio_pct, 60.0);

    let summary = summary_rows(&report, None);
    assert_eq!(summary.len(), 7);
    assert_eq!(summary[4].top_pokemon, "Incineroar");

    std::fs::remove_dir_all(&dir).unwrap();
}
