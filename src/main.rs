use std::collections::BTreeMap;

use bearing_fix::{Fix, FixTriggerPolicy, Observation, SessionTracker, TriangulationConfig};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

/// Either a list of sync batches or a single batch
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload {
    Batches(Vec<Vec<Observation>>),
    Batch(Vec<Observation>),
}

impl Payload {
    fn into_batches(self) -> Vec<Vec<Observation>> {
        match self {
            Payload::Batches(batches) => batches,
            Payload::Batch(batch) => vec![batch],
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Feed batches through a tracker, print one status line per batch and
/// return the latest fix of every group.
fn replay(
    batches: &[Vec<Observation>],
    config: &TriangulationConfig,
) -> BTreeMap<String, Fix> {
    let mut tracker = SessionTracker::new(FixTriggerPolicy::from_config(config));

    for (i, batch) in batches.iter().enumerate() {
        match tracker.record(batch) {
            Ok(outcome) => println!("batch {}: {}", i + 1, outcome.message()),
            Err(e) => eprintln!("batch {}: rejected: {}", i + 1, e),
        }
    }

    let fixes = tracker
        .groups()
        .into_iter()
        .filter_map(|group| tracker.latest_fix(group).map(|fix| (group.to_string(), *fix)))
        .collect();
    fixes
}

fn demo_batches() -> Vec<Vec<Observation>> {
    let group = "SESSION_2024-05-01T10:00:00";
    vec![
        vec![Observation::new(group, 27.7000, 85.3000, 90.0).with_source("P01")],
        vec![Observation::new(group, 27.6900, 85.3000, 0.0).with_source("P02")],
        vec![Observation::new(group, 27.7500, 85.2500, 140.0).with_source("P03")],
    ]
}

fn print_fixes(fixes: &BTreeMap<String, Fix>) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(fixes)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map_or("bearing-fix", |s| s.as_str());

    if args.len() == 2 && args[1] == "--demo" {
        println!("=== BEARING TRIANGULATION DEMO ===");
        let fixes = replay(&demo_batches(), &TriangulationConfig::default());
        print_fixes(&fixes)?;
        return Ok(());
    }

    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <observations.json> [config.json]", program);
        eprintln!("   or: {} --demo", program);
        return Err("Invalid arguments".into());
    }

    let config = match args.get(2) {
        Some(path) => TriangulationConfig::load_from_file(path)?,
        None => TriangulationConfig::default(),
    };

    let json_data = std::fs::read_to_string(&args[1])?;
    let payload: Payload = serde_json::from_str(&json_data)?;

    let fixes = replay(&payload.into_batches(), &config);
    if fixes.is_empty() {
        eprintln!("No fix yet: more bearings needed.");
    }
    print_fixes(&fixes)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_accepts_batches_and_single_batch() {
        let batches = r#"[
            [{"group_id": "SESSION_1", "lat": 27.70, "lon": 85.30, "bearing": 90.0}],
            [{"group_id": "SESSION_1", "lat": 27.69, "lon": 85.30, "bearing": 0.0, "pango_id": "P02"}]
        ]"#;
        let payload: Payload = serde_json::from_str(batches).unwrap();
        assert_eq!(payload.into_batches().len(), 2);

        let single = r#"[{"group_id": "SESSION_1", "lat": 27.70, "lon": 85.30, "bearing": 90.0}]"#;
        let payload: Payload = serde_json::from_str(single).unwrap();
        let batches = payload.into_batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 1);
    }

    #[test]
    fn test_replay_demo() {
        let fixes = replay(&demo_batches(), &TriangulationConfig::default());
        let fix = fixes.get("SESSION_2024-05-01T10:00:00").unwrap();

        assert_eq!(fix.observations, 3);
        assert!((fix.latitude - 27.70).abs() < 0.01);
        assert!((fix.longitude - 85.30).abs() < 0.01);
    }

    #[test]
    fn test_replay_skips_rejected_batches() {
        let batches = vec![
            vec![Observation::new("SESSION_1", 27.70, 85.30, 90.0)],
            vec![Observation::new("SESSION_1", 27.69, 85.30, 361.0)],
        ];
        let fixes = replay(&batches, &TriangulationConfig::default());
        assert!(fixes.is_empty());
    }
}
