use super::*;

fn global(config: Option<&str>, reference_date: Option<&str>) -> GlobalArgs {
    GlobalArgs {
        verbose: false,
        config: config.map(String::from),
        reference_date: reference_date.map(String::from),
    }
}

#[test]
fn test_reference_date_formats() {
    let expected = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    assert_eq!(
        reference_date(&global(None, Some("2026-03-01"))).unwrap(),
        expected
    );
    assert_eq!(
        reference_date(&global(None, Some("01-03-2026"))).unwrap(),
        expected
    );
    assert!(reference_date(&global(None, Some("March 1st"))).is_err());
}

#[test]
fn test_load_config_from_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.yml");
    std::fs::write(&path, "forecast:\n  simulations: 250\n  seed: 3\n").unwrap();

    let config = load_config(&global(path.to_str(), None)).unwrap();
    assert_eq!(config.forecast.simulations, 250);
    assert_eq!(config.forecast.seed, Some(3));

    let missing = dir.path().join("missing.yml");
    assert!(load_config(&global(missing.to_str(), None)).is_err());
}

#[test]
fn test_run_context_loads_activities() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.json");
    std::fs::write(
        &path,
        r#"[{"id": "A", "name": "Dig", "planned_duration": 3}, {"name": "no id"}]"#,
    )
    .unwrap();
    let config = dir.path().join("riskline.yml");
    std::fs::write(&config, "").unwrap();

    let ctx = RunContext::load(
        path.to_str().unwrap(),
        &global(config.to_str(), Some("2026-01-01")),
    )
    .unwrap();

    assert_eq!(ctx.activities.len(), 1);
    assert_eq!(ctx.load_warnings.len(), 1);
    assert_eq!(ctx.config, EngineConfig::default());
}

#[test]
fn test_run_context_rejects_all_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.json");
    std::fs::write(&path, r#"[{"name": "no id"}]"#).unwrap();
    let config = dir.path().join("riskline.yml");
    std::fs::write(&config, "").unwrap();

    let err = RunContext::load(path.to_str().unwrap(), &global(config.to_str(), None)).unwrap_err();
    assert!(err.to_string().contains("No valid activities"));
}

#[tokio::test]
async fn test_run_blocking_times_out() {
    let slow = run_blocking(Some(0), || std::thread::sleep(Duration::from_millis(300))).await;
    assert!(slow.unwrap_err().to_string().contains("did not finish"));

    let fast = run_blocking(None, || 21 * 2).await.unwrap();
    assert_eq!(fast, 42);
}

#[test]
fn test_fit_truncates() {
    assert_eq!(fit("Foundations", 20), "Foundations");
    assert_eq!(fit("Foundations", 6), "Found~");
}
