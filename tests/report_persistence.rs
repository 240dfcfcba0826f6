use std::fs;

use aether_sweep::{store, ErrorCode, SweepAgent, SweepConfig, SweepReport};
use tempfile::TempDir;

fn sweep_in(dir: &std::path::Path, lock_pid: Option<i32>) -> (SweepConfig, SweepReport) {
    let lock = dir.join("empire.lock");
    if let Some(pid) = lock_pid {
        fs::write(&lock, pid.to_string()).unwrap();
    }
    let config = SweepConfig::from_vars(
        [
            ("EMPIRE_LOCK_FILE", lock.display().to_string()),
            ("STRIPE_API_KEY", "pk_live_wrong_prefix".to_string()),
        ],
        dir,
    );
    let report = SweepAgent::new(&config, false).unwrap().run_full_sweep();
    (config, report)
}

#[test]
fn persisted_report_round_trips() {
    let dir = TempDir::new().unwrap();
    let (config, report) = sweep_in(dir.path(), Some(i32::MAX));

    store::save(&report, &config.report_path()).unwrap();
    let loaded = store::load(&config.report_path()).unwrap();

    assert_eq!(loaded.to_value().unwrap(), report.to_value().unwrap());
    assert_eq!(loaded.to_markdown(), report.to_markdown());
}

#[test]
fn last_report_is_not_found_before_first_sweep() {
    let dir = TempDir::new().unwrap();
    let config = SweepConfig::from_vars(Vec::<(String, String)>::new(), dir.path());

    let err = store::load(&config.report_path()).unwrap_err();
    assert_eq!(err.code, ErrorCode::ReportNotFound);
}

#[test]
fn markdown_lists_every_structured_error_and_warning() {
    let dir = TempDir::new().unwrap();
    let (_, report) = sweep_in(dir.path(), Some(i32::MAX));

    let value = report.to_value().unwrap();
    let md = report.to_markdown();
    let errors_at = md.find("## Errors").unwrap();
    let warnings_at = md.find("## Warnings").unwrap();

    for error in value["errors"].as_array().unwrap() {
        let message = error["message"].as_str().unwrap();
        assert!(md[errors_at..warnings_at].contains(message), "missing error {}", message);
    }
    for warning in value["warnings"].as_array().unwrap() {
        let message = warning["message"].as_str().unwrap();
        assert!(md[warnings_at..].contains(message), "missing warning {}", message);
    }

    assert!(md.contains("Stripe configuration issue: STRIPE_API_KEY does not start with sk_ or rk_"));
    assert!(md.contains("🔧 Auto-fixable"));
    assert_eq!(value["summary"]["auto_fixable_errors"], 1);
}
