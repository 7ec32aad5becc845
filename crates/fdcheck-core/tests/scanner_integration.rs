// Integration tests for ProcessScanner and RlimitSource
// These tests read the real /proc of the machine running them

use fdcheck_core::{
    check, CheckSettings, FdCountMode, LimitSource, ProcessScanner, ProcessSource, RlimitSource,
    Status,
};
use std::fs::File;

fn own_pid() -> i32 {
    std::process::id() as i32
}

#[test]
fn test_scan_lists_own_process() {
    let scanner = ProcessScanner::new();
    let records = scanner.processes().expect("/proc should be readable");

    let me = records
        .iter()
        .find(|r| r.pid == own_pid())
        .expect("test process should be listed");

    assert!(!me.name.is_empty());
    assert!(me.open_files >= 3);
}

#[test]
fn test_scan_sorted_by_pid() {
    let records = ProcessScanner::new().processes().unwrap();

    assert!(!records.is_empty());
    for pair in records.windows(2) {
        assert!(pair[0].pid < pair[1].pid);
    }
}

#[test]
fn test_scan_sees_newly_opened_file() {
    let scanner = ProcessScanner::with_count_mode(FdCountMode::Paths);
    let count = |scanner: &ProcessScanner| {
        scanner
            .processes()
            .unwrap()
            .into_iter()
            .find(|r| r.pid == own_pid())
            .map(|r| r.open_files)
            .unwrap()
    };

    let before = count(&scanner);
    let _held: Vec<File> = (0..64)
        .map(|_| File::open("/proc/self/status").unwrap())
        .collect();
    let after = count(&scanner);

    // Other test threads may open or close files concurrently
    assert!(after >= before + 32, "before={} after={}", before, after);
}

#[test]
fn test_paths_mode_never_exceeds_all_mode() {
    let all = ProcessScanner::with_count_mode(FdCountMode::All);
    let paths = ProcessScanner::with_count_mode(FdCountMode::Paths);

    let total = all
        .processes()
        .unwrap()
        .into_iter()
        .find(|r| r.pid == 1);
    let files = paths
        .processes()
        .unwrap()
        .into_iter()
        .find(|r| r.pid == 1);

    // PID 1's fd directory is only readable with privileges
    if let (Some(total), Some(files)) = (total, files) {
        assert!(files.open_files <= total.open_files);
    }
}

#[test]
fn test_rlimit_source_positive() {
    let limit = RlimitSource::new().max_open_files().unwrap();
    assert!(limit > 0);
}

#[test]
fn test_real_check_targeting_self() {
    let name = ProcessScanner::new()
        .processes()
        .unwrap()
        .into_iter()
        .find(|r| r.pid == own_pid())
        .map(|r| r.name)
        .unwrap();

    let settings = CheckSettings {
        process_name: Some(name.clone()),
        ..CheckSettings::default()
    };

    let report = check(&ProcessScanner::new(), &RlimitSource::new(), &settings).unwrap();

    assert_ne!(report.status, Status::Unknown);
    assert!(report.message.starts_with(&format!("Proccess {} with PID", name)));
}

#[test]
#[ignore] // Depends on what else runs on the host
fn test_real_system_sweep_is_ok() {
    let report = check(
        &ProcessScanner::new(),
        &RlimitSource::new(),
        &CheckSettings::default(),
    )
    .unwrap();

    println!("{}", report);
    assert_eq!(report.status, Status::Ok);
}
