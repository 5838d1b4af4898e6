use std::fs;

use chrono::NaiveDate;
use org_recur::{EngineConfig, HostAction};
use org_recur_app::app::{replay, run, AppConfig};
use tempfile::tempdir;

const BATCH: &str = r#"{
    "blocks": [{
        "id": 12,
        "uuid": "61395d2e-7a1b-4f07-9a4f-3c2a4ad0e001",
        "repeated?": true,
        "scheduled": 20210909,
        "format": "markdown",
        "content": "TODO Water plants\nSCHEDULED: <2021-09-09 Thu .+1d>\n:LOGBOOK:\n* State \"DONE\" from \"TODO\" [2021-09-08 Wed 09:00]\n* State \"DONE\" from \"TODO\" [2021-09-09 Thu 10:00]\n:END:"
    }],
    "txData": [
        [12, "content", "TODO Water plants\nSCHEDULED: <2021-09-09 Thu .+1d>\n:LOGBOOK:\n* State \"DONE\" from \"TODO\" [2021-09-08 Wed 09:00]\n:END:", 536870960, false],
        [12, "content", "TODO Water plants\nSCHEDULED: <2021-09-09 Thu .+1d>\n:LOGBOOK:\n* State \"DONE\" from \"TODO\" [2021-09-08 Wed 09:00]\n* State \"DONE\" from \"TODO\" [2021-09-09 Thu 10:00]\n:END:", 536870960, true]
    ]
}"#;

fn config() -> AppConfig {
    let now = NaiveDate::from_ymd_opt(2021, 9, 9)
        .expect("valid date")
        .and_hms_opt(10, 0, 20)
        .expect("valid time");
    AppConfig::new(EngineConfig::default()).with_now(now)
}

#[test]
fn replays_batch_file_into_json_lines() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("batch.json");
    fs::write(&path, BATCH).expect("write fixture");

    let mut out = Vec::new();
    let file = fs::File::open(&path).expect("open fixture");
    let written = replay(&config().with_input(&path), file, &mut out).expect("replay");
    assert_eq!(written, 2);

    let actions: Vec<HostAction> = String::from_utf8(out)
        .expect("utf8 output")
        .lines()
        .map(|line| serde_json::from_str(line).expect("action json"))
        .collect();
    assert_eq!(
        actions[0],
        HostAction::ShowMessage {
            text: "Repeating task successfully updated".to_string()
        }
    );
    let HostAction::UpdateBlock { uuid, content } = &actions[1] else {
        panic!("expected block update, got {:?}", actions[1]);
    };
    assert_eq!(uuid, "61395d2e-7a1b-4f07-9a4f-3c2a4ad0e001");
    assert!(content.contains("\nSCHEDULED: <2021-09-10 Fri .+1d>\n"));
    assert!(content.ends_with("[2021-09-09 Thu 10:00]\n:END:"));
}

#[test]
fn late_replay_produces_no_actions() {
    let late = NaiveDate::from_ymd_opt(2021, 9, 10)
        .expect("valid date")
        .and_hms_opt(8, 0, 0)
        .expect("valid time");
    let mut out = Vec::new();
    let written = replay(&config().with_now(late), BATCH.as_bytes(), &mut out).expect("replay");
    assert_eq!(written, 0);
    assert!(out.is_empty());
}

#[test]
fn missing_input_file_is_reported() {
    let temp = tempdir().expect("tempdir");
    let err = run(config().with_input(temp.path().join("absent.json"))).unwrap_err();
    assert!(err.to_string().contains("failed to open"));
}
