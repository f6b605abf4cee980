use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("habitcoach-{nanos}-{file_name}"))
}

fn write_store(path: &PathBuf) {
    let tasks: Vec<serde_json::Value> = (1..=7)
        .map(|day| {
            let completed = day == 2;
            serde_json::json!({
                "id": format!("task-{day}"),
                "day": day,
                "title": format!("Day {day}"),
                "description": "Stretch for ten minutes.",
                "completed": completed,
                "completed_at": completed.then_some("2026-01-02T08:00:00Z"),
                "notes": null,
            })
        })
        .collect();

    let content = serde_json::json!({
        "schema_version": 1,
        "plan": {
            "id": "plan-1",
            "goal": "Stretch every day",
            "reason": "Loosen up",
            "difficulty": "easy",
            "duration": 7,
            "preferred_time": "8pm",
            "daily_tasks": tasks,
            "weekly_checkpoints": [
                {
                    "week": 1,
                    "title": "Week one",
                    "description": "How did it go?",
                    "milestones": []
                }
            ],
            "motivational_messages": [],
            "created_at": "2026-01-01T00:00:00Z"
        },
        "current_day": 1
    });
    std::fs::write(path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

#[test]
fn note_command_sets_notes_and_keeps_completion() {
    let exe = env!("CARGO_BIN_EXE_habit");
    let store_path = temp_path("cli-note.json");
    write_store(&store_path);

    let output = Command::new(exe)
        .args(["note", "2", "shoulders still tight"])
        .env("HABIT_STORE_PATH", &store_path)
        .output()
        .expect("failed to run note command");

    assert!(output.status.success());

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    std::fs::remove_file(&store_path).ok();

    let task = &stored["plan"]["daily_tasks"][1];
    assert_eq!(task["notes"], "shoulders still tight");
    assert_eq!(task["completed"], true);
    assert_eq!(task["completed_at"], "2026-01-02T08:00:00Z");
}

#[test]
fn note_command_rejects_unknown_day() {
    let exe = env!("CARGO_BIN_EXE_habit");
    let store_path = temp_path("cli-note-unknown.json");
    write_store(&store_path);

    let output = Command::new(exe)
        .args(["note", "8", "?"])
        .env("HABIT_STORE_PATH", &store_path)
        .output()
        .expect("failed to run note command");
    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("task_not_found"));
}

#[test]
fn day_command_moves_the_cursor() {
    let exe = env!("CARGO_BIN_EXE_habit");
    let store_path = temp_path("cli-day.json");
    write_store(&store_path);

    let output = Command::new(exe)
        .args(["day", "5"])
        .env("HABIT_STORE_PATH", &store_path)
        .output()
        .expect("failed to run day command");

    assert!(output.status.success());

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert_eq!(stored["current_day"], 5);
}

#[test]
fn day_command_rejects_out_of_range_without_clamping() {
    let exe = env!("CARGO_BIN_EXE_habit");
    let store_path = temp_path("cli-day-range.json");
    write_store(&store_path);

    let output = Command::new(exe)
        .args(["day", "9"])
        .env("HABIT_STORE_PATH", &store_path)
        .output()
        .expect("failed to run day command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid_day"));

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert_eq!(stored["current_day"], 1);
}
