//! Command dispatch against files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use doctor_a2ui::apply::ApplyArgs;
use doctor_a2ui::eval::EvalArgs;
use doctor_a2ui::render::RenderArgs;
use doctor_a2ui::reply::ReplyArgs;
use doctor_a2ui::tree::TreeArgs;
use doctor_a2ui::validate::ValidateArgs;
use doctor_a2ui::{Cli, Commands, DoctorError, execute};
use serde_json::{Value, json};
use tempfile::TempDir;

fn cli(command: Commands, json: bool) -> Cli {
    Cli {
        json,
        log_level: "warn".to_string(),
        log_json: false,
        command,
    }
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    write(dir, name, &value.to_string())
}

fn minimal() -> Value {
    json!({
        "version": "0.8",
        "root": "r",
        "components": [
            {"id": "r", "type": "container", "children": ["t"]},
            {"id": "t", "type": "text", "props": {"content": "hi"}}
        ],
        "data": {"flag": true}
    })
}

#[test]
fn validate_accepts_valid_file() {
    let dir = TempDir::new().unwrap();
    let file = write_json(dir.path(), "ok.json", &minimal());
    let output = execute(&cli(
        Commands::Validate(ValidateArgs {
            file,
            normalize: false,
        }),
        false,
    ))
    .unwrap();
    assert_eq!(output, "valid");
}

#[test]
fn validate_rejects_with_exit_two() {
    let dir = TempDir::new().unwrap();
    let mut payload = minimal();
    payload["components"][0]["children"] = json!(["t", "ghost"]);
    let file = write_json(dir.path(), "bad.json", &payload);
    let error = execute(&cli(
        Commands::Validate(ValidateArgs {
            file,
            normalize: false,
        }),
        false,
    ))
    .unwrap_err();
    assert_eq!(error.exit_code(), 2);
    assert!(error.to_string().contains("[INVALID_REFERENCE] components[0].children[1]"));
}

#[test]
fn validate_normalizes_agent_payloads() {
    let dir = TempDir::new().unwrap();
    let agent = json!({"components": [{"type": "card", "children": [{"type": "text"}]}]});
    let file = write_json(dir.path(), "agent.json", &agent);
    let args = ValidateArgs {
        file,
        normalize: true,
    };
    assert!(execute(&cli(Commands::Validate(args.clone()), false)).is_ok());
    let raw = ValidateArgs {
        normalize: false,
        ..args
    };
    assert!(execute(&cli(Commands::Validate(raw), false)).is_err());
}

#[test]
fn missing_file_is_reported() {
    let error = execute(&cli(
        Commands::Validate(ValidateArgs {
            file: PathBuf::from("/tmp/doctor_a2ui/does-not-exist.json"),
            normalize: false,
        }),
        false,
    ))
    .unwrap_err();
    assert!(matches!(error, DoctorError::MissingPath { .. }));
    assert_eq!(error.exit_code(), 1);
}

#[test]
fn tree_prints_outline_and_json() {
    let dir = TempDir::new().unwrap();
    let file = write_json(dir.path(), "ok.json", &minimal());
    let args = TreeArgs { file, ascii: true };
    let text = execute(&cli(Commands::Tree(args.clone()), false)).unwrap();
    assert_eq!(text, "r (container)\n`-- t (text)");

    let json_out = execute(&cli(Commands::Tree(args), true)).unwrap();
    let tree: Value = serde_json::from_str(&json_out).unwrap();
    assert_eq!(tree["id"], "r");
    assert_eq!(tree["childNodes"][0]["id"], "t");
}

#[test]
fn apply_skips_invalid_updates() {
    let dir = TempDir::new().unwrap();
    let file = write_json(dir.path(), "ok.json", &minimal());
    let updates = write_json(
        dir.path(),
        "updates.json",
        &json!([
            {"operation": "update", "targetId": "t", "component": {"props": {"content": "bye"}}},
            {"operation": "explode", "targetId": "t"},
            {"operation": "remove", "targetId": "", "data": {"x": 1}}
        ]),
    );
    let output = execute(&cli(
        Commands::Apply(ApplyArgs { file, updates }),
        true,
    ))
    .unwrap();
    let report: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(report["applied"], 1);
    assert_eq!(report["skipped"].as_array().unwrap().len(), 2);
    assert_eq!(report["skipped"][0]["index"], 1);
    assert_eq!(report["response"]["components"][1]["props"]["content"], "bye");
    assert!(report["response"]["data"].get("x").is_none());
}

#[test]
fn eval_reads_data_from_response() {
    let dir = TempDir::new().unwrap();
    let data = write_json(dir.path(), "ok.json", &minimal());
    let eval = |expr: &str, strict: bool| {
        execute(&cli(
            Commands::Eval(EvalArgs {
                expr: expr.to_string(),
                data: Some(data.clone()),
                strict,
            }),
            false,
        ))
    };
    assert_eq!(eval("data.flag === true", false).unwrap(), "true");
    assert_eq!(eval("data.flag === false", false).unwrap(), "false");
    assert_eq!(eval("not a valid $$ expr", false).unwrap(), "true");
    assert!(matches!(
        eval("not a valid $$ expr", true),
        Err(DoctorError::Condition(_))
    ));
}

#[test]
fn render_with_policy_file() {
    let dir = TempDir::new().unwrap();
    let file = write_json(dir.path(), "ok.json", &minimal());
    let policy = write(dir.path(), "policy.toml", "max_depth = 1\n");
    let output = execute(&cli(
        Commands::Render(RenderArgs {
            file,
            policy: Some(policy),
            strict: false,
            ascii: true,
        }),
        false,
    ))
    .unwrap();
    assert_eq!(
        output,
        "container (vertical)  #r\n\ndiagnostics: 1\n  [DEPTH_EXCEEDED] #t: depth 1 reaches the limit of 1"
    );
}

#[test]
fn render_strict_rejects_invalid_payload() {
    let dir = TempDir::new().unwrap();
    let mut payload = minimal();
    payload["components"][0]["children"] = json!(["t", "ghost"]);
    let file = write_json(dir.path(), "bad.json", &payload);
    let args = RenderArgs {
        file,
        policy: None,
        strict: true,
        ascii: true,
    };
    let error = execute(&cli(Commands::Render(args.clone()), false)).unwrap_err();
    assert_eq!(error.exit_code(), 2);

    let lenient = RenderArgs {
        strict: false,
        ..args
    };
    let output = execute(&cli(Commands::Render(lenient), false)).unwrap();
    assert!(output.starts_with("container (vertical)  #r\n`-- text \"hi\"  #t"));
    assert!(output.contains("[MISSING_CHILD] #r"));
}

#[test]
fn reply_splits_text_and_payload() {
    let dir = TempDir::new().unwrap();
    let file = write(
        dir.path(),
        "reply.txt",
        "```json\n{\"text\": \"Here you go\", \"a2ui\": {\"components\": [{\"id\": \"t\", \"type\": \"text\"}]}}\n```\n",
    );
    let output = execute(&cli(Commands::Reply(ReplyArgs { file }), true)).unwrap();
    let report: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(report["text"], "Here you go");
    assert_eq!(report["response"]["root"], "t");
    assert_eq!(report["response"]["version"], "0.8");
}

#[test]
fn reply_plain_text_has_no_payload() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "reply.txt", "Just words.\n");
    let output = execute(&cli(Commands::Reply(ReplyArgs { file }), false)).unwrap();
    assert_eq!(output, "Just words.");
}
