use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::{Command, Output};
use std::thread;

use tempfile::tempdir;

fn lineagebench(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lineagebench"))
        .args(args)
        .env_remove("DATAHUB_SERVER")
        .env_remove("DATAHUB_TOKEN")
        .env_remove("RUST_LOG")
        .output()
        .expect("run CLI")
}

/// A server URL that refuses connections.
fn closed_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let address = format!("http://{}", listener.local_addr().expect("addr"));
    drop(listener);
    address
}

/// Answers `requests` parse calls with the same lineage body.
fn lineage_server(requests: usize, body: &'static str) -> (String, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let address = format!("http://{}", listener.local_addr().expect("addr"));
    let handle = thread::spawn(move || {
        for _ in 0..requests {
            let (stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream);
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("read line");
                if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = value.trim().parse().expect("content length");
                }
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            let mut request_body = vec![0u8; content_length];
            reader.read_exact(&mut request_body).expect("read body");
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            reader
                .get_mut()
                .write_all(response.as_bytes())
                .expect("write response");
        }
    });
    (address, handle)
}

fn folder_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read run dir")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn prints_report_schema() {
    let output = lineagebench(&["--report-schema"]);
    assert!(output.status.success());
    let schema: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("schema is JSON");
    assert_eq!(schema["title"], "SourceReport");
}

#[test]
fn missing_inputs_is_a_config_error() {
    let output = lineagebench(&[]);
    assert_eq!(output.status.code(), Some(66));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("lineagebench: error:"));
}

#[test]
fn empty_input_file_is_a_config_error() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("empty.sql");
    std::fs::write(&sql_path, "  ;\n;\n").expect("write sql");

    let output = lineagebench(&[
        "--sql-file",
        sql_path.to_str().expect("sql path"),
        "--server",
        &closed_server(),
    ]);
    assert_eq!(output.status.code(), Some(66));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No SQL statements found"));
}

#[test]
fn unreachable_server_records_rpc_errors() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("load.sql");
    let run_dir = dir.path().join("run");
    let csv_path = dir.path().join("results.csv");
    std::fs::write(&sql_path, "INSERT INTO b SELECT * FROM a;\nDELETE FROM c;\n")
        .expect("write sql");
    let server = closed_server();

    let args = [
        "--sql-file",
        sql_path.to_str().expect("sql path"),
        "--server",
        server.as_str(),
        "--output-dir",
        run_dir.to_str().expect("run dir"),
        "--output-csv",
        csv_path.to_str().expect("csv path"),
        "--timeout-secs",
        "5",
    ];
    let output = lineagebench(&args);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[RPC_ERROR] Query 1/2"));
    assert!(stdout.contains("RPC errors: 2"));
    assert!(stdout.contains("Errors encountered: 2"));

    assert!(run_dir.join("[[]]report.json").is_file());
    assert!(run_dir.join("[[]]report.md").is_file());
    let folders = folder_names(&run_dir);
    assert_eq!(folders.len(), 1);
    assert!(folders[0].starts_with("[ERR]load.sql--"));

    let csv = std::fs::read_to_string(&csv_path).expect("results csv");
    assert_eq!(csv.lines().count(), 3);

    let mut strict_args = args.to_vec();
    strict_args.push("--strict");
    let strict = lineagebench(&strict_args);
    assert_eq!(strict.status.code(), Some(1));
}

#[test]
fn successful_run_emits_json_report() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("load.sql");
    let run_dir = dir.path().join("run");
    std::fs::write(&sql_path, "INSERT INTO db.b SELECT id FROM db.a").expect("write sql");
    let (server, handle) = lineage_server(
        1,
        r#"{"in_tables":["db.a"],"out_tables":["db.b"],"queryType":"INSERT"}"#,
    );

    let output = lineagebench(&[
        "--sql-file",
        sql_path.to_str().expect("sql path"),
        "--server",
        server.as_str(),
        "--output-dir",
        run_dir.to_str().expect("run dir"),
        "--format",
        "json",
        "--strict",
    ]);
    handle.join().expect("server thread");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("report JSON");
    assert_eq!(report["query_count"], 1);
    assert_eq!(report["success_count"], 1);
    assert_eq!(report["queries"][0]["flags"], serde_json::json!(["LIN"]));
    assert_eq!(report["queries"][0]["statement_type"], "INSERT");

    let folders = folder_names(&run_dir);
    assert_eq!(folders.len(), 1);
    assert!(folders[0].starts_with("[LIN]load.sql--"));
}
