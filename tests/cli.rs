use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

const TOKEN: &str = "api-aaaaaaaaaaaaaaaaaaaaaaaaaaaa";

fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("config.yaml");
    fs::write(&path, contents).expect("failed to write config");
    path
}

/// The binary with a clean environment: no ambient token, URL or config.
fn conduit(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("conduit-mcp"));
    cmd.env("HOME", home)
        .env_remove("PHABRICATOR_URL")
        .env_remove("PHABRICATOR_TOKEN")
        .env_remove("PHABRICATOR_PROXY")
        .env_remove("CONDUIT_MCP_CONFIG")
        .env_remove("CONDUIT_MCP_STATELESS")
        .env_remove("RUST_LOG");
    cmd
}

fn serve(cmd: Command, args: &[&str], stdin: &str) -> assert_cmd::assert::Assert {
    let mut cmd = assert_cmd::Command::from_std(cmd);
    cmd.arg("serve").args(args).write_stdin(stdin.to_string()).assert()
}

fn response_lines(output: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(output)
        .lines()
        .map(|line| serde_json::from_str(line).expect("response line is JSON"))
        .collect()
}

#[test]
fn status_uses_custom_config_path() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(
        temp.path(),
        &format!("url: https://phab.example.com/api/\ntoken: {TOKEN}\nclient:\n  cache_ttl: 42\n"),
    );

    let assert = conduit(temp.path())
        .arg("status")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("https://phab.example.com/api/"));
    assert!(stdout.contains("API token configured"));
    assert!(stdout.contains("ttl 42s"));
    assert!(stdout.contains(&config_path.to_string_lossy().to_string()));
    assert!(!stdout.contains(TOKEN));

    Ok(())
}

#[test]
fn status_reports_invalid_token_length() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;

    conduit(temp.path())
        .arg("status")
        .env("PHABRICATOR_URL", "https://phab.example.com/api/")
        .env("PHABRICATOR_TOKEN", "too-short")
        .assert()
        .success()
        .stdout(predicate::str::contains("exactly 32 characters"))
        .stdout(predicate::str::contains("too-short").not());

    Ok(())
}

#[test]
fn call_rejects_short_token_before_network() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;

    conduit(temp.path())
        .args(["call", "conduit.ping"])
        .args(["--url", "http://127.0.0.1:9/api/", "--token", "short"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exactly 32 characters"));

    Ok(())
}

#[test]
fn whoami_requires_url() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;

    conduit(temp.path())
        .arg("whoami")
        .args(["--token", TOKEN])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PHABRICATOR_URL"));

    Ok(())
}

#[test]
fn stateful_serve_requires_process_token() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;

    serve(conduit(temp.path()), &["--url", "http://127.0.0.1:9/api/"], "")
        .failure()
        .stderr(predicate::str::contains("PHABRICATOR_TOKEN"));

    Ok(())
}

#[test]
fn stateless_serve_rejects_requests_without_header() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let input = concat!(
        r#"{"id": 1, "method": "user.whoami"}"#,
        "\n",
        "\n",
        r#"{"id": 2, "method": "user.whoami", "headers": {"X-Phabricator-Token": "short"}}"#,
        "\n",
        "this is not json\n",
    );

    let assert = serve(
        conduit(temp.path()),
        &["--stateless", "--url", "http://127.0.0.1:9/api/"],
        input,
    )
    .success();

    let responses = response_lines(&assert.get_output().stdout);
    assert_eq!(responses.len(), 3);

    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["success"], false);
    assert_eq!(responses[0]["error_code"], "AUTH_ERROR");
    assert_eq!(responses[0]["error"], "Must provide X-PHABRICATOR-TOKEN header.");

    assert_eq!(responses[1]["id"], 2);
    assert_eq!(responses[1]["error_code"], "AUTH_ERROR");

    assert_eq!(responses[2]["error_code"], "VALIDATION_ERROR");

    Ok(())
}

#[test]
fn stateless_serve_ignores_process_token() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;

    let assert = serve(
        conduit(temp.path()),
        &["--stateless", "--url", "http://127.0.0.1:9/api/", "--token", TOKEN],
        "{\"method\": \"conduit.ping\"}\n",
    )
    .success();

    let responses = response_lines(&assert.get_output().stdout);
    assert_eq!(responses[0]["error_code"], "AUTH_ERROR");

    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn call_posts_form_params_with_token() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/maniphest.search")
        .match_body(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("api.token".into(), TOKEN.into()),
            mockito::Matcher::UrlEncoded("queryKey".into(), "open".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"result": {"data": [{"id": 7}]}, "error_code": null, "error_info": null}"#)
        .create();

    let temp = tempdir()?;
    let assert = conduit(temp.path())
        .args(["call", "maniphest.search", "-p", "queryKey=open"])
        .args(["--url", &format!("{}/api/", server.url()), "--token", TOKEN])
        .assert()
        .success();

    mock.assert();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    let result: Value = serde_json::from_str(&stdout)?;
    assert_eq!(result["data"][0]["id"], 7);

    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn stateless_serve_uses_header_token() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/user.whoami")
        .match_body(mockito::Matcher::UrlEncoded(
            "api.token".into(),
            TOKEN.into(),
        ))
        .with_status(200)
        .with_body(r#"{"result": {"phid": "PHID-USER-1", "userName": "alice"}}"#)
        .expect(2)
        .create();

    let temp = tempdir()?;
    let request =
        format!(r#"{{"method": "user.whoami", "headers": {{"x-phabricator-token": "{TOKEN}"}}}}"#);
    let assert = serve(
        conduit(temp.path()),
        &["--stateless", "--url", &format!("{}/api/", server.url())],
        &format!("{request}\n{request}\n"),
    )
    .success();

    mock.assert();
    let responses = response_lines(&assert.get_output().stdout);
    assert_eq!(responses.len(), 2);
    for response in responses {
        assert_eq!(response["success"], true);
        assert_eq!(response["result"]["userName"], "alice");
    }

    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn server_errors_are_retried_then_reported() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/conduit.ping")
        .with_status(503)
        .with_body("unavailable")
        .expect(3)
        .create();

    let temp = tempdir()?;
    let mut cmd = conduit(temp.path());
    cmd.env("CONDUIT_MAX_RETRIES", "2")
        .env("CONDUIT_RETRY_DELAY", "0");
    let assert = serve(
        cmd,
        &["--url", &format!("{}/api/", server.url()), "--token", TOKEN],
        "{\"method\": \"conduit.ping\"}\n",
    )
    .success();

    mock.assert();
    let responses = response_lines(&assert.get_output().stdout);
    assert_eq!(responses[0]["error_code"], "NETWORK_ERROR");

    Ok(())
}
