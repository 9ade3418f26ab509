use std::path::PathBuf;

use assert_cmd::Command;

/// Write `source` to a fresh script file under the target temp dir.
fn script(name: &str, source: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("quill-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let path = dir.join(name);
    std::fs::write(&path, source).unwrap();

    path
}

fn quill() -> Command {
    Command::cargo_bin("quill").unwrap()
}

#[test]
fn run_prints_program_output() {
    let path = script(
        "hello.qll",
        r#"
        var greeting = "hello";
        print greeting + ", " + "world";
        print 1 + 2 * 3;
        "#,
    );

    quill()
        .arg("run")
        .arg(path)
        .assert()
        .success()
        .stdout("hello, world\n7\n");
}

#[test]
fn syntax_errors_exit_with_65_and_report_each_one() {
    let path = script("bad.qll", "var = 1;\nvar x 3;\n");

    let assert = quill().arg("run").arg(path).assert().code(65);

    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();

    // One pass surfaces both statements' errors.
    assert!(stderr.contains("[line 1] Error: at '=': Expect variable name."));
    assert!(stderr.contains("[line 2] Error: at '3': Expect ';' after variable declaration."));
}

#[test]
fn static_errors_suppress_execution() {
    let path = script(
        "resolve.qll",
        "print \"should not run\";\n{ var unused = 1; }\n",
    );

    quill()
        .arg("run")
        .arg(path)
        .assert()
        .code(65)
        .stdout("")
        .stderr("[line 2] Error: Local variable 'unused' is unused.\n");
}

#[test]
fn runtime_errors_exit_with_70() {
    let path = script("boom.qll", "print \"before\";\nprint 1 / 0;\n");

    quill()
        .arg("run")
        .arg(path)
        .assert()
        .code(70)
        .stdout("before\n")
        .stderr("[line 2] Runtime error: Right operand cannot be 0.\n");
}

#[test]
fn exit_native_stops_with_code_zero() {
    let path = script("exit.qll", "print \"first\";\nexit();\nprint \"second\";\n");

    quill()
        .arg("run")
        .arg(path)
        .assert()
        .success()
        .stdout("first\n");
}

#[test]
fn tokenize_prints_the_token_stream() {
    let path = script("tokens.qll", "var answer = 42;\n");

    let assert = quill().arg("tokenize").arg(path).assert().success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

    assert!(stdout.contains("VAR var null"));
    assert!(stdout.contains("IDENTIFIER answer null"));
    assert!(stdout.contains("NUMBER 42 42.0"));
    assert!(stdout.contains("EOF  null"));
}

#[test]
fn tokenize_reports_bad_characters_with_65() {
    let path = script("badchar.qll", "var a = 1; #\n");

    quill().arg("tokenize").arg(path).assert().code(65);
}

#[test]
fn parse_prints_prefix_form() {
    let path = script("expr.qll", "print (1 + 2) * 3;\n");

    quill()
        .arg("parse")
        .arg(path)
        .assert()
        .success()
        .stdout("(print (* (group (+ 1.0 2.0)) 3.0))\n");
}

#[test]
fn file_natives_round_trip_lines() {
    let data = std::env::temp_dir().join(format!("quill-io-{}.txt", std::process::id()));
    let data_str = data.to_str().unwrap();

    let source = format!(
        r#"
        var out = openForWrite("{data}");
        write(out, "alpha");
        write(out, 42);
        close(out);

        var extra = openForAppend("{data}");
        write(extra, "omega");
        close(extra);

        var input = openForRead("{data}");
        var line = readLine(input);
        while (line != nil) {{
            print line;
            line = readLine(input);
        }}
        close(input);
        "#,
        data = data_str
    );

    let path = script("io.qll", &source);

    quill()
        .arg("run")
        .arg(path)
        .assert()
        .success()
        .stdout("alpha\n42\nomega\n");

    std::fs::remove_file(data).ok();
}

#[test]
fn missing_file_native_error_is_a_runtime_error() {
    let path = script(
        "missing.qll",
        "var f = openForRead(\"/definitely/not/here.txt\");\nprint f;\n",
    );

    quill()
        .arg("run")
        .arg(path)
        .assert()
        .code(70)
        .stderr("[line 1] Runtime error: File '/definitely/not/here.txt' does not exist.\n");
}

#[test]
fn repl_reads_until_exit() {
    quill()
        .arg("run")
        .write_stdin("var x = 20;\nprint x + 2;\nexit();\n")
        .assert()
        .success()
        .stdout("> > 22\n> ");
}
