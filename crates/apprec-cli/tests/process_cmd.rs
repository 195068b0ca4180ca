use assert_cmd::Command;
use predicates::prelude::*;

const RECEIPT: &str = r#"<html><body>
<div>
  <div>Receipt</div>
  <div>
    <div>
      <p>December 18, 2024</p>
      <div><p>Order ID:</p><p>ML7P1X2QZ</p></div>
      <div><p>Document:</p><p>189427553101</p></div>
      <div><p>Apple Account:</p><p>user@example.com</p></div>
    </div>
    <table>
      <tr>
        <td><img src="https://img.example/coins.png"></td>
        <td>
          <p>Gardenscapes</p>
          <p>Coin Pack</p>
          <p>In-App Purchase</p>
          <p>Device C</p>
          <a>Report a Problem</a>
        </td>
        <td>$25.00</td>
      </tr>
    </table>
    <div>
      <div>
        <div>Billed to</div>
        <div>
          <div>
            <p>Subtotal</p>
            <p>Tax</p>
            <div>$25.00</div>
            <div>$2.00</div>
          </div>
          <p>Visa .... 1234</p>
          <div>$27.00</div>
        </div>
      </div>
    </div>
  </div>
</div>
</body></html>"#;

#[test]
fn process_outputs_json() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("receipt.html");
    std::fs::write(&file, RECEIPT).unwrap();

    Command::cargo_bin("apprec")
        .unwrap()
        .args(["process", file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("ML7P1X2QZ"))
        .stdout(predicate::str::contains("in_app_purchase"));
}

#[test]
fn process_text_format_shows_totals() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("receipt.html");
    std::fs::write(&file, RECEIPT).unwrap();

    Command::cargo_bin("apprec")
        .unwrap()
        .args(["process", file.to_str().unwrap(), "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total:    27.00"));
}

#[test]
fn process_fails_on_malformed_document() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("not_a_receipt.html");
    std::fs::write(&file, "<p>hello</p>").unwrap();

    Command::cargo_bin("apprec")
        .unwrap()
        .args(["process", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed document"));
}
