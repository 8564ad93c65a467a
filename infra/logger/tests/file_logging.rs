use std::fs;
use std::time::Duration;
use tempfile::tempdir;
use zb_logger::{LevelFilter, Logger};

#[test]
fn json_file_logging_writes_structured_lines() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let logger = Logger::builder()
        .name("zwembot-file")
        .console(false)
        .directory(&log_dir)
        .json(true)
        .level(LevelFilter::INFO)
        .init()?;
    assert!(logger.writes_files());

    tracing::info!(task = "P42", "cycle finished");

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(&log_file)?;
    let line = contents.lines().next().expect("at least one log line");
    let parsed: serde_json::Value = serde_json::from_str(line)?;
    assert_eq!(parsed["fields"]["message"], "cycle finished");
    assert_eq!(parsed["fields"]["task"], "P42");

    Ok(())
}
