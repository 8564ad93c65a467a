use std::path::PathBuf;
use zb_kernel::config::{load_config, validate};
use zb_kernel::domain::config::DaemonConfig;

fn write_toml(dir: &tempfile::TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("zwembot.toml");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn file_values_are_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_toml(
        &dir,
        r#"
        [storage]
        data_dir = "/srv/zwembot"

        [schedule]
        min_interval_secs = 120
        max_interval_secs = 240
        seed = 9

        [clock]
        timezone = "+01:00"
        "#,
    );

    let cfg: DaemonConfig = load_config(Some(&path)).unwrap();
    assert_eq!(cfg.storage.data_dir, PathBuf::from("/srv/zwembot"));
    assert_eq!(cfg.schedule.min_interval_secs, 120);
    assert_eq!(cfg.schedule.seed, Some(9));
    assert_eq!(cfg.upstream.timeout_secs, 30, "unset sections keep defaults");
    validate(&cfg).unwrap();
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(load_config::<DaemonConfig>(Some(&missing)).is_err());
}

#[test]
fn invalid_file_values_fail_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_toml(&dir, "[schedule]\nmin_interval_secs = 900\nmax_interval_secs = 60\n");

    let cfg: DaemonConfig = load_config(Some(&path)).unwrap();
    assert!(validate(&cfg).is_err());
}
