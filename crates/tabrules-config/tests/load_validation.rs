// tabrules-config/tests/load_validation.rs
// ============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding).
// ============================================================================

use std::io::Write;
use std::path::Path;

use tabrules_config::ConfigError;
use tabrules_config::EngineConfig;
use tempfile::NamedTempFile;

fn assert_invalid(result: Result<EngineConfig, ConfigError>) {
    assert!(result.is_err(), "expected invalid config load");
}

#[test]
fn load_rejects_path_too_long() {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(EngineConfig::load(Some(path)));
}

#[test]
fn load_rejects_oversized_file() {
    let mut file = NamedTempFile::new().expect("tempfile");
    let payload = vec![b'a'; 1_048_577];
    file.write_all(&payload).expect("write");
    assert_invalid(EngineConfig::load(Some(file.path())));
}

#[test]
fn load_rejects_non_utf8_file() {
    let mut file = NamedTempFile::new().expect("tempfile");
    file.write_all(&[0xFF, 0xFE, 0xFF]).expect("write");
    assert_invalid(EngineConfig::load(Some(file.path())));
}

#[test]
fn load_accepts_a_well_formed_document() {
    let mut file = NamedTempFile::new().expect("tempfile");
    writeln!(
        file,
        "[scheduler]\ndefault_debounce_ms = 1000\n\n[categories]\n\"ex.com\" = \"dev\"\n"
    )
    .expect("write");
    let config = EngineConfig::load(Some(file.path())).expect("loads");
    assert_eq!(config.scheduler.default_debounce_ms, 1_000);
    assert_eq!(config.categories.get("ex.com").map(String::as_str), Some("dev"));
}

#[test]
fn load_rejects_invalid_range() {
    let mut file = NamedTempFile::new().expect("tempfile");
    writeln!(file, "[scheduler]\ndefault_debounce_ms = 0\n").expect("write");
    assert_invalid(EngineConfig::load(Some(file.path())));
}
