use std::{env, fs};

use rolesync_controller::config::loader::load_config;

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("rolesync.toml");

    let toml_content = r#"
[reconciler]
short_wait_secs = 10
timeout_secs = 45
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.reconciler.short_wait_secs, 10);
    assert_eq!(cfg.reconciler.timeout_secs, 45);

    // 2) Env override should win over file
    unsafe {
        env::set_var("ROLESYNC__RECONCILER__SHORT_WAIT_SECS", "5");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.reconciler.short_wait_secs, 5);
    unsafe {
        env::remove_var("ROLESYNC__RECONCILER__SHORT_WAIT_SECS");
    }

    // 3) Invalid config fails validation
    let bad_path = dir.path().join("bad.toml");
    fs::write(
        &bad_path,
        "[reconciler]\nshort_wait_secs = 120\ntimeout_secs = 60\n",
    )
    .expect("write bad toml");
    let err = load_config(bad_path.to_str()).expect_err("validation should fail");
    assert!(err.to_string().contains("short_wait_secs"));

    // 4) Missing file falls back to defaults
    let missing = dir.path().join("missing.toml");
    let cfg_default = load_config(missing.to_str()).expect("defaults");
    assert_eq!(cfg_default.reconciler.short_wait_secs, 30);
    assert_eq!(cfg_default.reconciler.timeout_secs, 60);
}
