// tests/config_env.rs
use bluesky_digest::config::{ServiceConfig, DEFAULT_FEED_URL, ENV_CONFIG_PATH};
use std::{env, fs};

const TOUCHED: [&str; 7] = [
    ENV_CONFIG_PATH,
    "GEMINI_API_KEY",
    "GEMINI_MODEL",
    "GEMINI_API_URL",
    "FEED_URL",
    "DAILY_SECTIONS",
    "CORS_ALLOWED_ORIGINS",
];

fn clear_env() {
    for k in TOUCHED {
        env::remove_var(k);
    }
}

#[serial_test::serial]
#[test]
fn load_uses_env_path_then_default_file_then_defaults() {
    // Isolate CWD so the repo's own config/ is not read
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    clear_env();

    // 1) Nothing anywhere -> defaults
    let cfg = ServiceConfig::load().unwrap();
    assert_eq!(cfg.feed_url, DEFAULT_FEED_URL);
    assert!(cfg.require_gemini().is_err());

    // 2) Fallback file in ./config/
    fs::create_dir_all(tmp.path().join("config")).unwrap();
    fs::write(
        tmp.path().join("config/digest.toml"),
        "feed_url = \"http://from-file/posts\"\n[gemini]\napi_key = \"file-key\"\n",
    )
    .unwrap();
    let cfg = ServiceConfig::load().unwrap();
    assert_eq!(cfg.feed_url, "http://from-file/posts");
    assert_eq!(cfg.gemini.api_key, "file-key");

    // 3) Explicit path wins over the fallback file, env vars win over both
    let explicit = tmp.path().join("other.toml");
    fs::write(&explicit, "daily_sections = 6\n[gemini]\napi_key = \"ENV\"\n").unwrap();
    env::set_var(ENV_CONFIG_PATH, explicit.display().to_string());
    env::set_var("GEMINI_API_KEY", "env-key");
    env::set_var("FEED_URL", "http://from-env/posts");
    let cfg = ServiceConfig::load().unwrap();
    assert_eq!(cfg.daily_sections, 6);
    assert_eq!(cfg.gemini.api_key, "env-key");
    assert_eq!(cfg.feed_url, "http://from-env/posts");

    // 4) Explicit path that does not exist is an error
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
    assert!(ServiceConfig::load().is_err());

    clear_env();
    env::set_current_dir(&old).unwrap();
}
