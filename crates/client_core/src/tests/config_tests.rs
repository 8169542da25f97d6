use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn defaults_target_the_signup_campaign() {
    let settings = SignupSettings::default();
    assert_eq!(
        settings.campaign_uuid.to_string(),
        "46aa3270-d2ee-11ea-a9f0-e9a68ccff42a"
    );
    assert_eq!(settings.check_debounce, Duration::from_millis(500));
    assert_eq!(settings.check_failure_policy, CheckFailurePolicy::FailOpen);
    parse_api_base_url(&settings.api_base_url).expect("default base url parses");
}

#[test]
fn file_values_override_defaults() {
    let mut settings = SignupSettings::default();
    apply_file(
        &mut settings,
        r#"
api_base_url = "http://127.0.0.1:9000/v3"
campaign_uuid = "00000000-0000-0000-0000-000000000001"
check_debounce_ms = 50
request_timeout_secs = 5
check_failure_policy = "block"
"#,
        Path::new("signup.toml"),
    )
    .expect("apply file");

    assert_eq!(settings.api_base_url, "http://127.0.0.1:9000/v3");
    assert_eq!(
        settings.campaign_uuid.to_string(),
        "00000000-0000-0000-0000-000000000001"
    );
    assert_eq!(settings.check_debounce, Duration::from_millis(50));
    assert_eq!(settings.request_timeout, Duration::from_secs(5));
    assert_eq!(settings.check_failure_policy, CheckFailurePolicy::Block);
}

#[test]
fn malformed_file_reports_path() {
    let mut settings = SignupSettings::default();
    let err = apply_file(&mut settings, "check_debounce_ms = \"soon\"", Path::new("bad.toml"))
        .expect_err("must fail");
    assert!(err.to_string().contains("bad.toml"), "unexpected error: {err}");
}

#[test]
fn app_prefixed_env_wins_over_plain_env() {
    let mut settings = SignupSettings::default();
    apply_env_overrides(
        &mut settings,
        lookup_from(&[
            ("SIGNUP_API_BASE_URL", "http://plain.invalid/"),
            ("APP__API_BASE_URL", "http://app.invalid/"),
            ("APP__CHECK_DEBOUNCE_MS", "10"),
            ("APP__CHECK_FAILURE_POLICY", "fail-open"),
        ]),
    )
    .expect("apply env");

    assert_eq!(settings.api_base_url, "http://app.invalid/");
    assert_eq!(settings.check_debounce, Duration::from_millis(10));
    assert_eq!(settings.check_failure_policy, CheckFailurePolicy::FailOpen);
}

#[test]
fn rejects_unparseable_env_values() {
    let mut settings = SignupSettings::default();
    let err = apply_env_overrides(
        &mut settings,
        lookup_from(&[("APP__REQUEST_TIMEOUT_SECS", "forever")]),
    )
    .expect_err("must fail");
    assert!(matches!(
        err,
        SettingsError::InvalidValue {
            key: "request_timeout_secs",
            ..
        }
    ));

    let err = apply_env_overrides(
        &mut settings,
        lookup_from(&[("APP__CAMPAIGN_UUID", "campaign-one")]),
    )
    .expect_err("must fail");
    assert!(matches!(err, SettingsError::Domain(_)));
}

#[test]
fn base_url_gains_trailing_slash() {
    let url = parse_api_base_url("https://api.example.org/v3").expect("parse");
    assert_eq!(url.as_str(), "https://api.example.org/v3/");
    assert_eq!(
        url.join("signup").expect("join").as_str(),
        "https://api.example.org/v3/signup"
    );
}

#[test]
fn base_url_must_be_http() {
    assert!(matches!(
        parse_api_base_url("ftp://api.example.org/"),
        Err(SettingsError::UnsupportedScheme(_))
    ));
    assert!(matches!(
        parse_api_base_url("not a url"),
        Err(SettingsError::InvalidBaseUrl { .. })
    ));
}

#[test]
fn explicit_settings_path_must_exist() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let missing = env::temp_dir().join(format!("signup_settings_missing_{suffix}.toml"));

    let err = load_settings(Some(missing.as_path())).expect_err("must fail");
    assert!(matches!(err, SettingsError::Read { .. }));
}

#[test]
fn loads_settings_from_explicit_file() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("signup_settings_{suffix}.toml"));
    fs::write(&path, "check_debounce_ms = 250\n").expect("write settings");

    let settings = load_settings(Some(path.as_path())).expect("load");
    fs::remove_file(&path).expect("cleanup");

    if env::var("APP__CHECK_DEBOUNCE_MS").is_err() {
        assert_eq!(settings.check_debounce, Duration::from_millis(250));
    }
}
