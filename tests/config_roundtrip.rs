#[path = "support/regresslab_env.rs"]
mod regresslab_env;

use regresslab::config::{
    self, AppSettings, ConfigError, DEFAULT_API_BASE_URL, DashboardPage,
};
use regresslab_env::RegressLabEnvGuard;

#[test]
fn missing_config_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let _guard = RegressLabEnvGuard::set_config_home(dir.path().to_path_buf());
    let settings = config::load_or_default().unwrap();
    assert_eq!(settings, AppSettings::default());
    assert_eq!(
        settings.resolved_base_url().unwrap().as_str(),
        DEFAULT_API_BASE_URL
    );
}

#[test]
fn settings_survive_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let _guard = RegressLabEnvGuard::set_config_home(dir.path().to_path_buf());
    let mut settings = AppSettings::default();
    settings.api.base_url = "https://api.regresslab.test/api".into();
    settings.ui.last_page = DashboardPage::Train;
    settings.ui.last_dataset = Some("d1".into());
    config::save(&settings).unwrap();

    let path = config::config_path().unwrap();
    assert!(path.starts_with(dir.path()));
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("last_page = \"train\""));
    assert_eq!(config::load_or_default().unwrap(), settings);
}

#[test]
fn environment_overrides_configured_url() {
    let dir = tempfile::tempdir().unwrap();
    let guard = RegressLabEnvGuard::set_config_home(dir.path().to_path_buf());
    let settings = AppSettings::default();
    guard.set_api_url("http://10.0.0.5:9000/api");
    assert_eq!(
        settings.resolved_base_url().unwrap().as_str(),
        "http://10.0.0.5:9000/api"
    );
    guard.set_api_url("not a url");
    assert!(matches!(
        settings.resolved_base_url(),
        Err(ConfigError::InvalidBaseUrl { .. })
    ));
}

#[test]
fn corrupt_config_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let _guard = RegressLabEnvGuard::set_config_home(dir.path().to_path_buf());
    let path = config::config_path().unwrap();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "[ui\nlast_page = 3").unwrap();
    match config::load_or_default() {
        Err(ConfigError::ParseToml { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected parse error, got {other:?}"),
    }
}
