use super::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.storage.backend, "sqlite");
    assert_eq!(config.storage.app_name, "auto_nom_agent");
    assert!(config.catalog.base_url.is_none());
}

#[test]
fn test_planner_config_default() {
    let planner = PlannerConfig::default();
    assert_eq!(planner.timeout_seconds, 60);
    assert_eq!(planner.options_count, 3);
    assert_eq!(planner.items_per_option, 1);
}

#[test]
fn test_workflow_config_default() {
    let workflow = WorkflowConfig::default();
    assert_eq!(workflow.stream_buffer, 100);
    assert!(workflow.enforce_schedule);
}

#[test]
fn test_catalog_config_default() {
    let catalog = CatalogConfig::default();
    assert_eq!(catalog.port, 8000);
    assert_eq!(catalog.timeout_seconds, 10);
    assert!(catalog.data_path.is_none());
}

#[test]
fn test_database_path_default() {
    let storage = StorageConfig::default();
    assert!(storage.database_path().ends_with(".autonom/autonom.db"));
}

#[test]
fn test_database_path_explicit() {
    let storage = StorageConfig {
        path: Some(PathBuf::from("/tmp/meals.db")),
        ..StorageConfig::default()
    };
    assert_eq!(storage.database_path(), PathBuf::from("/tmp/meals.db"));
}

#[test]
fn test_log_dir_default() {
    let logging = LoggingConfig::default();
    assert_eq!(logging.level, "info");
    assert!(logging.log_dir().ends_with(".autonom/logs"));
}

#[test]
fn test_partial_section_keeps_other_defaults() {
    let config: Config = toml::from_str("[planner]\noptions_count = 4\n").unwrap();
    assert_eq!(config.planner.options_count, 4);
    assert_eq!(config.planner.timeout_seconds, 60);
}

#[test]
fn test_config_serialization() {
    let config = Config::default();
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("auto_nom_agent"));
    assert!(!json.contains("base_url"));
}
