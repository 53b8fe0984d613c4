use keystone_config::{ConfigError, KeystoneConfig, LoggingConfig, ModelSettings};
use pretty_assertions::assert_eq;

#[test]
fn loads_full_config_from_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("keystone.toml");
    std::fs::write(
        &path,
        r#"
[model]
root_class = "lang.Root"
default_packages = ["lang", "lang.util"]
default_member_prefix = "member"
default_field_type = "lang.Root"
default_return_type = "void"

[logging]
level = "debug"
json = true

[logging.targets]
"keystone.resolve" = "trace"
"#,
    )
    .expect("write config");

    let config = KeystoneConfig::load_from_path(&path).expect("config should load");
    assert_eq!(
        config,
        KeystoneConfig {
            model: ModelSettings {
                root_class: "lang.Root".to_string(),
                default_packages: vec!["lang".to_string(), "lang.util".to_string()],
                default_member_prefix: "member".to_string(),
                default_field_type: "lang.Root".to_string(),
                default_return_type: "void".to_string(),
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                targets: [("keystone.resolve".to_string(), "trace".to_string())]
                    .into_iter()
                    .collect(),
                json: true,
            },
        }
    );
    assert_eq!(
        config.logging.directives().unwrap(),
        "warn,keystone=debug,keystone.resolve=trace"
    );
}

#[test]
fn partial_sections_keep_defaults() {
    let config = KeystoneConfig::load_from_str("[model]\ndefault_packages = []\n")
        .expect("config should load");
    assert_eq!(config.model.default_packages, Vec::<String>::new());
    assert_eq!(config.model.root_class, ModelSettings::default().root_class);
    assert_eq!(config.logging, LoggingConfig::default());
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("absent.toml");
    match KeystoneConfig::load_from_path(&path) {
        Err(ConfigError::Io { path: reported, .. }) => {
            assert_eq!(reported, path.display().to_string())
        }
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn rejects_wrong_value_types() {
    let err = KeystoneConfig::load_from_str("[logging]\njson = \"yes\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)), "{err:?}");
}

#[test]
fn rejects_unknown_target_levels() {
    let text = r#"
[logging.targets]
"keystone.loader" = "chatty"
"#;
    let err = KeystoneConfig::load_from_str(text).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)), "{err:?}");
}
