use std::path::PathBuf;

use nudge::config::{Config, ConnectionMode, Environment};

#[test]
fn test_token_presence_selects_remote_backend() {
    let config = Config {
        db_url: Some("libsql://nudge.example.io".into()),
        db_token: Some("secret".into()),
        env: Environment::Production,
    };
    assert_eq!(
        config.connection_mode(),
        ConnectionMode::Remote {
            url: "libsql://nudge.example.io".into(),
            token: "secret".into(),
        }
    );
}

#[test]
fn test_no_token_selects_local_file() {
    let config = Config {
        db_url: Some("file:local.db".into()),
        db_token: None,
        env: Environment::Development,
    };
    // the file: prefix is stripped to a plain path
    assert_eq!(
        config.connection_mode(),
        ConnectionMode::Local(PathBuf::from("local.db"))
    );

    let config = Config {
        db_url: Some("/tmp/nudge.db".into()),
        db_token: None,
        env: Environment::Development,
    };
    assert_eq!(
        config.connection_mode(),
        ConnectionMode::Local(PathBuf::from("/tmp/nudge.db"))
    );
}

#[test]
fn test_default_local_path_when_unconfigured() {
    let config = Config {
        db_url: None,
        db_token: None,
        env: Environment::Development,
    };
    match config.connection_mode() {
        ConnectionMode::Local(path) => {
            assert!(path.ends_with("nudge/nudge.db"), "unexpected: {path:?}");
        }
        mode => panic!("expected local mode, got {mode:?}"),
    }
    assert!(config.is_development());
}
