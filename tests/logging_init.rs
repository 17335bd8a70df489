//! Global subscriber installation. Kept in its own binary because a
//! process can only install one global subscriber.

use patcher::config::{LogConfig, LogFormat};
use patcher::logging::{InitError, init_with_config};

#[test]
fn second_initialisation_is_rejected() {
    let config = LogConfig {
        filter: "off".into(),
        format: LogFormat::Text,
    };

    assert!(init_with_config(&config).is_ok());
    assert!(matches!(
        init_with_config(&config),
        Err(InitError::Subscriber(_))
    ));
}

#[test]
fn invalid_filter_fails_before_installing() {
    let config = LogConfig {
        filter: "patcher=notalevel".into(),
        format: LogFormat::Json,
    };

    assert!(matches!(
        init_with_config(&config),
        Err(InitError::Filter(_))
    ));
}
