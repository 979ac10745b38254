// ABOUTME: Tests pinning the exit code of every failure class.
// ABOUTME: Calling automation depends on these staying stable.

use slipway::error::Error;
use slipway::input::InputError;
use slipway::prepare::PrepareError;
use slipway::proxy::ProxyError;
use slipway::release::ReleaseError;
use slipway::source::SourceError;
use slipway::transport;
use slipway::validate::ValidateError;
use std::path::PathBuf;

#[test]
fn input_failures_have_distinct_codes() {
    assert_eq!(Error::from(InputError::MissingRepoUrl).exit_code(), 2);
    assert_eq!(Error::from(InputError::MissingCredential).exit_code(), 3);
    assert_eq!(Error::from(InputError::MissingUser).exit_code(), 4);
    assert_eq!(Error::from(InputError::MissingHost).exit_code(), 5);
    assert_eq!(
        Error::from(InputError::KeyNotFound(PathBuf::from("/nope"))).exit_code(),
        6
    );
    assert_eq!(
        Error::from(InputError::InvalidPort("http".to_string())).exit_code(),
        7
    );
}

#[test]
fn missing_descriptor_is_code_8() {
    let err = Error::from(SourceError::NoDescriptor(PathBuf::from("/tmp/widget")));
    assert_eq!(err.exit_code(), 8);
}

#[test]
fn sync_failure_is_code_10() {
    let err = Error::from(SourceError::Sync("non-fast-forward".to_string()));
    assert_eq!(err.exit_code(), 10);
}

#[test]
fn unreachable_host_is_code_11() {
    let err = Error::from(transport::Error::Unreachable {
        host: "app.example.com".to_string(),
        reason: "timed out".to_string(),
    });
    assert_eq!(err.exit_code(), 11);

    // Other transport failures are the generic code.
    let err = Error::from(transport::Error::CommandFailed("boom".to_string()));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn stage_failures_have_distinct_codes() {
    assert_eq!(
        Error::from(PrepareError::ServiceEnable("inactive".to_string())).exit_code(),
        12
    );
    assert_eq!(
        Error::from(ReleaseError::Startup("not running".to_string())).exit_code(),
        13
    );
    assert_eq!(
        Error::from(ProxyError::ConfigRejected("syntax".to_string())).exit_code(),
        14
    );
}

#[test]
fn validation_tiers_have_distinct_codes() {
    let internal = Error::from(ValidateError::ServiceInactive {
        service: "nginx".to_string(),
    });
    assert_eq!(internal.exit_code(), 15);

    let internal = Error::from(ValidateError::InternalProbe {
        status: "502".to_string(),
    });
    assert_eq!(internal.exit_code(), 15);

    let external = Error::from(ValidateError::ExternalProbe {
        url: "http://app.example.com:80/".to_string(),
        reason: "no route".to_string(),
    });
    assert_eq!(external.exit_code(), 9);
}
