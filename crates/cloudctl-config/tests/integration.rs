use std::fs;

use cloudctl_config::{
    ClientProfile, CommandPath, ConfigError, Credentials, FlagSource, FlagStore, FlagValue,
    Namespace, ProfileOverrides, ResolvedProfile, check_required,
};

#[test]
fn profile_discovery_reads_default_location() -> anyhow::Result<()> {
    let home = tempfile::tempdir()?;
    let dir = home.path().join(".config/cloudctl");
    fs::create_dir_all(&dir)?;
    fs::write(
        dir.join("config.json"),
        r#"{"api-url": "http://127.0.0.1:9000/cloudapi/v6", "username": "ops", "password": "pw"}"#,
    )?;

    let profile = ClientProfile::discover(None, Some(home.path()))?;
    let resolved = ResolvedProfile::resolve(ProfileOverrides::default(), profile)?;

    assert_eq!(resolved.api_url.as_str(), "http://127.0.0.1:9000/cloudapi/v6/");
    assert_eq!(
        resolved.credentials,
        Some(Credentials::Basic {
            username: "ops".into(),
            password: "pw".into(),
        })
    );
    Ok(())
}

#[test]
fn missing_default_profile_is_not_an_error() -> anyhow::Result<()> {
    let home = tempfile::tempdir()?;
    let profile = ClientProfile::discover(None, Some(home.path()))?;
    assert_eq!(profile, ClientProfile::default());
    Ok(())
}

#[test]
fn missing_explicit_profile_is_an_error() -> anyhow::Result<()> {
    let home = tempfile::tempdir()?;
    let err = ClientProfile::discover(Some(&home.path().join("absent.json")), None)
        .expect_err("explicit profile must exist");
    assert!(matches!(err, ConfigError::Io { operation: "profile.read", .. }));
    Ok(())
}

#[test]
fn malformed_profile_is_reported_with_path() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"api-url": 42}"#)?;

    let err = ClientProfile::load(&path).expect_err("api-url must be a string");
    assert!(matches!(&err, ConfigError::ProfileParse { path: reported, .. } if reported == &path));
    Ok(())
}

#[test]
fn required_flags_resolve_through_parent_globals() {
    let parent = CommandPath::from_segments(["cloudctl", "k8s", "nodepool"]);
    let create = parent.child("create");
    let mut builder = FlagStore::builder();
    builder
        .insert(
            Namespace::global(&parent, "cluster-id"),
            FlagValue::String("c-42".into()),
            FlagSource::CommandLine,
        )
        .insert(
            Namespace::local(&create, "node-count"),
            FlagValue::Int(1),
            FlagSource::Default,
        );
    let store = builder.build();

    let err = check_required(&store, &create, &["cluster-id", "name", "node-count"])
        .expect_err("name and node-count are not set");
    assert_eq!(err.flag_names(), vec!["name", "node-count"]);
}
