use hyformula::{
    config::{CanonicityPolicy, RegistryConfig},
    registry::Registry,
};

#[test]
fn defaults_reject_non_canonical_structures() {
    let config = RegistryConfig::default();
    assert!(config.canonicity.is_reject());
    assert_eq!(Registry::default().config(), &config);
}

#[test]
fn toml_file_round_trip() {
    let dir = std::env::temp_dir().join(format!("hyformula-config-{}", std::process::id()));
    let path = dir.join("nested").join("registry.toml");

    let config = RegistryConfig {
        canonicity: CanonicityPolicy::Permit,
    };
    config.save_to_toml(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("canonicity = \"permit\""));

    let loaded = RegistryConfig::load_from_toml(&path).unwrap();
    assert_eq!(loaded, config);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn invalid_documents_are_reported() {
    let err = RegistryConfig::from_toml_str("canonicity = \"sometimes\"").unwrap_err();
    assert!(err.is_config_parse());

    let missing = std::env::temp_dir().join("hyformula-config-does-not-exist.toml");
    assert!(RegistryConfig::load_from_toml(&missing).unwrap_err().is_io());
}
