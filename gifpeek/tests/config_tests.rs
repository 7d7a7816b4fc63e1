// ABOUTME: Tests for configuration file loading, validation, and merging
// ABOUTME: Tests TOML parsing, XDG path resolution, precedence and settings resolution

use gifpeek::config::{Config, DecodeSection, FetchSection, PreviewSection, Settings};
use gifpeek::image_protocols::InlineProtocol;
use serial_test::serial;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_config_deserialize_complete() {
    let toml_content = r#"
        [decode]
        max_frames = 30
        max_pixels = -1
        max_bytes = 1048576
        default_delay = 100
        min_delay = 20
        max_delay = 500
        strict_animated_only = true

        [preview]
        protocol = "kitty"
        software_animation = true
        cell_aspect = 0.45

        [fetch]
        timeout = "5s"
        max_bytes = -1
    "#;

    let config: Config = toml::from_str(toml_content).expect("Should parse valid TOML");

    let decode = config.decode.clone().unwrap();
    assert_eq!(decode.max_frames, Some(30));
    assert_eq!(decode.max_pixels, Some(-1));
    assert_eq!(decode.strict_animated_only, Some(true));

    let limits = decode.limits();
    assert_eq!(limits.default_delay, Duration::from_millis(100));
    assert_eq!(limits.min_delay, Duration::from_millis(20));
    assert_eq!(limits.max_delay, Duration::from_millis(500));

    let preview = config.preview.clone().unwrap();
    assert_eq!(preview.protocol, Some("kitty".to_string()));
    assert_eq!(preview.software_animation, Some(true));
    assert_eq!(preview.cell_aspect, Some(0.45));

    let fetch = config.fetch.clone().unwrap();
    assert_eq!(fetch.timeout, Some("5s".to_string()));
    assert_eq!(fetch.max_bytes, Some(-1));
}

#[test]
fn test_config_deserialize_minimal_and_empty() {
    let config: Config = toml::from_str("[preview]\nprotocol = \"none\"\n").unwrap();
    assert!(config.decode.is_none());
    assert_eq!(config.preview.unwrap().protocol, Some("none".to_string()));

    let empty: Config = toml::from_str("").expect("Should parse empty TOML");
    assert_eq!(empty, Config::default());
}

#[test]
fn test_config_validation_errors() {
    let invalid_protocol = r#"
        [preview]
        protocol = "sixel"
    "#;
    assert!(toml::from_str::<Config>(invalid_protocol).is_err());

    let invalid_duration = r#"
        [fetch]
        timeout = "soon"
    "#;
    assert!(toml::from_str::<Config>(invalid_duration).is_err());

    let zero_duration = r#"
        [fetch]
        timeout = "0s"
    "#;
    assert!(toml::from_str::<Config>(zero_duration).is_err());
}

#[test]
fn test_load_from_file_rejects_bad_aspect() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "[preview]\ncell_aspect = 4.0\n").unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(err.to_string().contains("cell_aspect"));
}

#[test]
fn test_load_from_paths_precedence() {
    let temp_dir = TempDir::new().unwrap();
    let user = temp_dir.path().join("user.toml");
    let project = temp_dir.path().join("project.toml");
    let missing = temp_dir.path().join("missing.toml");

    std::fs::write(
        &user,
        r#"
        [decode]
        max_frames = 10
        min_delay = 20

        [fetch]
        timeout = "30s"
        "#,
    )
    .unwrap();
    std::fs::write(
        &project,
        r#"
        [decode]
        max_frames = 5
        "#,
    )
    .unwrap();

    let config = Config::load_from_paths(&[user, missing, project]).unwrap();
    let decode = config.decode.unwrap();
    assert_eq!(decode.max_frames, Some(5));
    assert_eq!(decode.min_delay, Some(20));
    assert_eq!(config.fetch.unwrap().timeout, Some("30s".to_string()));
}

#[test]
fn test_load_from_paths_surfaces_parse_errors() {
    let temp_dir = TempDir::new().unwrap();
    let broken = temp_dir.path().join("broken.toml");
    std::fs::write(&broken, "[decode\nmax_frames = ").unwrap();

    let err = Config::load_from_paths(&[broken]).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse TOML"));
}

#[test]
fn test_explicit_config_only() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("custom.toml");
    std::fs::write(&path, "[fetch]\nmax_bytes = 2048\n").unwrap();

    let config = Config::load(Some(path.as_path())).unwrap();
    assert_eq!(config.fetch.unwrap().max_bytes, Some(2048));
    assert!(Config::load(Some(temp_dir.path().join("nope.toml").as_path())).is_err());
}

#[test]
#[serial]
fn test_xdg_config_path() {
    let temp_dir = TempDir::new().unwrap();
    let original = std::env::var_os("XDG_CONFIG_HOME");
    std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());

    let paths = Config::get_config_paths();
    let expected: PathBuf = temp_dir.path().join("gifpeek").join("config.toml");
    assert!(paths.contains(&expected));
    assert!(paths.last().unwrap().ends_with("gifpeek.toml"));

    match original {
        Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
        None => std::env::remove_var("XDG_CONFIG_HOME"),
    }
}

#[test]
#[serial]
fn test_settings_resolve_reads_environment() {
    let original = std::env::var_os("GIFPEEK_INLINE");
    std::env::set_var("GIFPEEK_INLINE", "iterm2");

    let config = Config {
        preview: Some(PreviewSection {
            protocol: Some("kitty".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    };
    assert_eq!(Settings::resolve(&config).protocol(), InlineProtocol::Iterm);

    match original {
        Some(value) => std::env::set_var("GIFPEEK_INLINE", value),
        None => std::env::remove_var("GIFPEEK_INLINE"),
    }
}

#[test]
fn test_settings_from_sections() {
    let config = Config {
        decode: Some(DecodeSection {
            max_bytes: Some(4096),
            ..Default::default()
        }),
        fetch: Some(FetchSection {
            timeout: Some("2m".to_string()),
            max_bytes: None,
        }),
        ..Default::default()
    };
    let settings = Settings::resolve_with(&config, |_| None);
    assert_eq!(settings.fetch_timeout, Duration::from_secs(120));
    assert_eq!(settings.fetch_max_bytes, Some(4096));
    assert_eq!(settings.limits.max_bytes, 4096);
    assert_eq!(settings.protocol(), InlineProtocol::None);
}
