use appdeploy_fs::{ConfigStore, Error, NormalizedPath};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Sample {
    folder: String,
    jobs: u32,
}

#[rstest]
#[case("config.toml")]
#[case("config.json")]
#[case("config.yaml")]
#[case("config.yml")]
fn test_save_then_load_by_extension(#[case] file_name: &str) {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join(file_name));
    let store = ConfigStore::new();
    let value = Sample {
        folder: "out".into(),
        jobs: 4,
    };

    store.save(&path, &value).unwrap();
    let loaded: Sample = store.load(&path).unwrap();

    assert_eq!(loaded, value);
}

#[test]
fn test_load_reports_format_on_parse_error() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("config.toml");
    std::fs::write(&file, "folder = [unterminated").unwrap();

    let result: Result<Sample, _> = ConfigStore::new().load(&NormalizedPath::new(&file));

    match result {
        Err(Error::ConfigParse { format, .. }) => assert_eq!(format, "TOML"),
        other => panic!("expected ConfigParse, got {:?}", other),
    }
}

#[test]
fn test_unknown_extension_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("config.ini");
    std::fs::write(&file, "folder=out").unwrap();

    let result: Result<Sample, _> = ConfigStore::new().load(&NormalizedPath::new(&file));

    assert!(matches!(result, Err(Error::UnsupportedFormat { .. })));
}
