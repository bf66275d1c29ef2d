//! Config-file loading tests for the zone table.

use std::io::Write;
use std::sync::Arc;

use gjallar::dns::{Name, RRClass};
use gjallar::zone::{ConfigError, DataSource, ZoneConfig, ZoneConfigFile, ZoneRole, ZoneStore};

fn name(s: &str) -> Name {
    s.parse().unwrap()
}

#[test]
fn test_load_zone_table_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[[zone]]
origin = "example.org"
class = "IN"
role = "primary"

[[zone]]
origin = "backup.example"
role = "secondary"
"#
    )
    .unwrap();

    let decls = ZoneConfigFile::load(file.path()).unwrap();
    assert_eq!(decls.zones.len(), 2);

    let store: Arc<dyn DataSource> = Arc::new(ZoneStore::new());
    let config = ZoneConfig::from_decls(&decls, store).unwrap();

    let (role, datasrc) = config.find_zone(&name("example.org"), RRClass::IN);
    assert_eq!(role, ZoneRole::Primary);
    assert!(datasrc.is_some());

    let (role, datasrc) = config.find_zone(&name("backup.example"), RRClass::IN);
    assert_eq!(role, ZoneRole::Secondary);
    assert!(datasrc.is_none());
}

#[test]
fn test_missing_file_is_io_error() {
    let err = ZoneConfigFile::load("/nonexistent/zones.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let err = ZoneConfigFile::parse("[[zone]\norigin = ").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
