pub mod config;
pub mod finder;
pub mod store;

pub use config::{ConfigError, ZoneConfig, ZoneConfigFile, ZoneDecl, ZoneRole};
pub use finder::{
    DataSource, DataSourceError, FindAllResult, FindOptions, FindResult, FindStatus, ZoneFinder,
};
pub use store::ZoneStore;
