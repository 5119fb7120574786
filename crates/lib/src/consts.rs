pub const APP_NAME: &str = "depends";

/// Name of the optional configuration file looked up in the dependencies root.
pub const CONFIG_FILENAME: &str = "depends.toml";

/// Environment variable overriding the dependencies root.
pub const ROOT_ENV_VAR: &str = "DEPENDS_ROOT";

pub const DEFAULT_ROOT: &str = "depends";

pub const XERCES_VERSION: &str = "3.1.4";
pub const WX_VERSION: &str = "3.0.4";
pub const CSPICE_VERSION: &str = "N0065";
pub const OSX_MIN_VERSION: &str = "10.10";
pub const VS_VERSION: &str = "12";
pub const MAKE_JOBS: u32 = 8;

pub const XERCES_SOURCE_URL: &str = "https://archive.apache.org/dist/xerces/c/3/sources";
pub const WX_RELEASE_URL: &str = "https://github.com/wxWidgets/wxWidgets/releases/download";
pub const NAIF_TOOLKIT_URL: &str = "https://naif.jpl.nasa.gov/pub/naif/misc";
