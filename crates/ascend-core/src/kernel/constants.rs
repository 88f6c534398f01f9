//! Framework-wide constants.
use std::path::PathBuf;

/// Framework name, also the config namespacing key and `framework` field value.
pub const FRAMEWORK_NAME: &str = "ascend";

/// Framework version, taken from the crate manifest.
pub const FRAMEWORK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Per-user configuration directory name, under the home directory.
pub const CONFIG_DIR_NAME: &str = ".ascend";

/// Project-local plugin directory.
pub const LOCAL_PLUGIN_DIR: &str = "./plugins";

/// Plugin directory under the per-user configuration directory.
pub const USER_PLUGIN_SUBDIR: &str = ".ascend/plugins";

/// System-wide plugin directory.
pub const SYSTEM_PLUGIN_DIR: &str = "/opt/ascend/plugins";

/// The fixed default plugin search paths, in precedence order.
pub fn default_plugin_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_PLUGIN_DIR)];
    if let Some(home) = std::env::var_os("HOME") {
        paths.push(PathBuf::from(home).join(USER_PLUGIN_SUBDIR));
    }
    paths.push(PathBuf::from(SYSTEM_PLUGIN_DIR));
    paths
}
