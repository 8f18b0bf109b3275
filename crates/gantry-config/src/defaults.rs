//! Default configuration values

/// Configuration file name
pub const CONFIG_FILE: &str = "gantry.json";

/// Name by which workspace configurations refer to the root configuration
pub const ROOT_WORKSPACE: &str = "//";

/// Remediation shown when a configuration file is required but missing
pub const NOT_FOUND_REMEDIATION: &str =
    "Create one at the repository root; see https://github.com/example/gantry#configuration";

/// Starting point written by tooling that scaffolds a new configuration
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"{
  // Files whose change invalidates every task
  "globalDependencies": [],
  "pipeline": {
    "build": {
      "dependsOn": ["^build"],
      "outputs": ["dist/**"]
    },
    "test": {
      "dependsOn": ["build"]
    },
    "dev": {
      "cache": false,
      "persistent": true
    }
  }
}
"#;
