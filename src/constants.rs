pub const CONFIG_DIR_NAME: &str = "apictl";
pub const APICTL_CONFIG_DIR_ENV: &str = "APICTL_CONFIG_DIR";
pub const MAIN_CONFIG_FILE: &str = "main_config.yaml";
pub const KEYS_FILE: &str = "keys.yaml";
pub const EXPORT_DIR_NAME: &str = "exported";
pub const EXPORTED_APPS_DIR_NAME: &str = "apps";

pub const PUBLISHER_API_PATH: &str = "/api/am/publisher/v4";
pub const ADMIN_API_PATH: &str = "/api/am/admin/v4";
pub const TOKEN_PATH: &str = "/oauth2/token";

/// Scopes requested for every access token
pub const DEFAULT_SCOPES: &[&str] = &[
    "apim:api_view",
    "apim:api_create",
    "apim:api_import_export",
    "apim:admin",
    "apim:app_import_export",
];

pub const DEFAULT_API_LIST_LIMIT: u32 = 25;
pub const DEFAULT_API_PROVIDER: &str = "admin";
