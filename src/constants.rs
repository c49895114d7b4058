pub const ENV_SUBDOMAIN: &str = "KINTONE_SUBDOMAIN";
pub const ENV_USERNAME: &str = "KINTONE_USERNAME";
pub const ENV_PASSWORD: &str = "KINTONE_PASSWORD";
pub const ENV_PROXY: &str = "KINTONE_PROXY";

/// Where the issued plugin ID is kept between runs unless `--idfile` says otherwise
pub const DEFAULT_ID_FILE: &str = "pluginId.txt";

/// Domain appended to a bare subdomain label
pub const KINTONE_DOMAIN: &str = "cybozu.com";

pub const AUTH_HEADER: &str = "x-cybozu-authorization";
