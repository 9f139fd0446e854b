//! Yandex OAuth constants
//!
//! Endpoints of the Yandex OAuth server and the defaults the directory
//! client uses. Client ID and secret are per-application and come from
//! configuration, never from here.

/// Authorization endpoint the user visits to grant consent
pub const AUTHORIZE_ENDPOINT: &str = "https://oauth.yandex.ru/authorize";

/// Token endpoint for code exchange and token refresh
pub const TOKEN_ENDPOINT: &str = "https://oauth.yandex.ru/token";

/// Authorization scheme the directory API expects (`Authorization: OAuth <token>`)
pub const TOKEN_TYPE: &str = "OAuth";

/// Default token file, relative to the working directory
pub const DEFAULT_TOKEN_FILE: &str = ".token";
