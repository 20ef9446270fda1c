pub mod constants;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{is_in_scope, is_special_href, is_valid_url, normalize_url, resolve_href};
