//! Fixed text shipped with the generator.

use rust_embed::RustEmbed;

use crate::error::{GenError, Result};

#[derive(RustEmbed)]
#[folder = "resources/"]
struct Resources;

pub const URL_HELPERS: &str = "url_helpers.ts";
pub const GENERATED_NOTICE: &str = "generated_notice.txt";

/// Load an embedded resource as text.
pub fn load(name: &str) -> Result<String> {
    let file = Resources::get(name).ok_or_else(|| GenError::MissingResource(name.to_string()))?;
    String::from_utf8(file.data.into_owned()).map_err(|_| GenError::MissingResource(name.to_string()))
}
