//! Shared User-Agent string for catalog and asset HTTP clients.
//!
//! The collection API asks clients to identify themselves; both clients send
//! the same string so traffic stays attributable.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/harvester";

/// Default User-Agent for catalog and asset requests.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("harvester/{version} (collection-harvester; +{PROJECT_UA_URL})")
}
