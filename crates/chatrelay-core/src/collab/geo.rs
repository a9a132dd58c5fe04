//! Geo lookup collaborator trait.

use chatrelay_types::visitor::GeoInfo;

/// Resolves a client address to a city/country pair.
///
/// Consumed only by the session resolver. `None` covers every failure
/// mode -- unreachable service, unknown address, malformed response --
/// and the caller substitutes sentinel values.
pub trait GeoLookup: Send + Sync + 'static {
    fn lookup(
        &self,
        addr: &str,
    ) -> impl std::future::Future<Output = Option<GeoInfo>> + Send;
}
