//! Cache keys for catalog responses.

/// Cache key for catalog data.
///
/// The catalog endpoint only serves the full list today; single products are
/// resolved from it.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
}
