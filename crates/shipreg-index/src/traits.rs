use async_trait::async_trait;
use shipreg_types::{IndexRecord, ShipmentId};

use crate::error::IndexResult;

/// Keyed store of descriptive shipment records.
///
/// Implementations must satisfy:
/// - `write` replaces the whole record (last writer wins, no merge, no
///   version check), so repeating a write is always safe.
/// - `read` returns `Ok(None)` for an absent entry; absence is not an error.
#[async_trait]
pub trait IndexStore: Send + Sync {
    async fn read(&self, id: ShipmentId) -> IndexResult<Option<IndexRecord>>;

    async fn write(&self, id: ShipmentId, record: &IndexRecord) -> IndexResult<()>;
}
