use oneclick_core::{AggregateId, TenantId};

/// Intent to change exactly one aggregate stream of one tenant.
///
/// The dispatcher refuses a command whose tenant or target differs from the stream it is
/// dispatched to.
pub trait Command: Clone + core::fmt::Debug + Send + Sync + 'static {
    fn tenant_id(&self) -> TenantId;

    fn target_aggregate_id(&self) -> AggregateId;
}
