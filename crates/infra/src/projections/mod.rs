//! Projection implementations (read model builders).
//!
//! Projections consume committed events and build query-optimized read models. They are
//! rebuildable from the event stream, tenant-isolated, and idempotent under
//! at-least-once delivery.

pub mod products;

pub use products::{
    CatalogProjection, CatalogProjectionError, ProductReadModel, TemplateReadModel,
    TemplateSummary,
};
