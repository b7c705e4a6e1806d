// Domain models

mod container;
mod snapshot;

pub use container::{ContainerIdentity, MetricRecord};
pub use snapshot::Snapshot;
