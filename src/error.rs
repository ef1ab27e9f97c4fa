use thiserror::Error;

/// Errors raised while grouping a stats summary.
///
/// `MissingSummary` is the only fatal variant; every other one is collected
/// alongside the partial output of the cycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupingError {
    #[error("got nil stats summary")]
    MissingSummary,

    #[error("pods data not found, possible data error in /stats/summary response")]
    PodsNotFound,

    #[error("empty node identifier, possible data error in /stats/summary response")]
    EmptyNodeIdentifier,

    #[error("empty pod identifier (name {name:?}, namespace {namespace:?}), possible data error in /stats/summary response")]
    EmptyPodIdentifier { name: String, namespace: String },

    #[error("empty container identifier in pod {pod}, possible data error in /stats/summary response")]
    EmptyContainerIdentifier { pod: String },

    #[error("empty volume identifier in pod {pod}, possible data error in /stats/summary response")]
    EmptyVolumeIdentifier { pod: String },
}

/// Errors raised while deriving entity labels from grouped records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntityError {
    #[error("{label:?} not found")]
    GroupNotFound { label: String },

    #[error("entity data {raw_entity_id:?} not found for {label:?}")]
    EntityNotFound { raw_entity_id: String, label: String },

    #[error("{key:?} not found for {label:?}")]
    KeyNotFound { key: String, label: String },

    #[error("incorrect type of {key:?} for {label:?}")]
    IncorrectType { key: String, label: String },

    #[error("generated entity ID is empty")]
    EmptyEntityId,

    #[error("empty values for generated entity type for {label:?}")]
    EmptyEntityType { label: String },
}
