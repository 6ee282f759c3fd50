pub mod spark_application;

/// Field manager recorded on every object this service creates.
pub(crate) const FIELD_MANAGER: &str = "spark-launcher";
