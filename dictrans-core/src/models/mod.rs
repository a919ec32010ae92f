mod cache_statistics;
mod dict_model;
mod field_value;
mod memory_usage;
mod monitoring_statistics;
mod pressure_level;
mod processing_statistics;
mod tracking_statistics;
mod translation_report;

pub use cache_statistics::CacheStatistics;
pub use dict_model::{row_text, DictModel, TableRow};
pub use field_value::key_text;
pub use memory_usage::MemoryUsageSnapshot;
pub use monitoring_statistics::MonitoringStatistics;
pub use pressure_level::PressureLevel;
pub use processing_statistics::{CircuitState, ProcessingStatistics};
pub use tracking_statistics::TrackingStatistics;
pub use translation_report::{Direction, FieldWarning, TranslationReport, WarningKind};
