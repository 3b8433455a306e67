//! FlareNet Inspection Console Common Library
//!
//! CLIとWeb(WASM)で共有される型とロジック:
//! 記録の解決、異常オーバーレイの座標変換、下書きの自動保存

pub mod analysis;
pub mod api;
pub mod autosave;
pub mod error;
pub mod export;
pub mod normalize;
pub mod overlay;
pub mod record;
pub mod resolver;
pub mod storage;
pub mod types;
pub mod view;

pub use analysis::resolve_anomalies;
pub use api::{AnnotationApi, ImageApi, InspectionApi, MaintenanceRecordApi};
pub use autosave::{Debounce, DraftAutosave, RestoreSource, DRAFT_DEBOUNCE_MS};
pub use error::{Error, Result};
pub use overlay::{map_overlays, map_to_screen, OverlayBox, OverlayOffset, OverlayTone, ScreenRect};
pub use record::{Field, MaintenanceRecord, MaintenanceStatus, RecordIdentity, Section, SectionRecord};
pub use resolver::{RecordProvenance, RecordResolver, RecordTarget, ResolvedRecord, TargetTicket};
pub use storage::{KeyValueStore, MemoryStore};
pub use types::{Anomaly, AnomalySource, BoundingBox, ImageDimensions, Inspection, ThermalImage, Transformer};
pub use view::{load_record_view, RecordView};
