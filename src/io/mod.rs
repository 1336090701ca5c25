pub mod integrity_check;
pub mod output;
pub mod record;

pub use record::{load_record, save_record, AngleCheck, IjkPoint, LandmarkRecord, VolumeMetadata};
