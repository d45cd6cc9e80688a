pub mod alert_snapshot;
pub mod frame_annotator;
pub mod image_io;
