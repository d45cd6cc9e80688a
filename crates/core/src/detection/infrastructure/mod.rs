pub mod jsonl_detection_source;
