//! Default value functions for serde deserialization.

pub fn roadmap_path() -> String {
    "roadmap.txt".to_string()
}

pub fn snapshot_dir() -> String {
    "./output".to_string()
}

pub fn enabled() -> bool {
    true
}
