use std::collections::HashMap;
use std::fmt::Write;

use crate::models::result::ResultRecord;

const HEADER: &str = "Objects Detected:\n";

/// Count detections per class, keeping classes in first-seen order.
pub fn count_classes(record: &ResultRecord) -> Vec<(&str, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for label in &record.labels {
        let class = label.class.as_str();
        match index.get(class) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(class, counts.len());
                counts.push((class, 1));
            }
        }
    }
    counts
}

/// Render a detection summary, one `<class>: <count>` line per distinct class.
pub fn format_detections(record: &ResultRecord) -> String {
    let mut out = String::from(HEADER);
    for (class, count) in count_classes(record) {
        let _ = writeln!(out, "{class}: {count}");
    }
    out
}
