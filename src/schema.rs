//! Dataset encoding schema
//!
//! The column sets and label maps that drive encoding are explicit,
//! immutable configuration rather than constants buried in the encoder,
//! so they can be tested and varied independently.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What to do when a binary/ordinal column holds a label outside its map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UnknownLabelPolicy {
    /// Treat the label as missing; it is later filled like any other null.
    Coerce,
    /// Reject the dataset with a validation error.
    Fail,
}

/// Declares how each recognized column of a raw dataset is encoded.
///
/// The four column sets are disjoint. Columns absent from the input are
/// skipped; columns present in the input but not declared here pass
/// through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingSchema {
    /// Columns that must end up numeric (the target included).
    pub numeric: Vec<String>,
    /// Two-valued label columns, all sharing `binary_map`.
    pub binary: Vec<String>,
    /// Shared label map for binary columns.
    pub binary_map: HashMap<String, i64>,
    /// Ordered-label columns with their per-column rank maps.
    pub ordinal: HashMap<String, HashMap<String, i64>>,
    /// Nominal columns expanded into indicator columns (drop-first).
    /// Processed in this order, so indicator columns appear predictably.
    pub one_hot: Vec<String>,
    /// Columns removed unconditionally when present.
    pub drop: Vec<String>,
    /// The regression target; never encoded or dropped.
    pub target: String,
    /// Fill label for a text column that has no mode at all.
    pub missing_label: String,
    pub unknown_labels: UnknownLabelPolicy,
}

impl EncodingSchema {
    /// The student-performance dataset schema.
    pub fn student_performance() -> Self {
        let rank3 = |a: &str, b: &str, c: &str| -> HashMap<String, i64> {
            HashMap::from([(a.to_string(), 0), (b.to_string(), 1), (c.to_string(), 2)])
        };

        let mut ordinal = HashMap::new();
        for col in [
            "Parental_Involvement",
            "Access_to_Resources",
            "Motivation_Level",
            "Family_Income",
            "Teacher_Quality",
        ] {
            ordinal.insert(col.to_string(), rank3("Low", "Medium", "High"));
        }
        ordinal.insert(
            "Peer_Influence".to_string(),
            rank3("Negative", "Neutral", "Positive"),
        );
        ordinal.insert(
            "Parental_Education_Level".to_string(),
            rank3("High School", "College", "Postgraduate"),
        );
        ordinal.insert(
            "Distance_from_Home".to_string(),
            rank3("Near", "Moderate", "Far"),
        );

        Self {
            numeric: [
                "Hours_Studied",
                "Attendance",
                "Sleep_Hours",
                "Previous_Scores",
                "Tutoring_Sessions",
                "Physical_Activity",
                "Exam_Score",
            ]
            .map(String::from)
            .to_vec(),
            binary: [
                "Extracurricular_Activities",
                "Internet_Access",
                "Learning_Disabilities",
            ]
            .map(String::from)
            .to_vec(),
            binary_map: HashMap::from([("Yes".to_string(), 1), ("No".to_string(), 0)]),
            ordinal,
            one_hot: ["School_Type", "Gender"].map(String::from).to_vec(),
            drop: vec!["id".to_string()],
            target: "Exam_Score".to_string(),
            missing_label: "Unknown".to_string(),
            unknown_labels: UnknownLabelPolicy::Coerce,
        }
    }

    /// Builder method to change the unknown-label policy.
    pub fn with_unknown_labels(mut self, policy: UnknownLabelPolicy) -> Self {
        self.unknown_labels = policy;
        self
    }

    /// Whether `name` belongs to the declared numeric set.
    pub fn is_numeric(&self, name: &str) -> bool {
        self.numeric.iter().any(|c| c == name)
    }
}
