//! Integration test: prediction against a persisted bundle

use scorecast::model::{Predictor, Trainer};
use scorecast::ScorecastError;
use serde_json::json;
use std::path::PathBuf;

fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("scorecast-predict-{}-{name}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn train_model(dir: &PathBuf) {
    let mut csv = String::from("Hours_Studied,Attendance,Exam_Score\n");
    for i in 0..40 {
        let hours = i % 8;
        let attendance = 70 + (i * 3) % 30;
        let score = 45 + 4 * hours;
        csv.push_str(&format!("{hours},{attendance},{score}\n"));
    }
    std::fs::write(dir.join("scores_clean.csv"), csv).unwrap();

    Trainer::new(dir.clone(), dir.join("model.json"), "Exam_Score")
        .train_and_persist("scores_clean.csv")
        .unwrap();
}

#[test]
fn test_predict_without_training_is_not_found() {
    let dir = test_dir("untrained");
    let predictor = Predictor::new(dir.join("model.json"));

    let err = predictor.predict(&[json!({})]).unwrap_err();
    assert!(matches!(err, ScorecastError::NotFound(_)));
}

#[test]
fn test_empty_instance_yields_one_finite_prediction() {
    let dir = test_dir("empty");
    train_model(&dir);
    let predictor = Predictor::new(dir.join("model.json"));

    let response = predictor.predict(&[json!({})]).unwrap();
    assert_eq!(response.n, 1);
    assert_eq!(response.predictions.len(), 1);
    assert!(response.predictions[0].is_finite());
}

#[test]
fn test_unknown_keys_are_ignored() {
    let dir = test_dir("extra");
    train_model(&dir);
    let predictor = Predictor::new(dir.join("model.json"));

    let base = predictor
        .predict(&[json!({"Hours_Studied": 6, "Attendance": 85})])
        .unwrap();
    let with_extras = predictor
        .predict(&[json!({
            "Hours_Studied": 6,
            "Attendance": 85,
            "Shoe_Size": 44,
            "Favourite_Colour": 3,
        })])
        .unwrap();

    assert_eq!(base.predictions, with_extras.predictions);
}

#[test]
fn test_predictions_follow_the_signal() {
    let dir = test_dir("signal");
    train_model(&dir);
    let predictor = Predictor::new(dir.join("model.json"));

    let response = predictor
        .predict(&[
            json!({"Hours_Studied": 1, "Attendance": 80}),
            json!({"Hours_Studied": 7, "Attendance": 80}),
        ])
        .unwrap();

    assert_eq!(response.n, 2);
    assert!(
        response.predictions[1] > response.predictions[0],
        "more study hours should predict a higher score: {:?}",
        response.predictions
    );
}

#[test]
fn test_batch_order_and_count() {
    let dir = test_dir("batch");
    train_model(&dir);
    let predictor = Predictor::new(dir.join("model.json"));

    let instances: Vec<serde_json::Value> = (0..5)
        .map(|h| json!({"Hours_Studied": h, "Attendance": 80}))
        .collect();
    let response = predictor.predict(&instances).unwrap();

    assert_eq!(response.n, 5);
    assert_eq!(response.predictions.len(), 5);
}

#[test]
fn test_non_object_instance_rejected() {
    let dir = test_dir("badshape");
    train_model(&dir);
    let predictor = Predictor::new(dir.join("model.json"));

    let err = predictor.predict(&[json!("not an object")]).unwrap_err();
    assert!(matches!(err, ScorecastError::Validation(_)));
}
