//! End-to-end orchestration test against a mock server: create →
//! partition → train → select → predict.

use meridian_client::{
    run_forecast, ApiClient, ApiError, ClientConfig, DatetimePartitioning, ForecastPlan,
};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn csv_file(header: &str, row: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", header).unwrap();
    writeln!(file, "{}", row).unwrap();
    file
}

async fn mock_service(server: &mut mockito::Server) {
    server
        .mock("POST", "/projects/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"projectId": "p-1", "processingJobId": "j-ingest"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/projects/p-1/jobs/j-ingest")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": "completed"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/projects/p-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"id": "p-1", "projectName": "store sales",
                "columns": ["date", "store", "sales", "holiday"]}"#,
        )
        .create_async()
        .await;
    server
        .mock("PATCH", "/projects/p-1/aim")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"jobId": "j-train"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/projects/p-1/jobs/j-train")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": "completed"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/projects/p-1/models/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {"id": "m-a", "modelType": "Elastic Net",
                 "metrics": {"RMSE": {"crossValidation": 0.5}}},
                {"id": "m-c", "modelType": "Gradient Boosted Trees",
                 "metrics": {"RMSE": {"crossValidation": 0.3}}}
            ]"#,
        )
        .create_async()
        .await;
    server
        .mock("POST", "/projects/p-1/predictionDatasets/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"datasetId": "d-1", "jobId": "j-data"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/projects/p-1/jobs/j-data")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": "completed"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/projects/p-1/predictionDatasets/d-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"id": "d-1", "projectId": "p-1", "name": "future.csv",
                "forecastPoint": "2014-06-14T00:00:00Z"}"#,
        )
        .create_async()
        .await;
    server
        .mock("POST", "/projects/p-1/predictions/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"jobId": "j-pred"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/projects/p-1/jobs/j-pred")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": "completed"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/projects/p-1/predictions/j-pred")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"predictions": [
                {"rowId": 0, "prediction": 4978.5, "forecastDistance": 1,
                 "forecastPoint": "2014-06-14T00:00:00Z", "seriesId": "store-1",
                 "timestamp": "2014-06-15T00:00:00Z"}
            ]}"#,
        )
        .create_async()
        .await;
}

fn plan(training: &NamedTempFile, prediction: &NamedTempFile) -> ForecastPlan {
    ForecastPlan {
        project_name: "store sales".to_string(),
        training_data: training.path().to_path_buf(),
        target: "sales".to_string(),
        metric: "RMSE".to_string(),
        partitioning: DatetimePartitioning::new("date")
            .time_series()
            .multiseries(vec!["store".to_string()])
            .feature_setting("holiday", true),
        prediction_data: prediction.path().to_path_buf(),
        forecast_point: Some("2014-06-14T00:00:00Z".parse().unwrap()),
        max_wait: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn test_full_forecast_flow() {
    let mut server = mockito::Server::new_async().await;
    mock_service(&mut server).await;

    let training = csv_file("date,store,sales,holiday", "2014-01-01,store-1,4200,0");
    let prediction = csv_file("date,store,holiday", "2014-06-15,store-1,0");
    let client = ApiClient::new(ClientConfig::new(server.url(), "tok").unwrap());

    let outcome = run_forecast(&client, plan(&training, &prediction), None).await.unwrap();

    assert_eq!(outcome.project.id(), "p-1");
    assert_eq!(outcome.project.target(), Some("sales"));
    assert_eq!(outcome.project.metric(), Some("RMSE"));
    assert_eq!(outcome.model_id, "m-c");
    assert_eq!(outcome.model_type, "Gradient Boosted Trees");
    assert_eq!(outcome.rows.len(), 1);
    assert!(outcome.rows[0].timestamp_is_consistent(chrono::Duration::days(1)));
}

#[tokio::test]
async fn test_flow_stops_before_submission_on_bad_partitioning() {
    let mut server = mockito::Server::new_async().await;
    // Only the creation endpoints are mocked: the aim submission must
    // never be reached.
    server
        .mock("POST", "/projects/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"projectId": "p-1", "processingJobId": "j-ingest"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/projects/p-1/jobs/j-ingest")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": "completed"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/projects/p-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": "p-1", "projectName": "store sales", "columns": ["date", "sales"]}"#)
        .create_async()
        .await;
    let aim = server
        .mock("PATCH", "/projects/p-1/aim")
        .expect(0)
        .create_async()
        .await;

    let training = csv_file("date,sales", "2014-01-01,4200");
    let prediction = csv_file("date", "2014-06-15");
    let client = ApiClient::new(ClientConfig::new(server.url(), "tok").unwrap());

    let mut bad_plan = plan(&training, &prediction);
    bad_plan.partitioning =
        DatetimePartitioning::new("date").time_series().feature_setting("weather", true);

    let err = run_forecast(&client, bad_plan, None).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(ref m) if m.contains("weather")));
    aim.assert_async().await;
}
