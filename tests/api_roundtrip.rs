//! End-to-end API tests against a running server.

use std::time::Duration;

use fitness_tracker::config::StorageBackendKind;
use fitness_tracker::records::date::today;
use fitness_tracker::records::{FitnessRecord, FoodItem, PartitionLayout};
use fitness_tracker::TrackerConfig;

mod common;

fn sample(date: &str, calories: i32) -> FitnessRecord {
    let mut record = FitnessRecord::new(date);
    record.user_profile.weight_kg = 82.4;
    record.food_diary.push(FoodItem {
        time: "08:00".into(),
        item: "Oatmeal".into(),
        calories,
        protein_g: 12.0,
        carbs_g: 54.0,
        fat_g: 6.5,
    });
    record.daily_total_stats.total_intake_calories = calories;
    record
}

fn memory_config() -> TrackerConfig {
    let mut config = TrackerConfig::default();
    config.storage.backend = StorageBackendKind::Memory;
    config.refresh.interval_secs = 0;
    config
}

#[tokio::test]
async fn test_store_then_retrieve() {
    let server = common::spawn_server(memory_config()).await;
    let client = server.client();

    let record = sample("2024-03-15", 350);
    let (stored, created) = client.upsert(&record).await.unwrap();
    assert!(created);
    assert_eq!(stored, record);

    assert_eq!(client.by_date("2024-03-15").await.unwrap(), Some(record));
    assert_eq!(client.by_date("2024-03-16").await.unwrap(), None);
}

#[tokio::test]
async fn test_repost_overwrites_instead_of_duplicating() {
    let server = common::spawn_server(memory_config()).await;
    let client = server.client();

    client.upsert(&sample("2024-03-15", 350)).await.unwrap();
    let (_, created) = client.upsert(&sample("2024-03-15", 900)).await.unwrap();
    assert!(!created);

    let all = client.all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].daily_total_stats.total_intake_calories, 900);
}

#[tokio::test]
async fn test_year_and_month_queries() {
    let server = common::spawn_server(memory_config()).await;
    let client = server.client();

    for date in ["2023-03-10", "2024-02-29", "2024-03-01", "2024-03-31"] {
        client.upsert(&sample(date, 100)).await.unwrap();
    }

    assert_eq!(client.by_year("2024").await.unwrap().len(), 3);
    assert_eq!(client.by_month("2024", "03").await.unwrap().len(), 2);
    assert_eq!(client.by_month("2024", "3").await.unwrap().len(), 2);
    assert!(client.by_month("2025", "01").await.unwrap().is_empty());
    assert!(client.by_month("2024", "13").await.is_err());
}

#[tokio::test]
async fn test_raw_endpoint_defaults_to_today() {
    let server = common::spawn_server(memory_config()).await;
    let client = server.client();
    client.upsert(&sample(&today(), 500)).await.unwrap();

    let http = common::http_client();
    let res = http.get(format!("{}/get", server.url)).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: FitnessRecord = res.json().await.unwrap();
    assert_eq!(body.date, today());

    let res = http
        .get(format!("{}/get?date=1999-01-01", server.url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn test_cors_and_request_id_headers() {
    let server = common::spawn_server(memory_config()).await;
    let http = common::http_client();

    let res = http
        .get(format!("{}/api/fitness", server.url))
        .header("Origin", "http://example.com")
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert_eq!(res.headers()["x-request-id"], "trace-me");
    assert_eq!(res.text().await.unwrap(), "[]");
}

#[tokio::test]
async fn test_tree_storage_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = memory_config();
    config.storage.backend = StorageBackendKind::Tree;
    config.storage.path = dir.path().to_string_lossy().into_owned();
    config.storage.layout = PartitionLayout::Month;

    {
        let server = common::spawn_server(config.clone()).await;
        let client = server.client();
        client.upsert(&sample("2024-03-15", 350)).await.unwrap();
        client.upsert(&sample("2024-04-01", 420)).await.unwrap();
    }

    assert!(dir.path().join("2024/03.json").exists());
    assert!(dir.path().join("2024/04.json").exists());

    let server = common::spawn_server(config).await;
    let all = server.client().all().await.unwrap();
    let dates: Vec<_> = all.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(dates, vec!["2024-03-15", "2024-04-01"]);
}

#[tokio::test]
async fn test_periodic_refresh_picks_up_external_edits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fitness.json");

    let mut config = memory_config();
    config.storage.backend = StorageBackendKind::File;
    config.storage.path = path.to_string_lossy().into_owned();
    config.refresh.interval_secs = 1;

    let server = common::spawn_server(config.clone()).await;
    let shutdown_rx = server.shutdown.subscribe();
    let refresh = fitness_tracker::records::RefreshTask::new(
        server.store.clone(),
        Duration::from_secs(config.refresh.interval_secs),
    );
    tokio::spawn(refresh.run(shutdown_rx));

    let client = server.client();
    client.upsert(&sample("2024-03-15", 350)).await.unwrap();

    let edited = vec![sample("2024-03-15", 350), sample("2024-03-16", 10)];
    std::fs::write(&path, serde_json::to_vec(&edited).unwrap()).unwrap();

    tokio::time::sleep(Duration::from_millis(1600)).await;
    assert!(client.by_date("2024-03-16").await.unwrap().is_some());
}
