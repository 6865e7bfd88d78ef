//! Health check endpoint tests.

use pricing_tests::create_test_client;

#[tokio::test]
#[ignore = "requires a running pricing-service"]
async fn test_health_check() {
    let client = create_test_client().expect("Failed to create client");

    let health = client.health_check().await.expect("Health check failed");

    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[tokio::test]
#[ignore = "requires a running pricing-service"]
async fn test_readiness_check() {
    let client = create_test_client().expect("Failed to create client");

    let ready = client
        .readiness_check()
        .await
        .expect("Readiness check failed");

    assert_eq!(ready.status, "ready");
    assert!(!ready.repository.is_empty());
}
