//! Query encoding and event polling over real HTTP.

use super::*;
use integrations_bullhorn::{EventPoll, QueryOptions, QueryPage, QUERY_BODY_THRESHOLD};
use wiremock::matchers::body_partial_json;

#[tokio::test]
async fn test_short_query_is_sent_as_get() {
    let harness = Harness::start(Some("live")).await;
    Mock::given(method("GET"))
        .and(path(rest_path("query/JobOrder")))
        .and(query_param("where", "isOpen=true AND status<>'Closed'"))
        .and(query_param("fields", "id,title"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1, "start": 0, "count": 1, "data": [{"id": 3, "title": "Engineer"}]
        })))
        .expect(1)
        .mount(&harness.server)
        .await;

    let client = harness.client().await;
    let page: QueryPage = client
        .search()
        .query(
            "JobOrder",
            "isOpen=true AND status<>'Closed'",
            &QueryOptions::new().fields(["id", "title"]),
        )
        .await
        .unwrap();

    assert_eq!(page.data[0]["title"], "Engineer");
}

#[tokio::test]
async fn test_long_query_is_sent_as_post_body() {
    let harness = Harness::start(Some("live")).await;
    let ids: Vec<String> = (0..2000).map(|i| i.to_string()).collect();
    let filter = format!("id IN ({})", ids.join(","));
    assert!(filter.len() >= QUERY_BODY_THRESHOLD);

    Mock::given(method("POST"))
        .and(path(rest_path("query/Candidate")))
        .and(body_partial_json(json!({"where": filter.as_str(), "count": 10})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 0, "data": []})))
        .expect(1)
        .mount(&harness.server)
        .await;

    let client = harness.client().await;
    let page: QueryPage = client
        .search()
        .query("Candidate", &filter, &QueryOptions::new().count(10))
        .await
        .unwrap();

    assert!(page.data.is_empty());
}

#[tokio::test]
async fn test_empty_poll_is_no_events() {
    let harness = Harness::start(Some("live")).await;
    Mock::given(method("GET"))
        .and(path(rest_path("event/subscription/jobSub")))
        .and(query_param("maxEvents", "100"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&harness.server)
        .await;

    let client = harness.client().await;
    let poll = client.events().poll_events("jobSub", 100, None).await.unwrap();

    assert!(matches!(poll, EventPoll::NoEvents));
}

#[tokio::test]
async fn test_recapture_reads_last_batch() {
    let harness = Harness::start(Some("live")).await;
    Mock::given(method("GET"))
        .and(path(rest_path("event/subscription/jobSub/lastRequestId")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": 4})))
        .expect(1)
        .mount(&harness.server)
        .await;
    Mock::given(method("GET"))
        .and(path(rest_path("event/subscription/jobSub")))
        .and(query_param("requestId", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requestId": 4,
            "events": [{"eventId": "ID:1", "entityName": "JobOrder", "entityId": 8}]
        })))
        .expect(1)
        .mount(&harness.server)
        .await;

    let client = harness.client().await;
    let poll = client.events().recapture("jobSub", 100).await.unwrap();

    assert_eq!(poll.request_id(), Some(4));
    assert_eq!(poll.events()[0].entity_id, Some(8));
}
