//! End-to-end tests against a live server on an ephemeral port.

#![allow(clippy::panic, clippy::indexing_slicing)]

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crowdfund_analytics::api::build_router;
use crowdfund_analytics::app_state::AppState;
use crowdfund_analytics::config::AnalyticsConfig;
use crowdfund_analytics::domain::{
    CampaignId, LedgerHandle, Normalizer, RawAmount, RawCampaign, RawDonation, RawTimestamp,
};
use crowdfund_analytics::persistence::{InMemoryKvStore, InMemoryLedger};
use crowdfund_analytics::service::{AnalyticsService, BookmarkService};

fn campaign(pid: u64, title: &str, target: &str, collected: &str, days: i64) -> RawCampaign {
    RawCampaign {
        pid: Some(pid),
        owner: Some("0xOwner".to_string()),
        title: Some(title.to_string()),
        description: Some(String::new()),
        target: Some(RawAmount::Wei(target.to_string())),
        deadline: Some(RawTimestamp::Seconds(
            (Utc::now() + Duration::days(days)).timestamp(),
        )),
        amount_collected: Some(RawAmount::Wei(collected.to_string())),
        image: None,
    }
}

fn donation(donor: &str, ether: f64, at: i64) -> RawDonation {
    RawDonation {
        donor: Some(donor.to_string()),
        amount: Some(RawAmount::Ether(ether)),
        timestamp: Some(RawTimestamp::Seconds(at)),
    }
}

fn ledger() -> InMemoryLedger {
    let t0 = 1_735_689_600;
    InMemoryLedger::new(Normalizer::default())
        .with_campaign(campaign(0, "Bravo", "10000000000000000000", "5000000000000000000", 5))
        .with_campaign(campaign(1, "alpha", "10000000000000000000", "5000000000000000000", 9))
        .with_campaign(campaign(2, "Charlie", "0", "1000000000000000000", -2))
        .with_donation(CampaignId::new(0), donation("0xA", 3.0, t0))
        .with_donation(CampaignId::new(0), donation("0xB", 2.0, t0 + 86_400))
        .with_donation(CampaignId::new(1), donation("0xB", 1.0, t0 + 3 * 86_400))
        .with_donation(CampaignId::new(2), donation("0xC", 1.0, t0))
        .with_failing_campaign(CampaignId::new(2))
}

async fn spawn(handle: LedgerHandle) -> SocketAddr {
    let state = AppState {
        analytics: Arc::new(AnalyticsService::from_config(
            &AnalyticsConfig::default(),
            handle,
        )),
        bookmarks: Arc::new(BookmarkService::new(Arc::new(InMemoryKvStore::new()))),
    };
    let app = build_router().with_state(state);
    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind ephemeral port");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn get_json(addr: SocketAddr, path: &str) -> (u16, Value) {
    let Ok(response) = reqwest::get(format!("http://{addr}{path}")).await else {
        panic!("GET {path} failed");
    };
    let status = response.status().as_u16();
    let Ok(body) = response.json::<Value>().await else {
        panic!("GET {path} returned non-JSON");
    };
    (status, body)
}

#[tokio::test]
async fn campaign_list_sorts_with_id_tiebreak() {
    let addr = spawn(LedgerHandle::ready(Arc::new(ledger()))).await;

    let (status, body) = get_json(addr, "/api/v1/campaigns?sort=mostFunded").await;
    assert_eq!(status, 200);
    let ids: Vec<u64> = body["data"]
        .as_array()
        .map(|a| a.iter().filter_map(|c| c["id"].as_u64()).collect())
        .unwrap_or_default();
    assert_eq!(ids, vec![0, 1, 2]);

    let (_, body) = get_json(addr, "/api/v1/campaigns?sort=percentFunded").await;
    let ids: Vec<u64> = body["data"]
        .as_array()
        .map(|a| a.iter().filter_map(|c| c["id"].as_u64()).collect())
        .unwrap_or_default();
    assert_eq!(ids, vec![0, 1, 2]);

    let (_, body) = get_json(addr, "/api/v1/campaigns?sort=alphabetical&status=active").await;
    let titles: Vec<&str> = body["data"]
        .as_array()
        .map(|a| a.iter().filter_map(|c| c["title"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(titles, vec!["alpha", "Bravo"]);
}

#[tokio::test]
async fn campaign_list_paginates() {
    let addr = spawn(LedgerHandle::ready(Arc::new(ledger()))).await;
    let (_, body) = get_json(addr, "/api/v1/campaigns?sort=oldest&page=2&per_page=2").await;
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["total_pages"], 2);
    assert_eq!(body["data"][0]["id"], 2);
}

#[tokio::test]
async fn detail_and_missing_campaign() {
    let addr = spawn(LedgerHandle::ready(Arc::new(ledger()))).await;

    let (status, body) = get_json(addr, "/api/v1/campaigns/0").await;
    assert_eq!(status, 200);
    assert_eq!(body["donor_count"], 2);
    assert_eq!(body["partial"], false);
    assert_eq!(body["top_donors"][0]["donor"], "0xa");
    assert_eq!(body["campaign"]["percent_funded"], 50.0);

    let (status, body) = get_json(addr, "/api/v1/campaigns/42").await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], 2001);
}

#[tokio::test]
async fn dashboard_counts_failed_campaign_as_zero() {
    let addr = spawn(LedgerHandle::ready(Arc::new(ledger()))).await;
    let (status, body) = get_json(addr, "/api/v1/analytics/dashboard").await;
    assert_eq!(status, 200);
    assert_eq!(body["ready"], true);
    assert_eq!(body["partial"], true);
    assert_eq!(body["campaign_count"], 3);
    assert_eq!(body["total_raised"], 6.0);
    assert_eq!(body["unique_donors"], 2);
    assert_eq!(body["failed_campaigns"][0]["campaign_id"], 2);
}

#[tokio::test]
async fn leaderboard_breaks_ties_by_address() {
    let addr = spawn(LedgerHandle::ready(Arc::new(ledger()))).await;
    let (_, body) = get_json(addr, "/api/v1/analytics/leaderboard?limit=5").await;
    let donors: Vec<&str> = body["donors"]
        .as_array()
        .map(|a| a.iter().filter_map(|d| d["donor"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(donors, vec!["0xa", "0xb"]);
    assert_eq!(body["donors"][1]["campaigns"], 2);

    let (status, _) = get_json(addr, "/api/v1/analytics/leaderboard?limit=0").await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn platform_timeseries_has_cumulative_totals_and_forecast() {
    let addr = spawn(LedgerHandle::ready(Arc::new(ledger()))).await;
    let (status, body) = get_json(
        addr,
        "/api/v1/analytics/timeseries?interval_days=1&forecast_days=3",
    )
    .await;
    assert_eq!(status, 200);
    let Some(buckets) = body["buckets"].as_array() else {
        panic!("buckets array");
    };
    assert_eq!(buckets.len(), 4);
    assert_eq!(buckets[3]["cumulative_amount"], 6.0);
    let Some(forecast) = body["forecast"].as_array() else {
        panic!("forecast array");
    };
    assert_eq!(forecast.len(), 3);
    assert!(forecast.iter().all(|p| p["amount"].as_f64().unwrap_or(-1.0) >= 0.0));
}

#[tokio::test]
async fn not_ready_ledger_degrades_views() {
    let addr = spawn(LedgerHandle::new()).await;

    let (status, body) = get_json(addr, "/api/v1/campaigns").await;
    assert_eq!(status, 503);
    assert_eq!(body["error"]["code"], 3002);

    let (status, body) = get_json(addr, "/api/v1/analytics/leaderboard").await;
    assert_eq!(status, 200);
    assert_eq!(body["ready"], false);
    assert_eq!(body["donors"], json!([]));
}

#[tokio::test]
async fn metrics_endpoints_guard_zero_denominators() {
    let addr = spawn(LedgerHandle::new()).await;
    let client = reqwest::Client::new();

    let (_, body) = get_json(addr, "/api/v1/metrics/success-rate?target=0&collected=5").await;
    assert_eq!(body["success_rate"], 0.0);

    let Ok(response) = client
        .post(format!("http://{addr}/api/v1/metrics/financial"))
        .json(&json!({ "raised": 100.0, "target": 200.0, "costs": 20.0 }))
        .send()
        .await
    else {
        panic!("POST financial failed");
    };
    let Ok(body) = response.json::<Value>().await else {
        panic!("financial JSON");
    };
    assert_eq!(body["cost_to_raise_ratio"], 20.0);
    assert_eq!(body["return_on_investment"], 400.0);
    assert_eq!(body["target_efficiency"], 50.0);
    assert_eq!(body["net_proceeds"], 80.0);

    let Ok(response) = client
        .post(format!("http://{addr}/api/v1/metrics/engagement"))
        .json(&json!({ "views": 0.0, "donors": 5.0, "shares": 2.0 }))
        .send()
        .await
    else {
        panic!("POST engagement failed");
    };
    let Ok(body) = response.json::<Value>().await else {
        panic!("engagement JSON");
    };
    assert_eq!(body["conversion_rate"], 0.0);
    assert_eq!(body["share_rate"], 0.0);
    assert_eq!(body["share_to_conversion_rate"], 0.0);
}

#[tokio::test]
async fn bookmarks_round_trip_through_http() {
    let addr = spawn(LedgerHandle::new()).await;
    let client = reqwest::Client::new();
    let base = format!("http://{addr}/api/v1/users/0xUser/bookmarks");

    for id in [5, 3] {
        let Ok(response) = client.put(format!("{base}/{id}")).send().await else {
            panic!("PUT bookmark failed");
        };
        assert_eq!(response.status().as_u16(), 200);
    }
    let (_, body) = get_json(addr, "/api/v1/users/0xuser/bookmarks").await;
    assert_eq!(body["campaign_ids"], json!([3, 5]));

    let Ok(response) = client.delete(format!("{base}/3")).send().await else {
        panic!("DELETE bookmark failed");
    };
    let Ok(body) = response.json::<Value>().await else {
        panic!("delete JSON");
    };
    assert_eq!(body["removed"], true);
}
