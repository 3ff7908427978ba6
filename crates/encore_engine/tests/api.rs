use std::time::Duration;

use encore_core::{Singer, Song};
use encore_engine::{ApiSettings, FailureKind, MusicApi, ReqwestApi};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ReqwestApi {
    ReqwestApi::new(ApiSettings {
        base_url: server.uri(),
        ..ApiSettings::default()
    })
    .expect("client")
}

async fn mount_json(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn song_index_accepts_numbers_and_strings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/song_index"))
        .and(query_param("mid", "003abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "data": {
                "music_index": 87.6,
                "global_rank": "1,024",
                "update_time": "2026-02-01",
                "index_change": "+1.2%",
                "chart_image": "/static/charts/003abc.png",
                "achievements": ["Top 100", "Gold"]
            }
        })))
        .mount(&server)
        .await;

    let index = api_for(&server).song_index("003abc").await.expect("index");
    assert_eq!(index.music_index.as_deref(), Some("87.6"));
    assert_eq!(index.global_rank.as_deref(), Some("1,024"));
    assert_eq!(index.index_change.as_deref(), Some("+1.2%"));
    assert_eq!(index.yesterday_rank, None);
    assert_eq!(index.achievements, vec!["Top 100".to_string(), "Gold".to_string()]);
}

#[tokio::test]
async fn song_index_non_zero_code_is_failure() {
    let server = MockServer::start().await;
    mount_json(&server, "/api/song_index", json!({ "code": -1, "msg": "busy" })).await;

    let err = api_for(&server).song_index("x").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Application { code: -1 });
    assert!(err.is_not_found());
}

#[tokio::test]
async fn song_index_without_data_is_failure() {
    let server = MockServer::start().await;
    mount_json(&server, "/api/song_index", json!({ "code": 0 })).await;

    let err = api_for(&server).song_index("x").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::MissingData);
}

#[tokio::test]
async fn http_errors_map_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/song_index"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = api_for(&server).song_index("x").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(502));
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn malformed_body_is_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/song_index"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = api_for(&server).song_index("x").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/song_index"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "code": 0, "data": {} }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let api = ReqwestApi::new(ApiSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(100),
        ..ApiSettings::default()
    })
    .unwrap();

    let err = api.song_index("x").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/upcoming-tours"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
        .mount(&server)
        .await;

    let api = ReqwestApi::new(ApiSettings {
        base_url: server.uri(),
        max_bytes: 16,
        ..ApiSettings::default()
    })
    .unwrap();

    let err = api.upcoming_tours().await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 16,
            actual: Some(64)
        }
    );
}

#[tokio::test]
async fn search_uses_hot_songs_of_singer_box() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search_singer"))
        .and(query_param("name", "杨丞琳"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "data": {
                "zhida": { "zhida_singer": {
                    "singerName": "杨丞琳",
                    "singerPic": "https://y.qq.com/pic.jpg",
                    "songNum": 356,
                    "albumNum": "41",
                    "hotsong": [
                        { "songmid": "m1", "songName": "雨爱", "albumName": "半熟宣言" },
                        { "songmid": "m2", "songName": "暧昧", "albumName": "暧昧" }
                    ]
                }},
                "song": { "list": [
                    { "songmid": "other", "songname": "ignored", "albumname": "ignored" }
                ]}
            }
        })))
        .mount(&server)
        .await;

    let result = api_for(&server).search_singer("杨丞琳").await.expect("search");
    assert_eq!(
        result.singer,
        Some(Singer {
            name: "杨丞琳".to_string(),
            picture_url: "https://y.qq.com/pic.jpg".to_string(),
            song_count: 356,
            album_count: 41,
        })
    );
    assert_eq!(
        result.songs,
        vec![Song::new("m1", "雨爱", "半熟宣言"), Song::new("m2", "暧昧", "暧昧")]
    );
}

#[tokio::test]
async fn search_without_singer_box_uses_song_list() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/api/search_singer",
        json!({
            "code": 0,
            "data": { "song": { "list": [
                { "songmid": "a1", "songname": "Song A", "albumname": "Album" }
            ]}}
        }),
    )
    .await;

    let result = api_for(&server).search_singer("someone").await.unwrap();
    assert_eq!(result.singer, None);
    assert_eq!(result.songs, vec![Song::new("a1", "Song A", "Album")]);
}

#[tokio::test]
async fn search_with_failing_code_is_not_found() {
    let server = MockServer::start().await;
    mount_json(&server, "/api/search_singer", json!({ "code": 1, "data": null })).await;

    let err = api_for(&server).search_singer("nobody").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn tours_are_parsed() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/api/upcoming-tours",
        json!([
            { "city": "苏州", "date": "2026-03-07T19:30:00", "venue": "苏州奥体中心" },
            { "city": "西安", "date": "2026-04-18T19:30:00", "venue": "西安奥体中心",
              "tour_name": "房间里的大象" }
        ]),
    )
    .await;

    let tours = api_for(&server).upcoming_tours().await.unwrap();
    assert_eq!(tours.len(), 2);
    assert_eq!(tours[0].city, "苏州");
    assert_eq!(tours[0].date_label(), "2026.03.07");
    assert!(tours[1].is_featured(Some("房间里的大象")));
}
