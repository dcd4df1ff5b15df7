use std::sync::{Arc, Mutex};

use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json},
    routing::{get, post},
};
use remote::replies::{self, StartReply};
use remote::{Endpoint, GradioClient, PredictClient, RemoteConfig, RpcError};
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Backend {
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

async fn config() -> Json<Value> {
    Json(json!({ "version": "5.0.0", "components": [] }))
}

async fn queue_call(
    State(backend): State<Backend>,
    Path(api): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    if api == "mark_as_known" {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": "down" })));
    }
    backend.calls.lock().unwrap().push((api.clone(), body));
    (StatusCode::OK, Json(json!({ "event_id": format!("evt-{api}") })))
}

async fn stream_result(Path((api, event_id)): Path<(String, String)>) -> impl IntoResponse {
    assert_eq!(event_id, format!("evt-{api}"));
    let body = match api.as_str() {
        "start_learning" => concat!(
            "event: generating\n",
            "data: null\n\n",
            "event: complete\n",
            "data: [{\"visible\": false}, {\"visible\": true}, {\"visible\": false}, ",
            "\"apple\", \"苹果\", \"进度: 0/3 (0.0%)\", null, \"\"]\n\n",
        ),
        "get_folders" => {
            "event: complete\ndata: [{\"choices\": [[\"Basics\", \"basics\"], [\"Travel\", \"travel\"]]}]\n\n"
        }
        "on_folder_change" => {
            "event: heartbeat\r\ndata: null\r\n\r\nevent: complete\r\ndata: [{\"choices\": [\"day1.json\"]}]\r\n\r\n"
        }
        "next_word" => "event: error\ndata: \"word list not loaded\"\n\n",
        "play_pronunciation" => {
            return (StatusCode::NOT_FOUND, "no such event").into_response();
        }
        _ => "event: heartbeat\ndata: null\n\n",
    };
    ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
}

async fn spawn_backend() -> (String, Backend) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/config", get(config))
        .route("/gradio_api/call/:api", post(queue_call))
        .route("/gradio_api/call/:api/:event_id", get(stream_result))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/"), backend)
}

async fn connected_client() -> (GradioClient, Backend) {
    let (base_url, backend) = spawn_backend().await;
    let client = GradioClient::new(&RemoteConfig::new(base_url)).unwrap();
    client.connect().await.unwrap();
    (client, backend)
}

#[tokio::test]
async fn predict_before_connect_fails() {
    let (base_url, _backend) = spawn_backend().await;
    let client = GradioClient::new(&RemoteConfig::new(base_url)).unwrap();

    let err = client.predict(Endpoint::GetFolders, vec![]).await.unwrap_err();
    assert!(matches!(err, RpcError::NotConnected));
    assert!(!client.base_url().ends_with('/'));
}

#[tokio::test]
async fn start_learning_round_trip() {
    let (client, backend) = connected_client().await;

    let reply = client
        .predict(Endpoint::StartLearning, vec![json!("basics"), json!("day1.json")])
        .await
        .unwrap();
    assert_eq!(reply.len(), 8);

    match replies::start_learning(&reply).unwrap() {
        StartReply::Word { entry, progress } => {
            assert_eq!(entry.word(), "apple");
            assert_eq!(progress.unwrap().total(), 3);
        }
        other => panic!("unexpected reply: {other:?}"),
    }

    let calls = backend.calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "start_learning");
    assert_eq!(calls[0].1, json!({ "data": ["basics", "day1.json"] }));
}

#[tokio::test]
async fn folder_choices_are_normalized() {
    let (client, _backend) = connected_client().await;

    let reply = client.predict(Endpoint::GetFolders, vec![]).await.unwrap();
    let folders = replies::choices(Endpoint::GetFolders, &reply).unwrap();
    assert_eq!(folders, vec!["basics", "travel"]);
}

#[tokio::test]
async fn crlf_framed_stream_is_read() {
    let (client, _backend) = connected_client().await;

    let reply = client
        .predict(Endpoint::OnFolderChange, vec![json!("basics")])
        .await
        .unwrap();
    let files = replies::choices(Endpoint::OnFolderChange, &reply).unwrap();
    assert_eq!(files, vec!["day1.json"]);
}

#[tokio::test]
async fn error_event_is_a_remote_error() {
    let (client, _backend) = connected_client().await;

    let err = client.predict(Endpoint::NextWord, vec![]).await.unwrap_err();
    match err {
        RpcError::Remote { endpoint, message } => {
            assert_eq!(endpoint, Endpoint::NextWord);
            assert_eq!(message, "word list not loaded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn rejected_call_reports_status() {
    let (client, _backend) = connected_client().await;

    let err = client.predict(Endpoint::MarkAsKnown, vec![]).await.unwrap_err();
    assert!(matches!(err, RpcError::HttpStatus(status) if status.as_u16() == 500));
}

#[tokio::test]
async fn rejected_result_stream_reports_status() {
    let (client, _backend) = connected_client().await;

    let err = client
        .predict(Endpoint::PlayPronunciation, vec![json!("apple")])
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::HttpStatus(status) if status.as_u16() == 404));
}

#[tokio::test]
async fn stream_without_result_is_malformed() {
    let (client, _backend) = connected_client().await;

    let err = client.predict(Endpoint::LoadWordList, vec![]).await.unwrap_err();
    assert!(matches!(err, RpcError::Malformed(_)));
}

#[tokio::test]
async fn unreachable_backend_fails_to_connect() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = GradioClient::new(&RemoteConfig::new(format!("http://{addr}"))).unwrap();
    let err = client.connect().await.unwrap_err();
    assert!(matches!(err, RpcError::Connection(_)));
    assert!(!client.is_connected());
}
