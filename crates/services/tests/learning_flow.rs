use std::sync::Arc;

use remote::{Endpoint, ScriptedClient};
use serde_json::{Value, json};
use services::{StartOutcome, WordLearningService};

fn hidden() -> Value {
    json!({ "visible": false, "__type__": "update" })
}

fn start_reply(word: &str, meaning: &str, progress: &str, status: &str) -> Vec<Value> {
    vec![
        hidden(),
        hidden(),
        hidden(),
        json!(word),
        json!(meaning),
        json!(progress),
        Value::Null,
        json!(status),
    ]
}

fn next_reply(word: &str, meaning: &str, progress: &str, statistics: &str) -> Vec<Value> {
    vec![
        hidden(),
        hidden(),
        json!(word),
        json!(meaning),
        json!(progress),
        Value::Null,
        json!(""),
        json!(statistics),
    ]
}

fn service(client: &ScriptedClient) -> WordLearningService {
    WordLearningService::new(Arc::new(client.clone()))
}

#[tokio::test]
async fn full_session_walkthrough() {
    let client = ScriptedClient::connected("http://127.0.0.1:7860");
    client.push_reply(
        Endpoint::StartLearning,
        start_reply("apple", "苹果", "进度: 0/2 (0.0%)", ""),
    );
    client.push_reply(
        Endpoint::MarkAsKnown,
        vec![json!("apple"), json!("苹果"), json!("进度: 1/2 (50.0%)"), Value::Null, json!("✓")],
    );
    client.push_reply(
        Endpoint::NextWord,
        next_reply("pear", "梨", "进度: 1/2 (50.0%)", ""),
    );
    client.push_reply(
        Endpoint::MarkAsKnown,
        vec![json!("pear"), json!("梨"), json!("进度: 2/2 (100.0%)"), Value::Null, json!("✓")],
    );
    client.push_reply(Endpoint::NextWord, next_reply("", "", "", "已学习: 2/2 单词"));
    let service = service(&client);

    let outcome = service.start_learning("basics", "day1.json").await;
    assert_eq!(outcome, StartOutcome::Learning);
    assert_eq!(service.current_word().unwrap().word(), "apple");
    assert_eq!(service.progress().total(), 2);

    assert!(service.flip_card());
    assert!(service.mark_as_known().await);
    assert_eq!(service.progress().learned(), 1);
    assert!(service.is_flipped(), "marking keeps the card face");

    assert!(service.next_word().await);
    let state = service.snapshot();
    assert_eq!(state.current().unwrap().meaning(), "梨");
    assert!(!state.is_flipped());

    assert!(service.mark_as_known().await);
    assert!(service.next_word().await);
    assert!(service.current_word().is_none());
    assert!(service.is_complete());
    assert_eq!(service.progress().percentage(), 100.0);

    assert!(!service.mark_as_known().await);
    assert_eq!(client.calls_to(Endpoint::MarkAsKnown), 2);

    let calls = client.calls();
    assert_eq!(calls[0].args, vec![json!("basics"), json!("day1.json")]);
}

#[tokio::test]
async fn completion_status_yields_completion() {
    let client = ScriptedClient::connected("http://h");
    client.push_reply(
        Endpoint::StartLearning,
        start_reply("", "", "", "已学习: 5 / 5 单词"),
    );
    let service = service(&client);

    let outcome = service.start_learning("basics", "day1.json").await;
    assert_eq!(
        outcome,
        StartOutcome::Completion {
            message: "已学习: 5 / 5 单词".into()
        }
    );
    assert!(outcome.is_success());
    assert!(service.current_word().is_none());
    let progress = service.progress();
    assert_eq!((progress.learned(), progress.total(), progress.remaining()), (5, 5, 0));
    assert_eq!(progress.percentage(), 100.0);
}

#[tokio::test]
async fn other_status_yields_error() {
    let client = ScriptedClient::connected("http://h");
    client.push_reply(
        Endpoint::StartLearning,
        start_reply("", "", "", "单词文件为空或加载失败"),
    );
    client.push_reply(Endpoint::StartLearning, start_reply("apple", "", "", ""));
    let service = service(&client);

    assert_eq!(
        service.start_learning("basics", "empty.json").await,
        StartOutcome::Error {
            message: "单词文件为空或加载失败".into()
        }
    );
    assert_eq!(
        service.start_learning("basics", "broken.json").await,
        StartOutcome::Error {
            message: "no word data returned".into()
        }
    );
    assert!(service.current_word().is_none());
}

#[tokio::test]
async fn restart_without_a_word_keeps_prior_state() {
    let client = ScriptedClient::connected("http://h");
    client.push_reply(
        Endpoint::StartLearning,
        start_reply("apple", "苹果", "进度: 1/3 (33.3%)", ""),
    );
    client.push_reply(
        Endpoint::ResetAndRestart,
        vec![hidden(), hidden(), json!(""), json!(""), json!("进度: 0/3 (0.0%)")],
    );
    client.push_reply(
        Endpoint::ResetAndRestart,
        vec![hidden(), hidden(), json!("kiwi"), json!("猕猴桃"), json!("进度: 0/3 (0.0%)")],
    );
    let service = service(&client);
    service.start_learning("basics", "day1.json").await;
    service.flip_card();
    let before = service.snapshot();

    assert!(!service.restart_learning().await);
    assert_eq!(service.snapshot(), before);

    assert!(service.restart_learning().await);
    assert_eq!(service.current_word().unwrap().word(), "kiwi");
    assert!(!service.is_flipped());
    assert_eq!(service.progress().learned(), 0);
}

#[tokio::test]
async fn unparsable_progress_keeps_the_snapshot() {
    let client = ScriptedClient::connected("http://h");
    client.push_reply(
        Endpoint::StartLearning,
        start_reply("apple", "苹果", "进度: 1/3 (33.3%)", ""),
    );
    client.push_reply(Endpoint::NextWord, next_reply("pear", "梨", "garbage", ""));
    let service = service(&client);
    service.start_learning("basics", "day1.json").await;

    assert!(service.next_word().await);
    assert_eq!(service.current_word().unwrap().word(), "pear");
    assert_eq!(service.progress().learned(), 1);
}

#[tokio::test]
async fn failed_calls_return_false_and_reset_clears() {
    let client = ScriptedClient::connected("http://h");
    client.push_reply(
        Endpoint::StartLearning,
        start_reply("apple", "苹果", "进度: 1/3 (33.3%)", ""),
    );
    client.push_failure(Endpoint::MarkAsKnown, "timeout");
    client.push_failure(Endpoint::NextWord, "timeout");
    let service = service(&client);
    service.start_learning("basics", "day1.json").await;

    assert!(!service.mark_as_known().await);
    assert!(!service.next_word().await);
    assert_eq!(service.current_word().unwrap().word(), "apple");

    service.reset();
    assert!(service.current_word().is_none());
    assert!(!service.is_flipped());
    assert_eq!(service.progress().total(), 0);
}
