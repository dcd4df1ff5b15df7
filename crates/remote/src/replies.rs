//! Typed views over the positional replies of each endpoint.
//!
//! The backend answers with UI update tuples; only a few positions carry data
//! the client needs. Everything else in a reply is ignored.

use serde_json::Value;
use word_core::normalize::{
    normalize_choices, resolve_candidates, text_value, word_list as normalize_word_list,
};
use word_core::{ProgressSnapshot, WordEntry, is_completion_status, parse_progress};

use crate::endpoint::Endpoint;
use crate::error::MalformedReply;

//
// ─── START LEARNING ────────────────────────────────────────────────────────────
//

const START_WORD: usize = 3;
const START_MEANING: usize = 4;
const START_PROGRESS: usize = 5;
const START_STATUS: usize = 7;

/// Outcome of `/start_learning`.
#[derive(Debug, Clone, PartialEq)]
pub enum StartReply {
    /// A first word to study.
    Word {
        entry: WordEntry,
        progress: Option<ProgressSnapshot>,
    },
    /// Every word of the file is already learned.
    Completed {
        status: String,
        progress: Option<ProgressSnapshot>,
    },
    /// The backend explained why it could not start.
    Status(String),
    /// Neither a word nor a status came back.
    Empty,
}

/// Interpret a `/start_learning` reply.
///
/// # Errors
///
/// Returns `MalformedReply` when the reply is too short to hold a status.
pub fn start_learning(reply: &[Value]) -> Result<StartReply, MalformedReply> {
    require_len(Endpoint::StartLearning, reply, START_STATUS + 1)?;

    let word = text_value(reply.get(START_WORD));
    let meaning = text_value(reply.get(START_MEANING));
    if let Ok(entry) = WordEntry::new(&word, &meaning) {
        let progress = parse_progress(&text_value(reply.get(START_PROGRESS)));
        return Ok(StartReply::Word { entry, progress });
    }

    let status = text_value(reply.get(START_STATUS));
    if status.is_empty() {
        Ok(StartReply::Empty)
    } else if is_completion_status(&status) {
        let progress = parse_progress(&status);
        Ok(StartReply::Completed { status, progress })
    } else {
        Ok(StartReply::Status(status))
    }
}

//
// ─── NEXT WORD ─────────────────────────────────────────────────────────────────
//

const NEXT_WORD: usize = 2;
const NEXT_MEANING: usize = 3;
const NEXT_PROGRESS: usize = 4;
const NEXT_STATISTICS: usize = 7;

/// Outcome of `/next_word`. No entry means no words remain.
#[derive(Debug, Clone, PartialEq)]
pub struct NextWordReply {
    pub entry: Option<WordEntry>,
    pub progress: Option<ProgressSnapshot>,
}

/// Interpret a `/next_word` reply. Short or empty replies read as "no words left".
#[must_use]
pub fn next_word(reply: &[Value]) -> NextWordReply {
    let word = text_value(reply.get(NEXT_WORD));
    let meaning = text_value(reply.get(NEXT_MEANING));
    match WordEntry::new(&word, &meaning) {
        Ok(entry) => NextWordReply {
            entry: Some(entry),
            progress: parse_progress(&text_value(reply.get(NEXT_PROGRESS))),
        },
        Err(_) => NextWordReply {
            entry: None,
            progress: parse_progress(&text_value(reply.get(NEXT_STATISTICS))),
        },
    }
}

//
// ─── MARK AS KNOWN ─────────────────────────────────────────────────────────────
//

const KNOWN_PROGRESS: usize = 2;

/// Progress reported by `/mark_as_known`, if any.
#[must_use]
pub fn mark_as_known(reply: &[Value]) -> Option<ProgressSnapshot> {
    parse_progress(&text_value(reply.get(KNOWN_PROGRESS)))
}

//
// ─── RESTART ───────────────────────────────────────────────────────────────────
//

const RESTART_WORD: usize = 2;
const RESTART_MEANING: usize = 3;
const RESTART_PROGRESS: usize = 4;

/// A word together with the progress reported alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct WordReply {
    pub entry: WordEntry,
    pub progress: Option<ProgressSnapshot>,
}

/// Interpret a `/reset_and_restart` reply.
///
/// # Errors
///
/// Returns `MalformedReply` when no complete word/meaning pair is present.
pub fn restart(reply: &[Value]) -> Result<WordReply, MalformedReply> {
    let word = text_value(reply.get(RESTART_WORD));
    let meaning = text_value(reply.get(RESTART_MEANING));
    let entry = WordEntry::new(&word, &meaning)
        .map_err(|e| MalformedReply::new(Endpoint::ResetAndRestart, e.to_string()))?;
    Ok(WordReply {
        entry,
        progress: parse_progress(&text_value(reply.get(RESTART_PROGRESS))),
    })
}

//
// ─── FILE SELECTION ────────────────────────────────────────────────────────────
//

/// Dropdown values from `/get_folders` or `/on_folder_change`.
///
/// # Errors
///
/// Returns `MalformedReply` when the first element carries no `choices` list.
pub fn choices(endpoint: Endpoint, reply: &[Value]) -> Result<Vec<String>, MalformedReply> {
    let choices = reply
        .first()
        .and_then(|update| update.get("choices"))
        .filter(|choices| choices.is_array())
        .ok_or_else(|| MalformedReply::new(endpoint, "missing choices list"))?;
    Ok(normalize_choices(choices))
}

/// Word list from `/load_word_list`; malformed items are dropped.
///
/// # Errors
///
/// Returns `MalformedReply` when the first element is not a list.
pub fn word_list(reply: &[Value]) -> Result<Vec<WordEntry>, MalformedReply> {
    match reply.first() {
        Some(items @ Value::Array(_)) => Ok(normalize_word_list(items)),
        _ => Err(MalformedReply::new(Endpoint::LoadWordList, "word list is not a list")),
    }
}

//
// ─── AUDIO ─────────────────────────────────────────────────────────────────────
//

/// Audio candidates from `/play_pronunciation` or `/play_word_pronunciation`.
#[must_use]
pub fn audio_candidates(reply: &[Value], base_url: &str) -> Vec<String> {
    resolve_candidates(reply.first(), base_url)
}

fn require_len(endpoint: Endpoint, reply: &[Value], len: usize) -> Result<(), MalformedReply> {
    if reply.len() < len {
        return Err(MalformedReply::new(
            endpoint,
            format!("expected at least {len} values, got {}", reply.len()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hidden() -> Value {
        json!({ "visible": false, "__type__": "update" })
    }

    #[test]
    fn start_with_word() {
        let reply = vec![
            hidden(),
            hidden(),
            hidden(),
            json!("apple"),
            json!({ "value": "苹果" }),
            json!("进度: 1/4 (25.0%)"),
            Value::Null,
            json!(""),
        ];
        match start_learning(&reply).unwrap() {
            StartReply::Word { entry, progress } => {
                assert_eq!(entry.word(), "apple");
                assert_eq!(entry.meaning(), "苹果");
                assert_eq!(progress.unwrap().learned(), 1);
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn start_with_completion_status() {
        let mut reply = vec![hidden(); 3];
        reply.extend([json!(""), json!(""), json!(""), Value::Null, json!("已学习: 4/4 单词")]);
        match start_learning(&reply).unwrap() {
            StartReply::Completed { status, progress } => {
                assert_eq!(status, "已学习: 4/4 单词");
                assert!(progress.unwrap().is_complete());
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn start_with_other_status_or_nothing() {
        let mut reply = vec![hidden(); 3];
        reply.extend([json!(""), json!(""), json!(""), Value::Null, json!("单词文件为空或加载失败")]);
        assert_eq!(
            start_learning(&reply).unwrap(),
            StartReply::Status("单词文件为空或加载失败".into())
        );

        reply[START_STATUS] = json!("");
        assert_eq!(start_learning(&reply).unwrap(), StartReply::Empty);
    }

    #[test]
    fn short_start_reply_is_malformed() {
        let err = start_learning(&[json!("apple")]).unwrap_err();
        assert_eq!(err.endpoint, Endpoint::StartLearning);
    }

    #[test]
    fn next_word_reads_word_or_statistics() {
        let reply = vec![
            hidden(),
            hidden(),
            json!("pear"),
            json!("梨"),
            json!("进度: 2/4 (50.0%)"),
        ];
        let next = next_word(&reply);
        assert_eq!(next.entry.unwrap().word(), "pear");
        assert_eq!(next.progress.unwrap().percentage(), 50.0);

        let reply = vec![
            hidden(),
            hidden(),
            json!(""),
            json!(""),
            json!(""),
            Value::Null,
            json!(""),
            json!("已学习: 4/4 单词"),
        ];
        let next = next_word(&reply);
        assert!(next.entry.is_none());
        assert_eq!(next.progress.unwrap().remaining(), 0);

        assert_eq!(
            next_word(&[]),
            NextWordReply { entry: None, progress: None }
        );
    }

    #[test]
    fn mark_as_known_reads_position_two() {
        let reply = vec![json!("apple"), json!("苹果"), json!("进度: 3/4 (75.0%)")];
        assert_eq!(mark_as_known(&reply).unwrap().learned(), 3);
        assert!(mark_as_known(&[json!(""), json!(""), json!("")]).is_none());
    }

    #[test]
    fn restart_requires_word_and_meaning() {
        let reply = vec![hidden(), hidden(), json!("kiwi"), json!("猕猴桃"), json!("0/4 (0.0%)")];
        let restarted = restart(&reply).unwrap();
        assert_eq!(restarted.entry.word(), "kiwi");
        assert_eq!(restarted.progress.unwrap().total(), 4);

        let reply = vec![hidden(), hidden(), json!("kiwi"), json!("")];
        assert!(restart(&reply).is_err());
    }

    #[test]
    fn choices_come_from_the_first_update() {
        let reply = vec![json!({ "choices": [["All", "all"], ["B", "b"]], "value": "all" })];
        assert_eq!(choices(Endpoint::GetFolders, &reply).unwrap(), vec!["all", "b"]);
        assert!(choices(Endpoint::GetFolders, &[json!("x")]).is_err());
        assert!(choices(Endpoint::OnFolderChange, &[]).is_err());
    }

    #[test]
    fn word_list_requires_a_list() {
        let reply = vec![json!([{ "word": "a", "meaning": "b" }, { "word": "c" }])];
        assert_eq!(word_list(&reply).unwrap().len(), 1);
        assert!(word_list(&[json!({})]).is_err());
    }

    #[test]
    fn audio_candidates_use_first_value() {
        let reply = vec![json!({ "path": "/tmp/a.wav", "url": null })];
        assert_eq!(audio_candidates(&reply, "http://h").len(), 2);
        assert!(audio_candidates(&[Value::Null], "http://h").is_empty());
    }
}
