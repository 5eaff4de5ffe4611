//! One user submission, from utterance to recorded reply

use maya_core::session::{SessionManager, Turn};
use maya_providers::IntentClient;
use tracing::debug;

/// Result of a single exchange
#[derive(Debug, Clone)]
pub struct ExchangeOutcome {
    pub reply: String,
    /// Set when the fallback reply was used
    pub notice: Option<String>,
    pub transcript: Vec<Turn>,
}

/// Record `text` as a user turn, ask the intent service, record the reply.
///
/// The registry lock is only taken for bookkeeping; the remote call runs
/// with the session in `AwaitingReply`, so a second submission for the same
/// session fails instead of interleaving. Remote failures never surface
/// here: they come back as the fallback reply plus a notice.
pub async fn exchange(
    sessions: &SessionManager,
    client: &IntentClient,
    handle: &str,
    text: &str,
    language_code: Option<&str>,
) -> maya_core::Result<ExchangeOutcome> {
    let pending = sessions.with_session(handle, |session| session.begin_turn(text))??;

    debug!(handle = %handle, session_id = %pending.session_id, "Utterance recorded");
    let reply = match language_code {
        Some(language_code) => {
            client
                .send_in_language(&pending.session_id, &pending.utterance, language_code)
                .await
        }
        None => client.send(&pending.session_id, &pending.utterance).await,
    };

    let transcript = sessions.with_session(handle, |session| {
        session.complete_turn(reply.text.clone())?;
        Ok::<_, maya_core::Error>(session.transcript().to_vec())
    })??;

    Ok(ExchangeOutcome {
        reply: reply.text,
        notice: reply.notice,
        transcript,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{EchoProvider, GatedProvider};
    use maya_core::session::{ConversationState, Role};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_exchange_appends_user_then_assistant() {
        let sessions = SessionManager::new("Hey there!", 10);
        let client = IntentClient::new(Arc::new(EchoProvider::ok("Hi! How are you doing?")));
        let handle = sessions.create().unwrap();

        let outcome = exchange(&sessions, &client, &handle, "hello", None)
            .await
            .unwrap();

        assert_eq!(outcome.reply, "Hi! How are you doing?");
        assert!(outcome.notice.is_none());
        assert_eq!(outcome.transcript.len(), 3);
        assert_eq!(outcome.transcript[1].role, Role::User);
        assert_eq!(outcome.transcript[1].content, "hello");
        assert_eq!(outcome.transcript[2].role, Role::Assistant);
        assert_eq!(outcome.transcript[2].content, "Hi! How are you doing?");

        let state = sessions.with_session(&handle, |s| s.state()).unwrap();
        assert_eq!(state, ConversationState::Idle);
    }

    #[tokio::test]
    async fn test_exchange_reuses_session_id() {
        let sessions = SessionManager::new("hi", 10);
        let provider = Arc::new(EchoProvider::ok("ok"));
        let client = IntentClient::new(provider.clone());
        let handle = sessions.create().unwrap();

        exchange(&sessions, &client, &handle, "one", None).await.unwrap();
        exchange(&sessions, &client, &handle, "two", Some("de"))
            .await
            .unwrap();

        let seen = provider.requests();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].session_id, seen[1].session_id);
        assert_eq!(seen[0].language_code, "en-US");
        assert_eq!(seen[1].language_code, "de");
    }

    #[tokio::test]
    async fn test_exchange_failure_records_fallback() {
        let sessions = SessionManager::new("hi", 10);
        let client = IntentClient::new(Arc::new(EchoProvider::failing("quota exceeded")));
        let handle = sessions.create().unwrap();

        let outcome = exchange(&sessions, &client, &handle, "hello", None)
            .await
            .unwrap();

        assert_eq!(outcome.reply, "Sorry, I'm having trouble connecting right now.");
        assert!(outcome.notice.unwrap().contains("quota exceeded"));
        assert_eq!(outcome.transcript.len(), 3);
        assert_eq!(outcome.transcript[2].content, outcome.reply);
    }

    #[tokio::test]
    async fn test_exchange_rejects_blank_and_unknown() {
        let sessions = SessionManager::new("hi", 10);
        let client = IntentClient::new(Arc::new(EchoProvider::ok("ok")));
        let handle = sessions.create().unwrap();

        let err = exchange(&sessions, &client, &handle, "   ", None)
            .await
            .unwrap_err();
        assert!(matches!(err, maya_core::Error::Validation(_)));
        assert_eq!(sessions.transcript(&handle).unwrap().len(), 1);

        let err = exchange(&sessions, &client, "missing", "hello", None)
            .await
            .unwrap_err();
        assert!(matches!(err, maya_core::Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_second_submission_rejected_while_awaiting() {
        let sessions = Arc::new(SessionManager::new("hi", 10));
        let provider = Arc::new(GatedProvider::default());
        let client = IntentClient::new(provider.clone());
        let handle = sessions.create().unwrap();

        let first = {
            let sessions = sessions.clone();
            let client = client.clone();
            let handle = handle.clone();
            tokio::spawn(async move {
                exchange(&sessions, &client, &handle, "first", None).await
            })
        };
        provider.entered.notified().await;

        let err = exchange(&sessions, &client, &handle, "second", None)
            .await
            .unwrap_err();
        assert!(matches!(err, maya_core::Error::Session(_)));

        provider.release.notify_one();
        let outcome = first.await.unwrap().unwrap();
        assert_eq!(outcome.reply, "re: first");
        assert_eq!(outcome.transcript.len(), 3);
    }
}
