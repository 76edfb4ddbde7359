//! Audio Dispatcher (C8): turns an aggregated response into a playable
//! URL, hash-keyed against the object store so synthesis and storage are
//! idempotent. Never raises — synthesis or storage failure degrades to a
//! null URL, and the orchestrator still has the text to fall back on.

use sha2::{Digest, Sha256};

use sa_domain::ports::{ObjectStore, TTS};
use sa_response::{AggregatedResponse, PhraseCategory};

pub struct AudioDispatcher<'a> {
    tts: &'a dyn TTS,
    store: &'a dyn ObjectStore,
    voice: &'a str,
    language: &'a str,
}

impl<'a> AudioDispatcher<'a> {
    pub fn new(tts: &'a dyn TTS, store: &'a dyn ObjectStore, voice: &'a str, language: &'a str) -> Self {
        Self { tts, store, voice, language }
    }

    /// Resolve an audio URL for `response`, or `None` when there is no
    /// text to speak or synthesis/storage failed.
    pub async fn dispatch(&self, restaurant_id: i64, response: &AggregatedResponse) -> Option<String> {
        match response.phrase_category {
            PhraseCategory::Canned => {
                let phrase_id = response.phrase_id.as_deref()?;
                let key = canned_key(restaurant_id, phrase_id);
                self.fetch_or_synthesize(&key, &response.response_text).await
            }
            PhraseCategory::Dynamic => {
                if response.response_text.trim().is_empty() {
                    return None;
                }
                let key = tts_key(restaurant_id, self.voice, self.language, &response.response_text);
                self.fetch_or_synthesize(&key, &response.response_text).await
            }
        }
    }

    async fn fetch_or_synthesize(&self, key: &str, text: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(Some(url)) => return Some(url),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, key, "audio object store lookup failed"),
        }

        let bytes = match self.tts.synthesize(text, self.voice, self.language).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, key, "tts synthesis failed");
                return None;
            }
        };

        match self.store.put(key, bytes, "audio/mpeg").await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(error = %e, key, "audio object store write failed");
                None
            }
        }
    }
}

fn canned_key(restaurant_id: i64, phrase_id: &str) -> String {
    format!("restaurants/{restaurant_id}/canned/{phrase_id}.mp3")
}

fn tts_key(restaurant_id: i64, voice: &str, language: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(voice.as_bytes());
    hasher.update([0u8]);
    hasher.update(language.as_bytes());
    hasher.update([0u8]);
    hasher.update(text.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("restaurants/{restaurant_id}/tts/{digest}.mp3")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sa_domain::error::{Error, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeStore {
        objects: Mutex<std::collections::HashMap<String, String>>,
        put_calls: AtomicUsize,
    }

    #[async_trait]
    impl ObjectStore for FakeStore {
        async fn put(&self, key: &str, _bytes: Vec<u8>, _content_type: &str) -> Result<String> {
            self.put_calls.fetch_add(1, Ordering::SeqCst);
            let url = format!("https://cdn.example/{key}");
            self.objects.lock().unwrap().insert(key.to_string(), url.clone());
            Ok(url)
        }
        async fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.objects.lock().unwrap().get(key).cloned())
        }
    }

    #[derive(Default)]
    struct FakeTts {
        synth_calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl TTS for FakeTts {
        async fn synthesize(&self, _text: &str, _voice: &str, _language: &str) -> Result<Vec<u8>> {
            self.synth_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(Error::Provider { provider: "tts".into(), message: "synthesis failed".into() })
            } else {
                Ok(vec![1, 2, 3])
            }
        }
    }

    struct PanicTts;

    #[async_trait]
    impl TTS for PanicTts {
        async fn synthesize(&self, _text: &str, _voice: &str, _language: &str) -> Result<Vec<u8>> {
            panic!("a cache hit must never synthesize");
        }
    }

    #[tokio::test]
    async fn canned_hit_returns_existing_url_without_synthesizing() {
        let store = FakeStore::default();
        store.put("restaurants/1/canned/ITEM_ADDED_SUCCESS.mp3", vec![], "audio/mpeg").await.unwrap();
        let tts = PanicTts;
        let dispatcher = AudioDispatcher::new(&tts, &store, "alloy", "en-US");
        let resp = AggregatedResponse::canned("ITEM_ADDED_SUCCESS");
        let url = dispatcher.dispatch(1, &resp).await;
        assert!(url.is_some());
    }

    #[tokio::test]
    async fn canned_miss_synthesizes_and_stores() {
        let store = FakeStore::default();
        let tts = FakeTts::default();
        let dispatcher = AudioDispatcher::new(&tts, &store, "alloy", "en-US");
        let resp = AggregatedResponse::canned("ORDER_CLEARED");
        let url = dispatcher.dispatch(1, &resp).await;
        assert!(url.is_some());
        assert_eq!(tts.synth_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.put_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dynamic_empty_text_returns_none() {
        let store = FakeStore::default();
        let tts = PanicTts;
        let dispatcher = AudioDispatcher::new(&tts, &store, "alloy", "en-US");
        let resp =
            sa_response::AggregatedResponse { response_text: "   ".into(), phrase_category: PhraseCategory::Dynamic, phrase_id: None };
        assert!(dispatcher.dispatch(1, &resp).await.is_none());
    }

    #[tokio::test]
    async fn dynamic_text_is_hash_keyed_and_idempotent_on_repeat() {
        let store = FakeStore::default();
        let tts = FakeTts::default();
        let dispatcher = AudioDispatcher::new(&tts, &store, "alloy", "en-US");
        let resp = sa_response::AggregatedResponse {
            response_text: "Sorry, we don't have galaxy pie.".into(),
            phrase_category: PhraseCategory::Dynamic,
            phrase_id: None,
        };
        let first = dispatcher.dispatch(1, &resp).await;
        let second = dispatcher.dispatch(1, &resp).await;
        assert_eq!(first, second);
        assert_eq!(tts.synth_calls.load(Ordering::SeqCst), 1, "second call should hit the cache");
    }

    #[tokio::test]
    async fn synthesis_failure_returns_none_not_error() {
        let store = FakeStore::default();
        let tts = FakeTts { fail: true, ..Default::default() };
        let dispatcher = AudioDispatcher::new(&tts, &store, "alloy", "en-US");
        let resp = sa_response::AggregatedResponse {
            response_text: "hello".into(),
            phrase_category: PhraseCategory::Dynamic,
            phrase_id: None,
        };
        assert!(dispatcher.dispatch(1, &resp).await.is_none());
    }
}
