// Shared test doubles: a deterministic recognizer and its factory.
//
// Each non-empty chunk contributes one word, "w<first sample>", to the open
// utterance. A non-empty chunk of pure silence (all zero samples) completes
// the utterance. Empty chunks add nothing.

#![allow(dead_code)]

use speech_stream::{DecoderError, Recognizer, RecognizerFactory};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn pcm(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

pub fn silence(samples: usize) -> Vec<u8> {
    vec![0u8; samples * 2]
}

#[derive(Default, Clone)]
pub struct Counters {
    pub created: Arc<AtomicUsize>,
    pub live: Arc<AtomicUsize>,
}

impl Counters {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

pub struct ScriptedRecognizer {
    words: Vec<String>,
    completed: Option<String>,
    chunks_seen: usize,
    fail_on_chunk: Option<usize>,
    panic_on_chunk: Option<usize>,
    live: Arc<AtomicUsize>,
}

impl Recognizer for ScriptedRecognizer {
    fn accept_chunk(&mut self, chunk: &[u8]) -> Result<bool, DecoderError> {
        self.chunks_seen += 1;

        if self.panic_on_chunk == Some(self.chunks_seen) {
            panic!("scripted recognizer panic");
        }
        if self.fail_on_chunk == Some(self.chunks_seen) {
            return Err(DecoderError::new("scripted failure"));
        }

        if chunk.is_empty() {
            return Ok(false);
        }

        if chunk.iter().all(|&b| b == 0) {
            self.completed = Some(self.words.join(" "));
            self.words.clear();
            return Ok(true);
        }

        let first = i16::from_le_bytes([chunk[0], chunk[1]]);
        self.words.push(format!("w{}", first));
        Ok(false)
    }

    fn consume_final(&mut self) -> Result<String, DecoderError> {
        Ok(self.completed.take().unwrap_or_default())
    }

    fn peek_partial(&mut self) -> Result<String, DecoderError> {
        Ok(self.words.join(" "))
    }
}

impl Drop for ScriptedRecognizer {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Default, Clone)]
pub struct ScriptedFactory {
    pub counters: Counters,
    pub fail_on_chunk: Option<usize>,
    pub panic_on_chunk: Option<usize>,
    pub refuse_create: bool,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on_chunk(n: usize) -> Self {
        Self {
            fail_on_chunk: Some(n),
            ..Self::default()
        }
    }

    pub fn panicking_on_chunk(n: usize) -> Self {
        Self {
            panic_on_chunk: Some(n),
            ..Self::default()
        }
    }

    pub fn refusing() -> Self {
        Self {
            refuse_create: true,
            ..Self::default()
        }
    }
}

impl RecognizerFactory for ScriptedFactory {
    fn create(&self, _sample_rate: u32) -> Result<Box<dyn Recognizer>, DecoderError> {
        if self.refuse_create {
            return Err(DecoderError::new("scripted refusal"));
        }

        self.counters.created.fetch_add(1, Ordering::SeqCst);
        self.counters.live.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(ScriptedRecognizer {
            words: Vec::new(),
            completed: None,
            chunks_seen: 0,
            fail_on_chunk: self.fail_on_chunk,
            panic_on_chunk: self.panic_on_chunk,
            live: Arc::clone(&self.counters.live),
        }))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Raw PCM payload of a recording, as little-endian bytes.
pub fn recorded_payload(path: &std::path::Path) -> Vec<u8> {
    let audio = speech_stream::AudioFile::open(path).expect("recording should be readable");
    audio.pcm_bytes()
}
