//! Placeholder `TTS` used until a real voice provider is configured. It
//! never fails and never calls out to the network — it deterministically
//! "synthesizes" a minimal WAV header plus silence sized to the text, long
//! enough that a real player won't choke on the file, short enough that the
//! demo's object store doesn't fill up.

use async_trait::async_trait;

use sa_domain::error::Result;
use sa_domain::ports::TTS;

const SAMPLE_RATE: u32 = 8_000;
const MS_PER_CHAR: u32 = 60;

pub struct SilentTts;

#[async_trait]
impl TTS for SilentTts {
    async fn synthesize(&self, text: &str, _voice: &str, _language: &str) -> Result<Vec<u8>> {
        let duration_ms = (text.chars().count() as u32 * MS_PER_CHAR).clamp(200, 5_000);
        let sample_count = (SAMPLE_RATE * duration_ms / 1_000) as usize;
        Ok(wav_header(sample_count as u32).into_iter().chain(std::iter::repeat(0u8).take(sample_count)).collect())
    }
}

fn wav_header(sample_count: u32) -> Vec<u8> {
    let data_len = sample_count;
    let mut header = Vec::with_capacity(44);
    header.extend_from_slice(b"RIFF");
    header.extend_from_slice(&(36 + data_len).to_le_bytes());
    header.extend_from_slice(b"WAVE");
    header.extend_from_slice(b"fmt ");
    header.extend_from_slice(&16u32.to_le_bytes());
    header.extend_from_slice(&1u16.to_le_bytes()); // PCM
    header.extend_from_slice(&1u16.to_le_bytes()); // mono
    header.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    header.extend_from_slice(&SAMPLE_RATE.to_le_bytes()); // byte rate, 8-bit mono
    header.extend_from_slice(&1u16.to_le_bytes()); // block align
    header.extend_from_slice(&8u16.to_le_bytes()); // bits per sample
    header.extend_from_slice(b"data");
    header.extend_from_slice(&data_len.to_le_bytes());
    header
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn synthesize_never_fails_and_scales_with_text_length() {
        let tts = SilentTts;
        let short = tts.synthesize("hi", "alloy", "en-US").await.unwrap();
        let long = tts.synthesize(&"a".repeat(200), "alloy", "en-US").await.unwrap();
        assert!(short.starts_with(b"RIFF"));
        assert!(long.len() > short.len());
    }
}
