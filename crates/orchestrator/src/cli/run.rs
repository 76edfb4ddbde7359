//! `drivethru run` — send a single turn and print the response.

use crate::state::AppState;
use crate::turn;

pub async fn run(state: &AppState, session_id: &str, restaurant_id: i64, message: &str, json: bool) -> anyhow::Result<()> {
    let out = turn::process_turn(state, session_id, restaurant_id, message).await;

    if json {
        let body = serde_json::json!({
            "success": out.success,
            "response_text": out.response_text,
            "audio_url": out.audio_url,
            "intent": out.intent,
            "target_state": out.target_state,
            "order_snapshot": out.order_snapshot,
            "error": out.error.as_ref().map(|e| serde_json::json!({
                "category": e.category,
                "code": e.code,
                "message": e.message,
            })),
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!("{}", out.response_text);
        if let Some(url) = &out.audio_url {
            eprintln!("(audio: {url})");
        }
        if let Some(err) = &out.error {
            eprintln!("\x1B[31merror [{}]: {}\x1B[0m", err.category, err.message);
        }
    }

    Ok(())
}
