//! Endless SSE stream of lottery numbers, one draw per second.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::{Event, Sse};
use axum::routing::get;
use axum::Router;
use rand::Rng;

use crate::html;
use crate::metrics::StreamGuard;
use crate::state::AppState;

const NUMBERS_PER_DRAW: usize = 6;
const HIGHEST_NUMBER: u8 = 40;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/lottery-numbers", get(lottery_numbers))
}

/// Six numbers in `1..=40`, repeats allowed.
pub fn draw() -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..NUMBERS_PER_DRAW)
        .map(|_| rng.gen_range(1..=HIGHEST_NUMBER))
        .collect()
}

/// GET /lottery-numbers - never terminates; the client closes it.
pub async fn lottery_numbers() -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let stream = async_stream::stream! {
        let _guard = StreamGuard::open();
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        loop {
            ticker.tick().await;
            let numbers = draw();
            yield Ok(Event::default().data(html::lottery_numbers(&numbers)));
        }
    };

    Sse::new(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use taskpulse_core::TrackerConfig;
    use tower::ServiceExt;

    #[test]
    fn test_draw_shape() {
        for _ in 0..100 {
            let numbers = draw();
            assert_eq!(numbers.len(), 6);
            assert!(numbers.iter().all(|n| (1..=40).contains(n)));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_emits_draws() {
        let state = AppState::in_memory(TrackerConfig::default()).unwrap();
        let response = router()
            .with_state(state)
            .oneshot(Request::builder().uri("/lottery-numbers").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let mut body = response.into_body();
        let frame = body.frame().await.unwrap().unwrap();
        let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
        assert!(text.starts_with("data: <aside>"));
    }
}
