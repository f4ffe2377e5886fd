// crates/server/src/html.rs
//! HTML pages and HTMX fragments.
//!
//! Fragments are plain strings so they can be returned from handlers and
//! pushed as SSE event data alike. Interpolated text is either validated
//! (session ids, numbers) or escaped.

use std::time::Duration;

use chrono::{DateTime, Utc};
use taskpulse_core::{SessionId, TaskId};

const HTMX_SRC: &str = "https://unpkg.com/htmx.org@1.9.10";
const HTMX_SSE_SRC: &str = "https://unpkg.com/htmx-ext-sse@2.2.1/sse.js";
const MVP_CSS: &str = "https://unpkg.com/mvp.css";

const SPINNER_STYLE: &str = "@keyframes spin { 0% { transform: rotate(0deg); } 100% { transform: rotate(360deg); } } \
.task-error { color: #b00020; border-left: 4px solid #b00020; padding-left: 8px; }";

/// Escape text for use in element content or a quoted attribute.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<link rel="stylesheet" href="{MVP_CSS}">
<script src="{HTMX_SRC}"></script>
<script src="{HTMX_SSE_SRC}"></script>
<style>{SPINNER_STYLE}</style>
</head>
<body>
<main>
{body}
</main>
</body>
</html>"#,
        title = escape_html(title),
    )
}

/// Home page. `current` is the fragment for the session's existing task, if any.
pub fn index_page(current: Option<String>) -> String {
    let task_area = current.unwrap_or_default();
    let body = format!(
        r##"<h1>Background Task Demo</h1>
<p>Start a background task that runs for a random duration. Progress is pushed over server-sent events, or polled if you prefer. Reloading the page reconnects to a running task.</p>
<p>
<button hx-post="/start-task" hx-target="#task-area" hx-swap="innerHTML" style="padding: 10px 20px; font-size: 16px; cursor: pointer;">Start Task</button>
<button hx-post="/start-task?mode=poll" hx-target="#task-area" hx-swap="innerHTML" style="padding: 10px 20px; font-size: 16px; cursor: pointer;">Start Task (polling)</button>
</p>
<h2 style="margin-top: 40px;">Task</h2>
<div id="task-area">{task_area}</div>
<p><a href="/lottery">Lottery number stream</a></p>"##
    );
    layout("Background Task Demo", &body)
}

/// Page hosting the endless lottery number stream.
pub fn lottery_page() -> String {
    let body = r#"<h1>Server Sent Event Demo</h1>
<p>Lottery number generator</p>
<section hx-ext="sse" sse-connect="/lottery-numbers" sse-swap="message" hx-swap="innerHTML"></section>"#;
    layout("Server Sent Event Demo", body)
}

fn spinner() -> &'static str {
    r#"<span style="font-size: 20px; display: inline-block; animation: spin 2s linear infinite;">&#x23F3;</span>"#
}

/// Running task wired to the progress stream.
///
/// `started` swaps into the inner span; `completed` and `error` replace the
/// whole element, which removes `sse-connect` and closes the EventSource.
pub fn task_streaming(session_id: &SessionId, task_id: TaskId) -> String {
    let sid = session_id.as_str();
    format!(
        r#"<p id="task-{sid}" hx-ext="sse" sse-connect="/task-progress/{sid}" sse-swap="completed,error" hx-swap="outerHTML">{spinner}<span style="margin-left: 10px; color: blue;"> Task #{task_id} - Processing...</span> <small sse-swap="started" hx-swap="innerHTML"></small></p>"#,
        spinner = spinner(),
    )
}

/// Running task refreshed by polling every second.
pub fn task_polling(session_id: &SessionId, task_id: TaskId, elapsed: Duration, duration: Duration) -> String {
    let sid = session_id.as_str();
    format!(
        r#"<p id="task-{sid}" hx-get="/task-progress-poll/{sid}" hx-trigger="every 1s" hx-swap="outerHTML">{spinner}<span style="margin-left: 10px; color: blue;"> Task #{task_id} - Processing... {elapsed}s of {total}s</span></p>"#,
        spinner = spinner(),
        elapsed = elapsed.as_secs(),
        total = duration.as_secs(),
    )
}

/// Content of the `started` event.
pub fn task_started(started_at: DateTime<Utc>, duration: Duration) -> String {
    format!(
        "started at {}, expected {}s",
        started_at.format("%H:%M:%S"),
        duration.as_secs()
    )
}

pub fn task_completed(session_id: &SessionId, task_id: TaskId, elapsed: Duration) -> String {
    format!(
        r#"<p id="task-{sid}"><span style="font-size: 20px;">&#x2705;</span><span style="margin-left: 10px; color: green;"> Task #{task_id} - Completed in {secs:.1}s</span></p>"#,
        sid = session_id.as_str(),
        secs = elapsed.as_secs_f64(),
    )
}

/// Error-styled status fragment. Never an HTTP failure page.
pub fn error_fragment(message: &str) -> String {
    format!(
        r#"<p class="task-error" role="alert">&#x26A0; {}</p>"#,
        escape_html(message)
    )
}

pub fn no_task() -> String {
    error_fragment("No task found for this session. It may have expired or the server restarted; start a new one.")
}

pub fn lottery_numbers(numbers: &[u8]) -> String {
    let joined = numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("<aside>{joined}</aside>")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid() -> SessionId {
        SessionId::parse("abc-123").unwrap()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_index_page_includes_scripts_and_task_area() {
        let page = index_page(Some("<p>current</p>".into()));
        assert!(page.contains(HTMX_SRC));
        assert!(page.contains(HTMX_SSE_SRC));
        assert!(page.contains(r#"<div id="task-area"><p>current</p></div>"#));
        assert!(page.contains(r#"hx-post="/start-task""#));
    }

    #[test]
    fn test_streaming_fragment_connects_to_session_stream() {
        let html = task_streaming(&sid(), 4);
        assert!(html.contains(r#"sse-connect="/task-progress/abc-123""#));
        assert!(html.contains(r#"sse-swap="completed,error""#));
        assert!(html.contains("Task #4"));
    }

    #[test]
    fn test_polling_fragment_reschedules_itself() {
        let html = task_polling(&sid(), 2, Duration::from_secs(1), Duration::from_secs(5));
        assert!(html.contains(r#"hx-get="/task-progress-poll/abc-123""#));
        assert!(html.contains(r#"hx-trigger="every 1s""#));
        assert!(html.contains("1s of 5s"));
    }

    #[test]
    fn test_completed_fragment_has_no_htmx_triggers() {
        let html = task_completed(&sid(), 2, Duration::from_millis(3000));
        assert!(html.contains("Completed in 3.0s"));
        assert!(!html.contains("hx-"));
        assert!(!html.contains("sse-"));
    }

    #[test]
    fn test_error_fragment_escapes_message() {
        let html = error_fragment("<b>bad</b>");
        assert!(html.contains("task-error"));
        assert!(html.contains("&lt;b&gt;bad&lt;/b&gt;"));
    }

    #[test]
    fn test_lottery_numbers() {
        assert_eq!(lottery_numbers(&[1, 22, 40]), "<aside>1, 22, 40</aside>");
    }
}
