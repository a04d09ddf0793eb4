//! Status page.
//!
//! Renders the reconciler configuration server-side; live status and the
//! scale form talk to the JSON endpoints from the browser.

use askama::Template;
use axum::extract::State;
use axum::response::Html;

use crate::ApiState;

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    resource: String,
    cooldown_secs: u64,
    step: u32,
    poll_interval_secs: u64,
    poll_timeout_secs: u64,
    dry_run: bool,
}

fn render<T: Template>(tmpl: T) -> Html<String> {
    Html(tmpl.render().unwrap_or_else(|e| {
        format!("<pre>Template error: {e}</pre>")
    }))
}

/// GET /
pub async fn index(State(state): State<ApiState>) -> Html<String> {
    let config = state.reconciler.config();
    render(IndexTemplate {
        resource: config.target_resource().to_string(),
        cooldown_secs: config.cooldown().as_secs(),
        step: config.step(),
        poll_interval_secs: config.poll_interval().as_secs(),
        poll_timeout_secs: config.poll_timeout().as_secs(),
        dry_run: config.dry_run(),
    })
}
