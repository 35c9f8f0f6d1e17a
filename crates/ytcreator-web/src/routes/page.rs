use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    Form,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::ApiError,
    state::AppState,
    ui::{PageView, ResultView},
};

#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub topic: String,
    /// Empty on a browser's first submission
    #[serde(default)]
    pub session_id: String,
}

/// Empty form
pub async fn index() -> Html<String> {
    Html(PageView::default().render())
}

/// Run the pipeline for the submitted topic and re-render the page
///
/// An unknown or malformed session id starts a fresh session. A blank topic
/// re-renders the form without touching the registry.
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<SubmitForm>,
) -> (StatusCode, Html<String>) {
    let parsed_id = Uuid::parse_str(form.session_id.trim()).ok();

    if form.topic.trim().is_empty() {
        let view = PageView {
            session_id: parsed_id,
            topic: form.topic,
            ..PageView::default()
        };
        return (StatusCode::OK, Html(view.render()));
    }

    let session_id = parsed_id.unwrap_or_else(Uuid::new_v4);
    let shared = state
        .sessions
        .get_or_insert_with(session_id, || state.pipeline.new_session_with_id(session_id))
        .await;
    let mut session = shared.lock().await;

    let mut view = PageView::new(session_id, form.topic.as_str());

    match state.pipeline.submit(&mut session, &form.topic).await {
        Ok(Some(result)) => {
            view.result = Some(ResultView {
                result,
                title_history: session.title_history().buffer(),
                script_history: session.script_history().buffer(),
            });
            (StatusCode::OK, Html(view.render()))
        }
        Ok(None) => (StatusCode::OK, Html(view.render())),
        Err(e) => {
            let error = ApiError::from(e);
            let status = error.status_code();
            view.error = Some(error.public_message());
            (status, Html(view.render()))
        }
    }
}
