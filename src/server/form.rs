use super::{pages, AppState, FormError};
use crate::format::FormView;
use crate::normalize::RawInput;
use crate::pipeline;
use axum::{extract::State, response::Html, Form};
use std::collections::HashMap;

pub(super) async fn index(State(state): State<AppState>) -> Result<Html<String>, FormError> {
    let artifact = state.model.artifact()?;
    Ok(Html(pages::index(artifact.schema())))
}

pub(super) async fn predict(
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Html<String>, FormError> {
    let raw = RawInput::from_form(fields);
    let p = pipeline::predict(&state.model, &raw)?;
    let view = FormView::new(&p, state.model.artifact()?.schema());
    Ok(Html(pages::result(&view)))
}
