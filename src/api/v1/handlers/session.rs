use axum::extract::State;

use crate::api::context::RequestContext;
use crate::state::AppState;

/// Send anonymous clients into the external login flow (307).
pub async fn login_redirect(mut ctx: RequestContext, State(state): State<AppState>) -> RequestContext {
    ctx.redirect(state.external_login_url.clone());
    ctx
}
