use serde_json::json;

use crate::api::context::RequestContext;

/// Service-to-service cache refresh trigger (internal claims only).
pub async fn refresh_cache(mut ctx: RequestContext) -> RequestContext {
    let caller = ctx.claim().map(|c| c.id.clone()).unwrap_or_default();
    tracing::info!(caller = %caller, "internal cache refresh requested");

    ctx.payload(json!({ "scheduled": true }));
    ctx
}
