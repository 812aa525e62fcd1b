use serde_json::json;

use crate::api::context::RequestContext;

pub async fn health(mut ctx: RequestContext) -> RequestContext {
    ctx.payload(json!({ "status": "ok" }));
    ctx
}
