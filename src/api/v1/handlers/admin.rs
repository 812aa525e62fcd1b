use serde_json::json;

use crate::api::context::RequestContext;

/// Keeper-only dashboard summary. The gate has already enforced the keeper
/// type and the delegated authorization check before this runs.
pub async fn admin_overview(mut ctx: RequestContext) -> RequestContext {
    let keeper_user_id = ctx
        .claim()
        .and_then(|c| c.keeper_user_id.clone());

    ctx.payload(json!({
        "keeper_user_id": keeper_user_id,
        "sections": ["orders", "catalog", "discounts"],
    }));
    ctx
}
