/*
 * Responsibility
 * - ログイン済みユーザーの profile handler
 * - Json を extractor で受け、DTO validation → envelope へ relay
 */
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde_json::json;

use crate::api::context::RequestContext;
use crate::api::v1::dto::profile::UpdateProfileRequest;
use crate::error::{AppError, FieldError};
use crate::state::AppState;

pub async fn get_profile(mut ctx: RequestContext) -> RequestContext {
    let Some(claim) = ctx.claim().cloned() else {
        // The gate attaches a claim on every login route; reaching this
        // without one is a wiring fault, not a client error.
        ctx.fail(AppError::Internal);
        return ctx;
    };

    ctx.payload(json!({
        "id": claim.id,
        "type": claim.claim_type,
        "role": claim.role,
        "full_name": claim.full_name,
        "email": claim.email,
        "phone_no": claim.phone_no,
        "gender": claim.gender,
        "dob": claim.dob,
        "profile_image": claim.profile_image,
        "email_verified": claim.email_verified,
        "phone_verified": claim.phone_verified,
    }));
    ctx
}

pub async fn update_profile(
    mut ctx: RequestContext,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> RequestContext {
    // A malformed or missing body lands in the same envelope as field
    // validation failures.
    let Json(req) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            ctx.fail_fields(vec![FieldError::new("body", rejection.body_text())]);
            return ctx;
        }
    };

    // All field errors are collected and relayed together; one bad field
    // never hides another.
    let errors = req.validate();
    if !errors.is_empty() {
        ctx.fail_fields(errors);
        return ctx;
    }

    // Persisting the profile belongs to the account service; the gateway
    // only frames the response.
    ctx.payload(json!({ "updated": true }));
    ctx
}

pub async fn logout(mut ctx: RequestContext, State(state): State<AppState>, headers: axum::http::HeaderMap) -> RequestContext {
    match state.sessions.delete(&headers).await {
        Ok(()) => ctx.payload(json!({ "logged_out": true })),
        // Bearer-header clients have no session cookie; logout is a no-op.
        Err(crate::services::session::SessionError::NoSession) => {
            ctx.payload(json!({ "logged_out": true }))
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to delete session");
            ctx.fail(AppError::Internal);
        }
    }
    ctx
}
