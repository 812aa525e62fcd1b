/*
 * Responsibility
 * - 公開 HTML ページの配信 (html kind のデモ handler)
 * - コンテンツ本体は content サービスの領分; ここでは薄く返すだけ
 */
use axum::extract::Path;

use crate::api::context::RequestContext;

pub async fn render_page(mut ctx: RequestContext, Path(slug): Path<String>) -> RequestContext {
    // Real page content comes from the content service; the gateway only owns
    // the framing. Escape the slug so the echo cannot inject markup.
    let title = slug
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect::<String>();

    ctx.html(format!(
        "<!doctype html><html><head><title>{title}</title></head>\
         <body><h1>{title}</h1></body></html>"
    ));
    ctx
}
