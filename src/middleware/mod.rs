/*
 * Responsibility
 * - middleware の公開インターフェース (re-export)
 * - 適用順は app.rs 側で決める (session_cookie は access より外側)
 */
pub mod access;
pub mod cors;
pub mod http;
pub mod session_cookie;
