/*
 * Responsibility
 * - 認証済み主体 (Claim) の型定義
 * - token の wire JSON 形と 1:1 対応する (serde derive)
 *
 * Notes
 * - `claim_type` は発行時に一度だけ決まり、token の寿命の間は不変
 * - `claim_type` と `role` は独立した軸 (認可は主に `claim_type` を見る)
 */
use serde::{Deserialize, Serialize};

/// Identity kind carried by a token. Fixed at issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimType {
    Customer,
    Influencer,
    Brand,
    Keeper,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Superadmin,
}

/// The authenticated identity attached to a request.
///
/// The token *is* the state: the gateway never persists claims, it only
/// reconstructs them from the bearer token on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keeper_user_id: Option<String>,

    #[serde(rename = "type")]
    pub claim_type: ClaimType,
    pub role: Role,

    pub full_name: String,
    pub email: String,
    pub phone_no: String,
    pub gender: String,
    pub dob: String,
    pub profile_image: String,

    pub email_verified: bool,
    pub phone_verified: bool,

    // Standard token metadata (unix seconds). `exp` is stamped by the codec.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
}

impl Claim {
    pub fn is_keeper(&self) -> bool {
        self.claim_type == ClaimType::Keeper
    }

    pub fn is_internal(&self) -> bool {
        self.claim_type == ClaimType::Internal
    }
}
