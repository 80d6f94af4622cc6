//! Member directory API consumer
//!
//! Thin typed wrapper over the authorized client; every call here flows
//! through the session crate's interceptors and therefore carries the
//! current access token and participates in refresh-on-expiry.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use common::AuthResult;
use session::ApiClient;
use session::models::ApiMessage;

/// Member record as rendered by this client. The server owns the schema;
/// unknown fields are ignored and most fields are optional here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub birth_year: Option<i32>,
    #[serde(default)]
    pub birth_month: Option<u32>,
    #[serde(default)]
    pub birth_day: Option<u32>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zipcode: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub spouse: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// One page of the member listing
#[derive(Debug, Deserialize)]
pub struct MemberPage {
    pub members: Vec<Member>,
    pub total: u64,
    pub pages: u32,
    pub current_page: u32,
}

/// Payload for registering a new member; the server assigns the
/// registration date
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    pub name: String,
    pub birth_year: i32,
    pub birth_month: u32,
    pub birth_day: u32,
    pub phone: String,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub district: Option<String>,
    pub spouse: Option<String>,
    pub position: Option<String>,
}

/// Optional filters for the member listing
#[derive(Debug, Default)]
pub struct MemberFilter {
    pub gender: Option<String>,
    pub district: Option<String>,
    pub position: Option<String>,
}

/// Typed access to the member directory endpoints
pub struct DirectoryApi {
    client: Arc<ApiClient>,
}

impl DirectoryApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Fetch one page of members with optional filters
    pub async fn list_members(
        &self,
        page: u32,
        per_page: u32,
        filter: &MemberFilter,
    ) -> AuthResult<MemberPage> {
        let page = page.to_string();
        let per_page = per_page.to_string();
        let mut query: Vec<(&str, &str)> = vec![("page", &page), ("per_page", &per_page)];

        if let Some(gender) = &filter.gender {
            query.push(("gender", gender));
        }
        if let Some(district) = &filter.district {
            query.push(("district", district));
        }
        if let Some(position) = &filter.position {
            query.push(("position", position));
        }

        self.client.get_json_query("/api/members", &query).await
    }

    /// Search members by name substring
    pub async fn search_members(&self, name: &str) -> AuthResult<Vec<Member>> {
        self.client
            .get_json_query("/api/members/search", &[("name", name)])
            .await
    }

    /// Fetch a single member
    pub async fn get_member(&self, id: i64) -> AuthResult<Member> {
        self.client.get_json(&format!("/api/members/{id}")).await
    }

    /// Register a new member; returns the server's confirmation message
    pub async fn register_member(&self, member: &NewMember) -> AuthResult<String> {
        let body: ApiMessage = self.client.post_json("/api/members", member).await?;
        Ok(body.message)
    }

    /// Remove a member
    pub async fn remove_member(&self, id: i64) -> AuthResult<()> {
        self.client.delete(&format!("/api/members/{id}")).await
    }
}
