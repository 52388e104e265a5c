use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::client::CatClient;
use crate::errors::CatResult;
use crate::http::Scope;
use crate::models::memory::{
    Collection, CollectionsDestroyOutput, CollectionsOutput, ConversationHistoryDeleteOutput,
    ConversationHistoryOutput, MemoryPoint, MemoryPointDeleteOutput, MemoryPointOutput,
    MemoryPointsDeleteByMetadataOutput, MemoryPointsOutput, MemoryRecallOutput, Role,
};
use crate::models::message::Why;

const PREFIX: &str = "/memory";

/// Vector memory and conversation history of an agent.
///
/// Every call takes an optional `agent_id`; `None` targets the configured
/// default agent.
pub struct MemoryEndpoint<'a> {
    client: &'a CatClient,
}

#[derive(Serialize)]
struct RecallQuery<'q> {
    text: &'q str,
    #[serde(skip_serializing_if = "Option::is_none")]
    k: Option<u32>,
}

#[derive(Serialize)]
struct PointsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<String>,
}

impl<'a> MemoryEndpoint<'a> {
    pub(crate) fn new(client: &'a CatClient) -> Self {
        Self { client }
    }

    fn url(path: &str) -> String {
        format!("{}{}", PREFIX, path)
    }

    fn points_url(collection: Collection) -> String {
        Self::url(&format!("/collections/{}/points", collection))
    }

    pub async fn get_memory_collections(
        &self,
        agent_id: Option<&str>,
    ) -> CatResult<CollectionsOutput> {
        self.client
            .http()
            .get(&Self::url("/collections"), Scope::agent(agent_id))
            .await
    }

    /// Wipe the points of every collection
    pub async fn delete_all_memory_collection_points(
        &self,
        agent_id: Option<&str>,
    ) -> CatResult<CollectionsDestroyOutput> {
        self.client
            .http()
            .delete(&Self::url("/collections"), Scope::agent(agent_id))
            .await
    }

    pub async fn delete_all_single_memory_collection_points(
        &self,
        collection: Collection,
        agent_id: Option<&str>,
    ) -> CatResult<CollectionsDestroyOutput> {
        self.client
            .http()
            .delete(
                &Self::url(&format!("/collections/{}", collection)),
                Scope::agent(agent_id),
            )
            .await
    }

    pub async fn get_conversation_history(
        &self,
        agent_id: Option<&str>,
        user_id: Option<&str>,
    ) -> CatResult<ConversationHistoryOutput> {
        self.client
            .http()
            .get(
                &Self::url("/conversation_history"),
                Scope::agent(agent_id).with_user(user_id),
            )
            .await
    }

    pub async fn delete_conversation_history(
        &self,
        agent_id: Option<&str>,
        user_id: Option<&str>,
    ) -> CatResult<ConversationHistoryDeleteOutput> {
        self.client
            .http()
            .delete(
                &Self::url("/conversation_history"),
                Scope::agent(agent_id).with_user(user_id),
            )
            .await
    }

    /// Append an entry to the conversation history; returns the updated history
    #[allow(clippy::too_many_arguments)]
    pub async fn post_conversation_history(
        &self,
        who: Role,
        text: &str,
        images: &[String],
        audio: &[String],
        why: Option<&Why>,
        agent_id: Option<&str>,
        user_id: Option<&str>,
    ) -> CatResult<ConversationHistoryOutput> {
        let mut payload = json!({
            "who": who,
            "text": text,
        });
        if !images.is_empty() {
            payload["images"] = json!(images);
        }
        if !audio.is_empty() {
            payload["audio"] = json!(audio);
        }
        if let Some(why) = why {
            payload["why"] = json!(why);
        }

        self.client
            .http()
            .post_json(
                &Self::url("/conversation_history"),
                &payload,
                Scope::agent(agent_id).with_user(user_id),
            )
            .await
    }

    /// Recall the `k` memories closest to `text`
    pub async fn get_memory_recall(
        &self,
        text: &str,
        k: Option<u32>,
        agent_id: Option<&str>,
        user_id: Option<&str>,
    ) -> CatResult<MemoryRecallOutput> {
        self.client
            .http()
            .get_with_query(
                &Self::url("/recall"),
                &RecallQuery { text, k },
                Scope::agent(agent_id).with_user(user_id),
            )
            .await
    }

    /// Like [`get_memory_recall`](Self::get_memory_recall), with a metadata filter
    pub async fn post_memory_recall(
        &self,
        text: &str,
        k: Option<u32>,
        metadata: Option<&Map<String, Value>>,
        agent_id: Option<&str>,
        user_id: Option<&str>,
    ) -> CatResult<MemoryRecallOutput> {
        let mut payload = json!({ "text": text });
        if let Some(k) = k {
            payload["k"] = json!(k);
        }
        if let Some(metadata) = metadata {
            payload["metadata"] = json!(metadata);
        }

        self.client
            .http()
            .post_json(
                &Self::url("/recall"),
                &payload,
                Scope::agent(agent_id).with_user(user_id),
            )
            .await
    }

    /// Store a point. With a `user_id` and no `source` in the metadata, the
    /// user is recorded as the source.
    pub async fn post_memory_point(
        &self,
        collection: Collection,
        point: MemoryPoint,
        agent_id: Option<&str>,
        user_id: Option<&str>,
    ) -> CatResult<MemoryPointOutput> {
        let point = point.with_default_source(user_id);
        self.client
            .http()
            .post_json(&Self::points_url(collection), &point, Scope::agent(agent_id))
            .await
    }

    pub async fn put_memory_point(
        &self,
        collection: Collection,
        point: MemoryPoint,
        point_id: &str,
        agent_id: Option<&str>,
        user_id: Option<&str>,
    ) -> CatResult<MemoryPointOutput> {
        let point = point.with_default_source(user_id);
        self.client
            .http()
            .put_json(
                &format!("{}/{}", Self::points_url(collection), point_id),
                &point,
                Scope::agent(agent_id),
            )
            .await
    }

    pub async fn delete_memory_point(
        &self,
        collection: Collection,
        point_id: &str,
        agent_id: Option<&str>,
    ) -> CatResult<MemoryPointDeleteOutput> {
        self.client
            .http()
            .delete(
                &format!("{}/{}", Self::points_url(collection), point_id),
                Scope::agent(agent_id),
            )
            .await
    }

    /// Delete every point whose metadata matches all of `metadata`
    pub async fn delete_memory_points_by_metadata(
        &self,
        collection: Collection,
        metadata: &Map<String, Value>,
        agent_id: Option<&str>,
    ) -> CatResult<MemoryPointsDeleteByMetadataOutput> {
        self.client
            .http()
            .delete_json(&Self::points_url(collection), metadata, Scope::agent(agent_id))
            .await
    }

    /// Page through a collection. `offset` is the `next_offset` of the previous page.
    pub async fn get_memory_points(
        &self,
        collection: Collection,
        limit: Option<u32>,
        offset: Option<&str>,
        agent_id: Option<&str>,
    ) -> CatResult<MemoryPointsOutput> {
        let query = PointsQuery {
            limit,
            offset: offset.map(str::to_string),
        };
        self.client
            .http()
            .get_with_query(&Self::points_url(collection), &query, Scope::agent(agent_id))
            .await
    }
}
