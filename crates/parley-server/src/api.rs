use std::sync::Arc;

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        DefaultBodyLimit, FromRequest, FromRequestParts, Path, Query, Request, State,
    },
    http::{request::Parts, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use parley_core::conversations::ConversationDraft;
use parley_core::messaging::MessageDraft;
use parley_core::{comments, conversations, groups, messaging, users};
use parley_shared::{
    CommentId, CommentView, ConversationDetail, ConversationId, ConversationView, MessageId,
    MessageView, UserId, UserView,
};
use parley_store::Database;

use crate::auth::{Caller, IdentityResolver};
use crate::config::ServerConfig;
use crate::error::ServerError;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub resolver: Arc<dyn IdentityResolver>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Run a store-bound operation on the blocking thread pool.
    pub async fn run<T, E, F>(&self, f: F) -> Result<T, ServerError>
    where
        F: FnOnce(&Database) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Into<ServerError> + Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| ServerError::Internal(format!("blocking task failed: {e}")))?
            .map_err(Into::into)
    }
}

/// JSON body whose rejections are reported as `400` in the API's error shape.
pub struct Body<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Body<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| ServerError::BadRequest(e.body_text()))?;
        Ok(Body(value))
    }
}

/// Path parameters whose rejections are reported as `400` in the API's error
/// shape.
pub struct Ids<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for Ids<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: PathRejection| ServerError::BadRequest(e.body_text()))?;
        Ok(Ids(value))
    }
}

/// Query string counterpart of [`Ids`].
pub struct Params<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for Params<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| ServerError::BadRequest(e.body_text()))?;
        Ok(Params(value))
    }
}

pub fn build_router(state: AppState) -> Router {
    let origin = match state.config.cors_allow_origin.as_deref() {
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                tracing::warn!(origin, "Invalid CORS_ALLOW_ORIGIN, allowing any origin");
                AllowOrigin::from(Any)
            }
        },
        None => AllowOrigin::from(Any),
    };
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http().make_span_with(|req: &Request| {
        tracing::info_span!(
            "request",
            id = %Uuid::new_v4(),
            method = %req.method(),
            uri = %req.uri(),
        )
    });

    Router::new()
        .route("/liveness", get(liveness))
        .route("/session", post(login))
        .route("/users", get(search_users))
        .route("/users/", get(search_users))
        .route("/users/me", get(my_profile))
        .route("/users/me/name", put(set_my_name))
        .route("/users/me/photo", put(set_my_photo))
        .route(
            "/conversations",
            get(list_conversations).post(create_conversation),
        )
        .route(
            "/conversations/",
            get(list_conversations).post(create_conversation),
        )
        .route(
            "/conversations/:id",
            get(conversation_detail).post(send_message),
        )
        .route("/conversations/:id/read", put(mark_read))
        .route(
            "/conversations/:id/messages/:mid",
            get(get_message)
                .post(forward_message)
                .delete(delete_message),
        )
        .route(
            "/conversations/:id/messages/:mid/comments",
            get(list_comments).post(add_comment),
        )
        .route(
            "/conversations/:id/messages/:mid/comments/:cid",
            axum::routing::delete(delete_comment),
        )
        .route(
            "/conversations/:id/participants",
            post(add_participant).delete(remove_participant),
        )
        .route("/conversations/:id/name", put(rename_group))
        .route("/conversations/:id/photo", put(set_group_photo))
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .layer(cors)
        .layer(trace)
        .with_state(state)
}

// ─── Request / response bodies ───

#[derive(Serialize)]
struct LivenessResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Deserialize)]
struct NameRequest {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PhotoRequest {
    photo_url: String,
}

#[derive(Serialize)]
struct LoginResponse {
    identifier: UserId,
}

#[derive(Deserialize)]
struct SearchQuery {
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateConversationRequest {
    #[serde(rename = "type")]
    kind: String,
    participants: Vec<UserId>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
}

#[derive(Serialize)]
struct CreateConversationResponse {
    conversation_id: ConversationId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageRequest {
    #[serde(rename = "type")]
    kind: String,
    content: String,
    #[serde(default)]
    reply_to: Option<i64>,
}

#[derive(Deserialize)]
struct IdRequest {
    id: i64,
}

#[derive(Deserialize)]
struct CommentRequest {
    content: String,
}

// ─── Operational ───

async fn liveness(State(state): State<AppState>) -> Result<Json<LivenessResponse>, ServerError> {
    state.run(|db| db.ping()).await?;
    Ok(Json(LivenessResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}

// ─── Users ───

async fn login(
    State(state): State<AppState>,
    Body(req): Body<NameRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let identifier = state.run(move |db| users::login(db, &req.name)).await?;
    Ok((StatusCode::CREATED, Json(LoginResponse { identifier })))
}

async fn search_users(
    Caller(me): Caller,
    State(state): State<AppState>,
    Params(query): Params<SearchQuery>,
) -> Result<Json<Vec<UserView>>, ServerError> {
    let found = state
        .run(move |db| users::search(db, me, query.name.as_deref()))
        .await?;
    Ok(Json(found))
}

async fn my_profile(
    Caller(me): Caller,
    State(state): State<AppState>,
) -> Result<Json<UserView>, ServerError> {
    Ok(Json(state.run(move |db| users::profile(db, me)).await?))
}

async fn set_my_name(
    Caller(me): Caller,
    State(state): State<AppState>,
    Body(req): Body<NameRequest>,
) -> Result<StatusCode, ServerError> {
    state.run(move |db| users::rename(db, me, &req.name)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_my_photo(
    Caller(me): Caller,
    State(state): State<AppState>,
    Body(req): Body<PhotoRequest>,
) -> Result<StatusCode, ServerError> {
    state
        .run(move |db| users::set_photo(db, me, &req.photo_url))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Conversations ───

async fn list_conversations(
    Caller(me): Caller,
    State(state): State<AppState>,
) -> Result<Json<Vec<ConversationView>>, ServerError> {
    Ok(Json(state.run(move |db| conversations::list(db, me)).await?))
}

async fn create_conversation(
    Caller(me): Caller,
    State(state): State<AppState>,
    Body(req): Body<CreateConversationRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let draft = ConversationDraft {
        kind: req.kind,
        participants: req.participants,
        name: req.name,
        photo_url: req.photo_url,
    };
    let conversation_id = state
        .run(move |db| conversations::create(db, me, draft))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateConversationResponse { conversation_id }),
    ))
}

async fn conversation_detail(
    Caller(me): Caller,
    State(state): State<AppState>,
    Ids(id): Ids<ConversationId>,
) -> Result<Json<ConversationDetail>, ServerError> {
    Ok(Json(
        state
            .run(move |db| conversations::detail(db, me, id))
            .await?,
    ))
}

// ─── Messages ───

async fn send_message(
    Caller(me): Caller,
    State(state): State<AppState>,
    Ids(id): Ids<ConversationId>,
    Body(req): Body<SendMessageRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let draft = MessageDraft {
        kind: req.kind,
        content: req.content,
        reply_to: MessageId::non_zero(req.reply_to),
    };
    let sent = state
        .run(move |db| messaging::send(db, id, me, draft))
        .await?;
    Ok((StatusCode::CREATED, Json(sent)))
}

async fn mark_read(
    Caller(me): Caller,
    State(state): State<AppState>,
    Ids(id): Ids<ConversationId>,
) -> Result<StatusCode, ServerError> {
    state.run(move |db| messaging::mark_read(db, id, me)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_message(
    Caller(me): Caller,
    State(state): State<AppState>,
    Ids((id, mid)): Ids<(ConversationId, MessageId)>,
) -> Result<Json<MessageView>, ServerError> {
    Ok(Json(
        state
            .run(move |db| messaging::get(db, id, mid, me))
            .await?,
    ))
}

async fn delete_message(
    Caller(me): Caller,
    State(state): State<AppState>,
    Ids((id, mid)): Ids<(ConversationId, MessageId)>,
) -> Result<StatusCode, ServerError> {
    state
        .run(move |db| messaging::delete(db, id, mid, me))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn forward_message(
    Caller(me): Caller,
    State(state): State<AppState>,
    Ids((id, mid)): Ids<(ConversationId, MessageId)>,
    Body(req): Body<IdRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let target = ConversationId(req.id);
    let forwarded = state
        .run(move |db| messaging::forward(db, id, mid, target, me))
        .await?;
    Ok((StatusCode::CREATED, Json(forwarded)))
}

// ─── Groups ───

async fn add_participant(
    Caller(me): Caller,
    State(state): State<AppState>,
    Ids(id): Ids<ConversationId>,
    Body(req): Body<IdRequest>,
) -> Result<StatusCode, ServerError> {
    let target = UserId(req.id);
    state
        .run(move |db| groups::add_participant(db, id, me, target))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_participant(
    Caller(me): Caller,
    State(state): State<AppState>,
    Ids(id): Ids<ConversationId>,
    Body(req): Body<IdRequest>,
) -> Result<StatusCode, ServerError> {
    let target = UserId(req.id);
    state
        .run(move |db| groups::remove_participant(db, id, me, target))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn rename_group(
    Caller(me): Caller,
    State(state): State<AppState>,
    Ids(id): Ids<ConversationId>,
    Body(req): Body<NameRequest>,
) -> Result<StatusCode, ServerError> {
    state
        .run(move |db| groups::rename(db, id, me, &req.name))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_group_photo(
    Caller(me): Caller,
    State(state): State<AppState>,
    Ids(id): Ids<ConversationId>,
    Body(req): Body<PhotoRequest>,
) -> Result<StatusCode, ServerError> {
    state
        .run(move |db| groups::set_photo(db, id, me, &req.photo_url))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Comments ───

async fn add_comment(
    Caller(me): Caller,
    State(state): State<AppState>,
    Ids((id, mid)): Ids<(ConversationId, MessageId)>,
    Body(req): Body<CommentRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let comment = state
        .run(move |db| comments::add(db, id, mid, me, &req.content))
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn list_comments(
    Caller(me): Caller,
    State(state): State<AppState>,
    Ids((id, mid)): Ids<(ConversationId, MessageId)>,
) -> Result<Json<Vec<CommentView>>, ServerError> {
    Ok(Json(
        state
            .run(move |db| comments::list(db, id, mid, me))
            .await?,
    ))
}

async fn delete_comment(
    Caller(me): Caller,
    State(state): State<AppState>,
    Ids((id, mid, cid)): Ids<(ConversationId, MessageId, CommentId)>,
) -> Result<StatusCode, ServerError> {
    state
        .run(move |db| comments::delete(db, id, mid, cid, me))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
