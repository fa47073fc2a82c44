//! Chat access and group management request handlers.

use axum::Json;
use axum::extract::{Extension, State};
use parley_core::chats::{self, ChatError};
use tracing::{error, warn};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::caller::Caller;
use crate::models::{
    AccessChatRequest, ChatResponse, CreateGroupRequest, MemberList, MembershipRequest,
    RenameGroupRequest,
};

/// Log unexpected failures before they become 500s.
fn failed(operation: &'static str) -> impl FnOnce(ChatError) -> AppError {
    move |err| {
        if let ChatError::DbError(e) = &err {
            error!(operation, error = %e, "chat operation failed");
        }
        AppError::from(err)
    }
}

fn required<T>(value: Option<T>, message: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::Validation(message.to_string()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn non_blank_members(value: Option<MemberList>) -> Option<MemberList> {
    value.filter(|m| !m.is_blank())
}

/// `POST /api/chat`: fetch the direct chat with `userId`, creating it if needed.
pub async fn access_chat_handler(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
    AppJson(body): AppJson<AccessChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    let Some(user_id) = body.user_id else {
        warn!(caller = %caller, "userId not sent with request");
        return Err(AppError::Validation("User ID is required".into()));
    };

    let chat = chats::access_direct_chat(&state.pool, &caller, &user_id)
        .await
        .map_err(failed("access_chat"))?;
    Ok(Json(chat.into()))
}

/// `GET /api/chat`: every chat the caller belongs to, newest activity first.
pub async fn fetch_chats_handler(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
) -> AppResult<Json<Vec<ChatResponse>>> {
    let chats = chats::list_chats(&state.pool, &caller)
        .await
        .map_err(failed("fetch_chats"))?;
    Ok(Json(chats.into_iter().map(ChatResponse::from).collect()))
}

/// `POST /api/chat/group`: create a group administered by the caller.
pub async fn create_group_chat_handler(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
    AppJson(body): AppJson<CreateGroupRequest>,
) -> AppResult<Json<ChatResponse>> {
    const MISSING: &str = "Please enter all the fields";
    let users = required(non_blank_members(body.users), MISSING)?;
    let name = required(non_blank(body.name), MISSING)?;
    let members = users.into_ids()?;

    let chat = chats::create_group_chat(&state.pool, &caller, &name, &members)
        .await
        .map_err(failed("create_group_chat"))?;
    Ok(Json(chat.into()))
}

/// `PUT /api/chat/rename`: rename a chat.
pub async fn rename_group_handler(
    State(state): State<AppState>,
    Extension(_caller): Extension<Caller>,
    AppJson(body): AppJson<RenameGroupRequest>,
) -> AppResult<Json<ChatResponse>> {
    let chat_id = required(body.chat_id, "Chat ID is required")?;
    let chat_name = required(non_blank(body.chat_name), "Chat name is required")?;

    let chat = chats::rename_chat(&state.pool, &chat_id, chat_name.trim())
        .await
        .map_err(failed("rename_group"))?;
    Ok(Json(chat.into()))
}

/// `PUT /api/chat/groupadd`: add a user to a chat.
pub async fn add_to_group_handler(
    State(state): State<AppState>,
    Extension(_caller): Extension<Caller>,
    AppJson(body): AppJson<MembershipRequest>,
) -> AppResult<Json<ChatResponse>> {
    let (chat_id, user_id) = membership_target(body)?;

    let chat = chats::add_member(&state.pool, &chat_id, &user_id)
        .await
        .map_err(failed("add_to_group"))?;
    Ok(Json(chat.into()))
}

/// `PUT /api/chat/groupremove`: remove a user from a chat.
pub async fn remove_from_group_handler(
    State(state): State<AppState>,
    Extension(_caller): Extension<Caller>,
    AppJson(body): AppJson<MembershipRequest>,
) -> AppResult<Json<ChatResponse>> {
    let (chat_id, user_id) = membership_target(body)?;

    let chat = chats::remove_member(&state.pool, &chat_id, &user_id)
        .await
        .map_err(failed("remove_from_group"))?;
    Ok(Json(chat.into()))
}

fn membership_target(body: MembershipRequest) -> AppResult<(uuid::Uuid, uuid::Uuid)> {
    Ok((
        required(body.chat_id, "Chat ID is required")?,
        required(body.user_id, "User ID is required")?,
    ))
}
