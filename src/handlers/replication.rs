use axum::{extract::State, Json};

use crate::{
    models::{ConnectionCredential, ReplicationStatus},
    replication::ReplicationChecker,
    AppState,
};

// The check's verdict is always returned in the body with 200; a failed
// check is a successful diagnosis, not a failed request.

pub async fn check_connection(
    State(state): State<AppState>,
    Json(credential): Json<ConnectionCredential>,
) -> Json<ReplicationStatus> {
    let checker = ReplicationChecker::new(credential, state.config.replication_timeout);
    Json(checker.check_connection().await)
}

pub async fn check_binlog(
    State(state): State<AppState>,
    Json(credential): Json<ConnectionCredential>,
) -> Json<ReplicationStatus> {
    let checker = ReplicationChecker::new(credential, state.config.replication_timeout);
    Json(checker.check_binlog_status().await)
}
