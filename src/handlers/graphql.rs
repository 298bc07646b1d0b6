use async_graphql::{ServerError, Variables};
use axum::{
    body::Bytes,
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::app::AppState;
use crate::auth::RequestContext;
use crate::error::ApiError;
use crate::graphql::errors::{error_code, FORBIDDEN, UNAVAILABLE};

/// JSON body of a GraphQL POST
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLBody {
    pub query: String,
    #[serde(default)]
    pub variables: Option<serde_json::Value>,
    #[serde(default)]
    pub operation_name: Option<String>,
}

/// POST <path> - execute a GraphQL document for an authenticated caller
pub async fn graphql_post(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let body: GraphQLBody = serde_json::from_slice(&body).map_err(|e| ApiError::invalid_json(e.to_string()))?;

    let mut request = async_graphql::Request::new(body.query).data(context);
    if let Some(variables) = body.variables {
        request = request.variables(Variables::from_json(variables));
    }
    if let Some(operation_name) = body.operation_name {
        request = request.operation_name(operation_name);
    }

    let response = state.schema.execute(request).await;

    if response.is_err() {
        let status = error_status(&response.errors);
        let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
        warn!(status = status.as_u16(), "GraphQL operation failed: {:?}", messages);
        return Ok((status, Json(response)).into_response());
    }

    debug!("GraphQL operation succeeded");
    Ok(Json(response).into_response())
}

/// Any field error fails the whole request; authorization and availability
/// failures get their own status
fn error_status(errors: &[ServerError]) -> StatusCode {
    let codes: Vec<&str> = errors.iter().filter_map(error_code).collect();
    if codes.contains(&FORBIDDEN) {
        StatusCode::FORBIDDEN
    } else if codes.contains(&UNAVAILABLE) {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
