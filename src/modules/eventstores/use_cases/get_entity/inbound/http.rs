use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    response::Response,
};
use serde::Deserialize;

use crate::shared::core::entity::Version;
use crate::shared::infrastructure::event_store::{EventStoreError, SharedEventStore};
use crate::shared::infrastructure::http::respond_with_error;
use crate::shell::state::AppState;

const ERROR_CODE: &str = "ERR_INVOKE_GET_ENTITY";

#[derive(Debug, Default, Deserialize)]
pub struct GetEntityParams {
    pub version: Option<String>,
    pub startversion: Option<String>,
    pub endversion: Option<String>,
}

/// What a GET asks for, once the query string is validated.
#[derive(Debug, PartialEq, Eq)]
pub enum EntityQuery {
    Latest,
    Version(Version),
    Range { start: Version, end: Version },
}

fn parse_version(field: &str, raw: &str) -> Result<Version, String> {
    raw.trim()
        .parse()
        .map_err(|err| format!("can't convert {field} to number: {err}"))
}

impl TryFrom<GetEntityParams> for EntityQuery {
    type Error = String;

    fn try_from(params: GetEntityParams) -> Result<Self, Self::Error> {
        match (params.version, params.startversion, params.endversion) {
            (None, None, None) => Ok(Self::Latest),
            (Some(version), None, None) => Ok(Self::Version(parse_version("version", &version)?)),
            (None, Some(start), Some(end)) => {
                let start = parse_version("startversion", &start)?;
                let end = parse_version("endversion", &end)?;
                if start > end {
                    return Err(format!(
                        "startversion {start} is greater than endversion {end}"
                    ));
                }
                Ok(Self::Range { start, end })
            }
            (Some(_), _, _) => Err("version can't be combined with a version range".to_string()),
            _ => Err("startversion and endversion must be given together".to_string()),
        }
    }
}

async fn load(
    store: &SharedEventStore,
    id: &str,
    query: EntityQuery,
) -> Result<Response, EventStoreError> {
    let version = match query {
        EntityQuery::Range { start, end } => {
            let entities = store.get_by_version_range(id, start, end).await?;
            return Ok(Json(entities).into_response());
        }
        EntityQuery::Version(version) => version,
        EntityQuery::Latest => store.get_latest_version_number(id).await?,
    };
    let entity = store.get_by_version(id, version).await?;
    let etag = format!("\"{}\"", entity.version);
    Ok(([(header::ETAG, etag)], Json(entity)).into_response())
}

pub async fn handle(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
    Query(params): Query<GetEntityParams>,
) -> Response {
    let Some(store) = state.store(&name) else {
        return respond_with_error(
            StatusCode::NOT_FOUND,
            ERROR_CODE,
            format!("eventstore {name} not found"),
        );
    };

    let query = match EntityQuery::try_from(params) {
        Ok(query) => query,
        Err(message) => return respond_with_error(StatusCode::BAD_REQUEST, ERROR_CODE, message),
    };

    match load(&store, &id, query).await {
        Ok(response) => response,
        Err(err) if err.is_not_found() => respond_with_error(
            StatusCode::NOT_FOUND,
            ERROR_CODE,
            format!("can't load entity: {err}"),
        ),
        Err(err) => respond_with_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            ERROR_CODE,
            format!("can't load entity: {err}"),
        ),
    }
}
