//! Generic CRUD over the project-tracking collections.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::{persist, AppState, ListQuery};
use crate::domain::{
    FixedExpense, FuturesTrade, ProjectCost, ProjectName, RecordId, SpotTrade, Status, Task,
};
use crate::error::AppError;
use crate::query::{filter_and_sort, Queryable, SortConfig};
use crate::store::{Collection, Document, Ledger};

/// Route segment -> collection. Accepts the canonical names plus the short
/// forms used by the UI.
pub fn parse_collection(segment: &str) -> Result<Collection, AppError> {
    if let Ok(collection) = segment.parse::<Collection>() {
        return Ok(collection);
    }
    match segment {
        "costs" => Ok(Collection::ProjectCosts),
        "expenses" => Ok(Collection::FixedExpenses),
        "projects" => Ok(Collection::ProjectNames),
        other => Err(AppError::NotFound(format!("unknown collection {}", other))),
    }
}

fn default_sort(collection: Collection) -> SortConfig {
    match collection {
        Collection::FuturesTrades => SortConfig::desc("entryDate"),
        Collection::SpotTrades => SortConfig::desc("tradeDate"),
        Collection::Tasks => SortConfig::asc("dueDate"),
        Collection::ProjectCosts => SortConfig::asc("projectName"),
        Collection::FixedExpenses
        | Collection::Statuses
        | Collection::ProjectNames => SortConfig::asc("name"),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.to_string()))
}

fn list_json<T: Document + Queryable>(
    ledger: &Ledger,
    search: &str,
    sort: &SortConfig,
) -> Result<Value, AppError> {
    let all = ledger.all::<T>();
    let records = filter_and_sort(all, search, sort);
    Ok(serde_json::json!({
        "collection": T::COLLECTION.as_str(),
        "records": to_json(&records)?,
        "total": all.len(),
    }))
}

/// Parse a request body into `T`, assigning a fresh id when the body has
/// none. A path id, when given, overrides the body.
fn parse_body<T: Document>(mut body: Value, id: Option<&RecordId>) -> Result<T, AppError> {
    let object = body
        .as_object_mut()
        .ok_or_else(|| AppError::BadRequest("body must be a JSON object".to_string()))?;
    match id {
        Some(id) => {
            object.insert("id".to_string(), Value::String(id.to_string()));
        }
        None => {
            let missing = object.get("id").map(|v| v.is_null()).unwrap_or(true);
            if missing {
                object.insert("id".to_string(), Value::String(RecordId::generate().to_string()));
            }
        }
    }
    serde_json::from_value(body).map_err(|e| AppError::BadRequest(e.to_string()))
}

async fn create<T: Document>(state: &AppState, body: Value) -> Result<Value, AppError> {
    let doc: T = parse_body(body, None)?;
    let id = doc.id().clone();

    let mut ledger = state.ledger.write().await;
    ledger.insert(doc.clone())?;
    persist(&state.repo, &mut ledger, &doc, |l| {
        let _ = l.remove::<T>(&id);
    })
    .await?;

    info!(collection = %T::COLLECTION, id = %doc.id(), "record created");
    to_json(&doc)
}

async fn replace<T: Document>(state: &AppState, id: RecordId, body: Value) -> Result<Value, AppError> {
    let doc: T = parse_body(body, Some(&id))?;

    let mut ledger = state.ledger.write().await;
    let previous = ledger
        .get::<T>(&id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("{} record {}", T::COLLECTION, id)))?;
    ledger.replace(doc.clone())?;
    persist(&state.repo, &mut ledger, &doc, |l| {
        if let Some(slot) = T::slot_mut(l).iter_mut().find(|d| d.id() == previous.id()) {
            *slot = previous;
        }
    })
    .await?;

    to_json(&doc)
}

async fn delete<T: Document>(state: &AppState, id: RecordId) -> Result<(), AppError> {
    let mut ledger = state.ledger.write().await;
    if ledger.get::<T>(&id).is_none() {
        return Err(AppError::NotFound(format!("{} record {}", T::COLLECTION, id)));
    }
    state.repo.delete_document::<T>(&id).await?;
    ledger.remove::<T>(&id)?;
    info!(collection = %T::COLLECTION, %id, "record deleted");
    Ok(())
}

pub async fn list_records(
    Path(segment): Path<String>,
    Query(params): Query<ListQuery>,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let collection = parse_collection(&segment)?;
    let sort = params.sort_config(default_sort(collection))?;
    let search = params.search_term();
    let ledger = state.ledger.read().await;

    let body = match collection {
        Collection::FuturesTrades => list_json::<FuturesTrade>(&ledger, search, &sort),
        Collection::SpotTrades => list_json::<SpotTrade>(&ledger, search, &sort),
        Collection::Tasks => list_json::<Task>(&ledger, search, &sort),
        Collection::ProjectCosts => list_json::<ProjectCost>(&ledger, search, &sort),
        Collection::FixedExpenses => list_json::<FixedExpense>(&ledger, search, &sort),
        Collection::Statuses => list_json::<Status>(&ledger, search, &sort),
        Collection::ProjectNames => list_json::<ProjectName>(&ledger, search, &sort),
    }?;
    Ok(Json(body))
}

/// Futures and spot trades have dedicated endpoints with their own
/// lifecycle rules; this route only writes project records.
fn trade_collection(collection: Collection) -> AppError {
    AppError::BadRequest(format!(
        "{} are written through their own endpoints",
        collection
    ))
}

pub async fn create_record(
    Path(segment): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let collection = parse_collection(&segment)?;
    let created = match collection {
        Collection::Tasks => create::<Task>(&state, body).await,
        Collection::ProjectCosts => create::<ProjectCost>(&state, body).await,
        Collection::FixedExpenses => create::<FixedExpense>(&state, body).await,
        Collection::Statuses => create::<Status>(&state, body).await,
        Collection::ProjectNames => create::<ProjectName>(&state, body).await,
        Collection::FuturesTrades | Collection::SpotTrades => Err(trade_collection(collection)),
    }?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn replace_record(
    Path((segment, id)): Path<(String, String)>,
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let id = RecordId::new(id);
    let collection = parse_collection(&segment)?;
    let replaced = match collection {
        Collection::Tasks => replace::<Task>(&state, id, body).await,
        Collection::ProjectCosts => replace::<ProjectCost>(&state, id, body).await,
        Collection::FixedExpenses => replace::<FixedExpense>(&state, id, body).await,
        Collection::Statuses => replace::<Status>(&state, id, body).await,
        Collection::ProjectNames => replace::<ProjectName>(&state, id, body).await,
        Collection::FuturesTrades | Collection::SpotTrades => Err(trade_collection(collection)),
    }?;
    Ok(Json(replaced))
}

pub async fn delete_record(
    Path((segment, id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let id = RecordId::new(id);
    let collection = parse_collection(&segment)?;
    match collection {
        Collection::Tasks => delete::<Task>(&state, id).await,
        Collection::ProjectCosts => delete::<ProjectCost>(&state, id).await,
        Collection::FixedExpenses => delete::<FixedExpense>(&state, id).await,
        Collection::Statuses => delete::<Status>(&state, id).await,
        Collection::ProjectNames => delete::<ProjectName>(&state, id).await,
        Collection::FuturesTrades | Collection::SpotTrades => Err(trade_collection(collection)),
    }?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_collection_aliases() {
        assert_eq!(parse_collection("tasks").unwrap(), Collection::Tasks);
        assert_eq!(parse_collection("costs").unwrap(), Collection::ProjectCosts);
        assert_eq!(parse_collection("fixed-expenses").unwrap(), Collection::FixedExpenses);
        assert_eq!(parse_collection("projects").unwrap(), Collection::ProjectNames);
        assert!(matches!(parse_collection("widgets"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_parse_body_assigns_and_overrides_ids() {
        let generated: Status = parse_body(json!({"name": "Todo"}), None).unwrap();
        assert!(!generated.id.as_str().is_empty());

        let kept: Status = parse_body(json!({"id": 4, "name": "Todo"}), None).unwrap();
        assert_eq!(kept.id.as_str(), "4");

        let forced: Status =
            parse_body(json!({"id": "x", "name": "Todo"}), Some(&RecordId::new("y"))).unwrap();
        assert_eq!(forced.id.as_str(), "y");
    }

    #[test]
    fn test_parse_body_rejects_non_objects() {
        assert!(matches!(parse_body::<Task>(json!([1]), None), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_body::<Task>(json!({"id": "t"}), None), Err(AppError::BadRequest(_))));
    }
}
