//! Specification-attribute registry endpoints.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::db::spec_repo;
use crate::error::{AppError, AppResult};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SpecRequest {
    pub name: Option<String>,
}

#[get("/specs")]
pub async fn get_specs(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let specs = spec_repo::list_specs(&state.db).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "specs": specs,
    })))
}

#[get("/specs/{id}")]
pub async fn get_spec(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let spec = spec_repo::find_spec(&state.db, path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("spec attribute not found".into()))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "spec": spec,
    })))
}

#[post("/specs")]
pub async fn create_spec(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<SpecRequest>,
) -> AppResult<HttpResponse> {
    user.ensure_admin()?;

    let name = body
        .name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("spec attribute name is required".into()))?;

    if spec_repo::name_taken(&state.db, name, None).await? {
        return Err(AppError::Conflict(
            "a spec attribute with this name already exists".into(),
        ));
    }

    let spec = spec_repo::insert_spec(&state.db, name).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Spec attribute created successfully",
        "spec": spec,
    })))
}

#[put("/specs/{id}")]
pub async fn update_spec(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<SpecRequest>,
) -> AppResult<HttpResponse> {
    user.ensure_admin()?;
    let id = path.into_inner();

    let existing = spec_repo::find_spec(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("spec attribute not found".into()))?;

    let spec = match body.name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(name) => {
            if spec_repo::name_taken(&state.db, name, Some(id)).await? {
                return Err(AppError::Conflict(
                    "a spec attribute with this name already exists".into(),
                ));
            }
            spec_repo::update_spec(&state.db, id, name)
                .await?
                .ok_or_else(|| AppError::NotFound("spec attribute not found".into()))?
        }
        None => existing,
    };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Spec attribute updated successfully",
        "spec": spec,
    })))
}

#[delete("/specs/{id}")]
pub async fn delete_spec(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    user.ensure_admin()?;
    let id = path.into_inner();

    if spec_repo::delete_spec(&state.db, id).await? == 0 {
        return Err(AppError::NotFound("spec attribute not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Spec attribute deleted successfully",
    })))
}
