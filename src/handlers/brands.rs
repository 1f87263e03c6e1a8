//! Brand registry endpoints.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::db::brand_repo;
use crate::error::{AppError, AppResult};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BrandRequest {
    pub name: Option<String>,
}

#[get("/brands")]
pub async fn get_brands(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let brands = brand_repo::list_brands(&state.db).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "brands": brands,
    })))
}

#[get("/brands/{id}")]
pub async fn get_brand(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let brand = brand_repo::find_brand(&state.db, path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("brand not found".into()))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "brand": brand,
    })))
}

#[post("/brands")]
pub async fn create_brand(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<BrandRequest>,
) -> AppResult<HttpResponse> {
    user.ensure_admin()?;

    let name = body
        .name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("brand name is required".into()))?;

    if brand_repo::name_taken(&state.db, name, None).await? {
        return Err(AppError::Conflict(
            "a brand with this name already exists".into(),
        ));
    }

    let brand = brand_repo::insert_brand(&state.db, name).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Brand created successfully",
        "brand": brand,
    })))
}

#[put("/brands/{id}")]
pub async fn update_brand(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<BrandRequest>,
) -> AppResult<HttpResponse> {
    user.ensure_admin()?;
    let id = path.into_inner();

    let existing = brand_repo::find_brand(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("brand not found".into()))?;

    let brand = match body.name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(name) => {
            if brand_repo::name_taken(&state.db, name, Some(id)).await? {
                return Err(AppError::Conflict(
                    "a brand with this name already exists".into(),
                ));
            }
            brand_repo::update_brand(&state.db, id, name)
                .await?
                .ok_or_else(|| AppError::NotFound("brand not found".into()))?
        }
        None => existing,
    };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Brand updated successfully",
        "brand": brand,
    })))
}

#[delete("/brands/{id}")]
pub async fn delete_brand(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    user.ensure_admin()?;
    let id = path.into_inner();

    if brand_repo::delete_brand(&state.db, id).await? == 0 {
        return Err(AppError::NotFound("brand not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Brand deleted successfully",
    })))
}
