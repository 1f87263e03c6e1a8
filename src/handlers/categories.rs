//! Category endpoints, including embedded subcategories and the optional
//! category image.

use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::{delete_images, upload_image};
use crate::db::category_repo;
use crate::error::{AppError, AppResult};
use crate::middleware::AuthenticatedUser;
use crate::models::CategoryWithSubcategories;
use crate::state::AppState;

#[derive(Debug, MultipartForm)]
pub struct CategoryForm {
    pub name: Option<Text<String>>,
    #[multipart(rename = "image", limit = "5MB")]
    pub image: Option<TempFile>,
}

#[derive(Debug, Deserialize)]
pub struct SubcategoryRequest {
    pub name: String,
}

fn trimmed_name(field: &Option<Text<String>>) -> Option<String> {
    field
        .as_ref()
        .map(|t| t.0.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[get("/categories")]
pub async fn get_categories(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories = category_repo::list_with_subcategories(&state.db).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "categories": categories,
    })))
}

#[get("/categories/{id}")]
pub async fn get_category(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let category = category_repo::find_with_subcategories(&state.db, path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("category not found".into()))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "category": category,
    })))
}

#[post("/categories")]
pub async fn create_category(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    MultipartForm(form): MultipartForm<CategoryForm>,
) -> AppResult<HttpResponse> {
    user.ensure_admin()?;

    let name = trimmed_name(&form.name)
        .ok_or_else(|| AppError::Validation("category name is required".into()))?;

    if category_repo::name_taken(&state.db, &name, None).await? {
        return Err(AppError::Conflict(
            "a category with this name already exists".into(),
        ));
    }

    let image = match &form.image {
        Some(file) => Some(upload_image(&state.images, "categories", file).await?),
        None => None,
    };

    let category = category_repo::insert_category(&state.db, &name, image).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Category created successfully",
        "category": CategoryWithSubcategories {
            category,
            subcategories: Vec::new(),
        },
    })))
}

#[put("/categories/{id}")]
pub async fn update_category(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    MultipartForm(form): MultipartForm<CategoryForm>,
) -> AppResult<HttpResponse> {
    user.ensure_admin()?;
    let id = path.into_inner();

    let existing = category_repo::find_with_subcategories(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("category not found".into()))?;

    let name = match trimmed_name(&form.name) {
        Some(name) => {
            if category_repo::name_taken(&state.db, &name, Some(id)).await? {
                return Err(AppError::Conflict(
                    "a category with this name already exists".into(),
                ));
            }
            name
        }
        None => existing.category.name.clone(),
    };

    let image = match &form.image {
        Some(file) => {
            // Replace: the previous image is removed from storage first.
            if let Some(old) = &existing.category.image {
                delete_images(&state.images, [old.0.key.clone()]).await;
            }
            Some(upload_image(&state.images, "categories", file).await?)
        }
        None => existing.category.image.clone().map(|img| img.0),
    };

    category_repo::update_category(&state.db, id, &name, image)
        .await?
        .ok_or_else(|| AppError::NotFound("category not found".into()))?;

    let category = category_repo::find_with_subcategories(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("category not found".into()))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Category updated successfully",
        "category": category,
    })))
}

#[delete("/categories/{id}")]
pub async fn delete_category(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    user.ensure_admin()?;
    let id = path.into_inner();

    let category = category_repo::find_with_subcategories(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("category not found".into()))?;

    if let Some(image) = &category.category.image {
        delete_images(&state.images, [image.0.key.clone()]).await;
    }
    category_repo::delete_category(&state.db, id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Category deleted successfully",
    })))
}

#[post("/categories/{id}/subcategories")]
pub async fn add_subcategory(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<SubcategoryRequest>,
) -> AppResult<HttpResponse> {
    user.ensure_admin()?;
    let category_id = path.into_inner();

    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("subcategory name is required".into()));
    }

    if category_repo::find_with_subcategories(&state.db, category_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("category not found".into()));
    }

    if category_repo::subcategory_name_taken(&state.db, category_id, name).await? {
        return Err(AppError::Conflict(
            "a subcategory with this name already exists".into(),
        ));
    }

    category_repo::insert_subcategory(&state.db, category_id, name).await?;

    let category = category_repo::find_with_subcategories(&state.db, category_id)
        .await?
        .ok_or_else(|| AppError::NotFound("category not found".into()))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Subcategory added successfully",
        "category": category,
    })))
}

#[delete("/categories/{category_id}/subcategories/{subcategory_id}")]
pub async fn delete_subcategory(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    user.ensure_admin()?;
    let (category_id, subcategory_id) = path.into_inner();

    if category_repo::find_with_subcategories(&state.db, category_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("category not found".into()));
    }

    category_repo::delete_subcategory(&state.db, category_id, subcategory_id).await?;

    let category = category_repo::find_with_subcategories(&state.db, category_id)
        .await?
        .ok_or_else(|| AppError::NotFound("category not found".into()))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Subcategory deleted successfully",
        "category": category,
    })))
}
