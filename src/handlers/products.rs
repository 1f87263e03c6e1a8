//! Product catalog endpoints.

use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::{delete_images, upload_images};
use crate::db::product_repo::{self, ProductData};
use crate::error::{AppError, AppResult};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

/// Admin form for creating and updating products. Sent as multipart so the
/// image files ride along with the fields; `specs` arrives as a JSON object
/// of free-form key/value pairs.
#[derive(Debug, MultipartForm)]
pub struct ProductForm {
    pub name: Option<Text<String>>,
    pub brand: Option<Text<String>>,
    pub model: Option<Text<String>>,
    pub price: Option<Text<f64>>,
    pub description: Option<Text<String>>,
    pub category: Option<Text<String>>,
    pub subcategory: Option<Text<String>>,
    pub stock: Option<Text<i32>>,
    pub specs: Option<Text<String>>,
    #[multipart(rename = "images", limit = "5MB")]
    pub images: Vec<TempFile>,
    #[multipart(rename = "removedImages")]
    pub removed_images: Vec<Text<String>>,
}

fn parse_specs(raw: &str) -> AppResult<BTreeMap<String, String>> {
    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str::<BTreeMap<String, String>>(raw)
        .map_err(|_| AppError::Validation("specs must be a JSON object of string values".into()))
}

fn text_value(field: &Option<Text<String>>) -> Option<String> {
    field
        .as_ref()
        .map(|t| t.0.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[get("/products")]
pub async fn get_products(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let products = product_repo::list_products(&state.db).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "products": products,
    })))
}

#[get("/products/{id}")]
pub async fn get_product(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let product = product_repo::find_product(&state.db, path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".into()))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "product": product,
    })))
}

#[post("/products")]
pub async fn create_product(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    MultipartForm(form): MultipartForm<ProductForm>,
) -> AppResult<HttpResponse> {
    user.ensure_admin()?;

    let mut missing = Vec::new();
    let name = text_value(&form.name).unwrap_or_else(|| {
        missing.push("name");
        String::new()
    });
    let brand = text_value(&form.brand).unwrap_or_else(|| {
        missing.push("brand");
        String::new()
    });
    let model = text_value(&form.model).unwrap_or_else(|| {
        missing.push("model");
        String::new()
    });
    let description = text_value(&form.description).unwrap_or_else(|| {
        missing.push("description");
        String::new()
    });
    let category = text_value(&form.category).unwrap_or_else(|| {
        missing.push("category");
        String::new()
    });
    let price = form.price.as_ref().map(|t| t.0).unwrap_or_else(|| {
        missing.push("price");
        0.0
    });
    let stock = form.stock.as_ref().map(|t| t.0).unwrap_or_else(|| {
        missing.push("stock");
        0
    });
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "the following fields are required: {}",
            missing.join(", ")
        )));
    }

    let specs = match &form.specs {
        Some(raw) => parse_specs(&raw.0)?,
        None => BTreeMap::new(),
    };
    let images = upload_images(&state.images, "products", &form.images).await?;

    let data = ProductData {
        name,
        brand,
        model,
        price,
        description,
        category,
        subcategory: text_value(&form.subcategory).unwrap_or_default(),
        specs,
        images,
        stock,
    };

    let product = product_repo::insert_product(&state.db, &data, Some(user.id)).await?;
    tracing::info!(product_id = %product.id, "product created");

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Product created successfully",
        "product": product,
    })))
}

#[put("/products/{id}")]
pub async fn update_product(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    MultipartForm(form): MultipartForm<ProductForm>,
) -> AppResult<HttpResponse> {
    user.ensure_admin()?;
    let id = path.into_inner();

    let existing = product_repo::find_product(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".into()))?;

    // Drop removed images from storage and from the document.
    let removed: Vec<String> = form.removed_images.iter().map(|t| t.0.clone()).collect();
    let mut images = existing.images.0.clone();
    if !removed.is_empty() {
        delete_images(&state.images, removed.iter().cloned()).await;
        images.retain(|img| !removed.contains(&img.key));
    }
    images.extend(upload_images(&state.images, "products", &form.images).await?);

    let specs = match &form.specs {
        Some(raw) => parse_specs(&raw.0)?,
        None => existing.specs.0.clone(),
    };

    let data = ProductData {
        name: text_value(&form.name).unwrap_or(existing.name),
        brand: text_value(&form.brand).unwrap_or(existing.brand),
        model: text_value(&form.model).unwrap_or(existing.model),
        price: form.price.as_ref().map(|t| t.0).unwrap_or(existing.price),
        description: text_value(&form.description).unwrap_or(existing.description),
        category: text_value(&form.category).unwrap_or(existing.category),
        subcategory: text_value(&form.subcategory).unwrap_or(existing.subcategory),
        specs,
        images,
        stock: form.stock.as_ref().map(|t| t.0).unwrap_or(existing.stock),
    };

    let product = product_repo::update_product(&state.db, id, &data)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".into()))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Product updated successfully",
        "product": product,
    })))
}

#[delete("/products/{id}")]
pub async fn delete_product(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    user.ensure_admin()?;
    let id = path.into_inner();

    let product = product_repo::find_product(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".into()))?;

    delete_images(&state.images, product.images.0.iter().map(|i| i.key.clone())).await;
    product_repo::delete_product(&state.db, id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Product deleted successfully",
    })))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[get("/products/search")]
pub async fn search_products(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let q = query
        .query
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("enter a search query".into()))?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * limit;

    let products = product_repo::search_products(&state.db, q, limit, offset).await?;
    if products.is_empty() {
        return Err(AppError::NotFound("no products matched the search".into()));
    }
    let total = product_repo::count_search(&state.db, q).await?;
    let total_pages = (total + limit - 1) / limit;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Search results fetched successfully",
        "products": products,
        "totalProducts": total,
        "totalPages": total_pages,
        "currentPage": page,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specs_parse_into_an_open_map() {
        let specs = parse_specs(r#"{"RAM": "16GB", "Color": "Black"}"#).unwrap();
        assert_eq!(specs.get("RAM").map(String::as_str), Some("16GB"));
        assert_eq!(specs.len(), 2);
    }

    #[test]
    fn empty_specs_are_allowed() {
        assert!(parse_specs("").unwrap().is_empty());
        assert!(parse_specs("   ").unwrap().is_empty());
    }

    #[test]
    fn malformed_specs_are_rejected() {
        assert!(parse_specs("RAM: 16GB").is_err());
        assert!(parse_specs(r#"{"RAM": 16}"#).is_err());
    }
}
