//! Blog endpoints.

use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use super::{delete_images, upload_images};
use crate::db::blog_repo::{self, BlogData};
use crate::error::{AppError, AppResult};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

#[derive(Debug, MultipartForm)]
pub struct BlogForm {
    pub title: Option<Text<String>>,
    #[multipart(rename = "shortContent")]
    pub short_content: Option<Text<String>>,
    pub content: Option<Text<String>>,
    pub date: Option<Text<String>>,
    #[multipart(rename = "images", limit = "5MB")]
    pub images: Vec<TempFile>,
    #[multipart(rename = "removedImages")]
    pub removed_images: Vec<Text<String>>,
}

fn text_value(field: &Option<Text<String>>) -> Option<String> {
    field
        .as_ref()
        .map(|t| t.0.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation("date must be in YYYY-MM-DD format".into()))
}

#[get("/blogs")]
pub async fn get_blogs(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let blogs = blog_repo::list_blogs(&state.db).await?;
    Ok(HttpResponse::Ok().json(json!({ "blogs": blogs })))
}

#[get("/blogs/{id}")]
pub async fn get_blog(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let blog = blog_repo::find_blog(&state.db, path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("blog not found".into()))?;

    Ok(HttpResponse::Ok().json(json!({ "blog": blog })))
}

#[post("/blogs")]
pub async fn create_blog(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    MultipartForm(form): MultipartForm<BlogForm>,
) -> AppResult<HttpResponse> {
    user.ensure_admin()?;

    let mut missing = Vec::new();
    let title = text_value(&form.title).unwrap_or_else(|| {
        missing.push("title");
        String::new()
    });
    let short_content = text_value(&form.short_content).unwrap_or_else(|| {
        missing.push("shortContent");
        String::new()
    });
    let content = text_value(&form.content).unwrap_or_else(|| {
        missing.push("content");
        String::new()
    });
    let raw_date = text_value(&form.date).unwrap_or_else(|| {
        missing.push("date");
        String::new()
    });
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "the following fields are required: {}",
            missing.join(", ")
        )));
    }

    let date = parse_date(&raw_date)?;
    let images = upload_images(&state.images, "blogs", &form.images).await?;

    let blog = blog_repo::insert_blog(
        &state.db,
        &BlogData {
            title,
            short_content,
            content,
            date,
            images,
        },
    )
    .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "blog": blog,
    })))
}

#[put("/blogs/{id}")]
pub async fn update_blog(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    MultipartForm(form): MultipartForm<BlogForm>,
) -> AppResult<HttpResponse> {
    user.ensure_admin()?;
    let id = path.into_inner();

    let existing = blog_repo::find_blog(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("blog not found".into()))?;

    let removed: Vec<String> = form.removed_images.iter().map(|t| t.0.clone()).collect();
    let mut images = existing.images.0.clone();
    if !removed.is_empty() {
        delete_images(&state.images, removed.iter().cloned()).await;
        images.retain(|img| !removed.contains(&img.key));
    }
    images.extend(upload_images(&state.images, "blogs", &form.images).await?);

    let date = match text_value(&form.date) {
        Some(raw) => parse_date(&raw)?,
        None => existing.date,
    };

    let data = BlogData {
        title: text_value(&form.title).unwrap_or(existing.title),
        short_content: text_value(&form.short_content).unwrap_or(existing.short_content),
        content: text_value(&form.content).unwrap_or(existing.content),
        date,
        images,
    };

    let blog = blog_repo::update_blog(&state.db, id, &data)
        .await?
        .ok_or_else(|| AppError::NotFound("blog not found".into()))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Blog updated successfully",
        "blog": blog,
    })))
}

#[delete("/blogs/{id}")]
pub async fn delete_blog(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    user.ensure_admin()?;
    let id = path.into_inner();

    let blog = blog_repo::find_blog(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("blog not found".into()))?;

    delete_images(&state.images, blog.images.0.iter().map(|i| i.key.clone())).await;
    blog_repo::delete_blog(&state.db, id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Blog deleted successfully",
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_parse_in_iso_format_only() {
        assert_eq!(
            parse_date("2024-05-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
        assert!(parse_date("01/05/2024").is_err());
        assert!(parse_date("yesterday").is_err());
    }
}
