//! Category management screens.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::backend::types::CategoryInput;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::views::Nav;
use crate::state::AppState;

// =============================================================================
// Forms & queries
// =============================================================================

/// Category form submission.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub image: String,
}

/// Delete form data.
#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    pub id: String,
}

/// Query parameters of the category form page.
#[derive(Debug, Deserialize)]
pub struct CategoryFormQuery {
    pub id: Option<String>,
    pub error: Option<String>,
}

/// Query parameters for list feedback.
#[derive(Debug, Deserialize)]
pub struct ListMessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Category display data.
#[derive(Clone)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: String,
}

/// Manage-categories list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/categories.html")]
pub struct ManageCategoriesTemplate {
    pub nav: Option<Nav>,
    pub categories: Vec<CategoryView>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Category form template (create and update).
#[derive(Template, WebTemplate)]
#[template(path = "admin/category_form.html")]
pub struct CategoryFormTemplate {
    pub nav: Option<Nav>,
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub error: Option<String>,
}

fn form_error_message(code: String) -> String {
    match code.as_str() {
        "missing_fields" => "Please fill in all required fields.".to_string(),
        "image_required" => "Please upload a category image first.".to_string(),
        "save_failed" => "Saving the category failed. Please try again.".to_string(),
        "delete_failed" => "Failed to delete category. Please try again.".to_string(),
        other => other.to_string(),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Category listing.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Query(query): Query<ListMessageQuery>,
) -> Result<ManageCategoriesTemplate> {
    let categories = state.backend().categories_all().await?;

    Ok(ManageCategoriesTemplate {
        nav: Some(Nav::from(&user)),
        categories: categories
            .iter()
            .map(|c| CategoryView {
                id: c.id.clone(),
                name: c.name.clone(),
                description: c.description.clone(),
                image: c.image.clone(),
            })
            .collect(),
        error: query.error.map(form_error_message),
        success: query.success.map(|code| match code.as_str() {
            "saved" => "Category saved.".to_string(),
            "deleted" => "Category deleted successfully!".to_string(),
            other => other.to_string(),
        }),
    })
}

/// Display the category form, prefilled when editing.
#[instrument(skip(state, user))]
pub async fn form(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Query(query): Query<CategoryFormQuery>,
) -> Result<CategoryFormTemplate> {
    let existing = match &query.id {
        Some(id) => state
            .backend()
            .categories_all()
            .await?
            .into_iter()
            .find(|c| c.id == *id),
        None => None,
    };

    let (id, name, description, image) = match existing {
        Some(c) => (c.id, c.name, c.description, c.image),
        None => (String::new(), String::new(), String::new(), String::new()),
    };

    Ok(CategoryFormTemplate {
        nav: Some(Nav::from(&user)),
        id,
        name,
        description,
        image,
        error: query.error.map(form_error_message),
    })
}

/// Create or update a category.
#[instrument(skip(state, user, form), fields(id = %form.id, name = %form.name))]
pub async fn submit(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    let back = |code: &str| {
        let target = if form.id.is_empty() {
            format!("/add-category?error={code}")
        } else {
            format!("/add-category?id={}&error={code}", form.id)
        };
        Redirect::to(&target).into_response()
    };

    if form.name.is_empty() {
        return Ok(back("missing_fields"));
    }
    if form.image.is_empty() {
        return Ok(back("image_required"));
    }

    let input = CategoryInput {
        id: if form.id.is_empty() {
            None
        } else {
            Some(form.id.clone())
        },
        name: form.name.clone(),
        description: form.description.clone(),
        image: form.image.clone(),
    };

    let result = if form.id.is_empty() {
        state
            .backend()
            .category_save(&user.access_token, &input)
            .await
    } else {
        state
            .backend()
            .category_update(&user.access_token, &form.id, &input)
            .await
    };

    match result {
        Ok(()) => Ok(Redirect::to("/manage-category?success=saved").into_response()),
        Err(e) => {
            tracing::error!("Saving category failed: {e}");
            Ok(back("save_failed"))
        }
    }
}

/// Delete a category; the cached entry is removed by the argument id.
#[instrument(skip(state, user, form), fields(id = %form.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Form(form): Form<DeleteForm>,
) -> Response {
    match state
        .backend()
        .category_delete(&user.access_token, &form.id)
        .await
    {
        Ok(()) => Redirect::to("/manage-category?success=deleted").into_response(),
        Err(e) => {
            tracing::error!("Deleting category failed: {e}");
            Redirect::to("/manage-category?error=delete_failed").into_response()
        }
    }
}
