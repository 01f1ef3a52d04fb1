//! Product management screens.
//!
//! The form serves both create and update: navigation with `?id=` prefills
//! from the cached listing, and submission branches on the presence of the
//! id. Update ids are validated against the `PROD<digits>` format before any
//! network call leaves the process.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use lumora_core::ProductId;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use crate::backend::types::ProductInput;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::home::FilterQuery;
use crate::routes::views::{Nav, ProductView};
use crate::services::filter::{ALL_CATEGORIES, filter_products};
use crate::state::AppState;

// =============================================================================
// Forms & queries
// =============================================================================

/// Product form submission.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    /// Present (non-empty) for updates, absent for creates.
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub price: String,
    pub currency: String,
    /// The selected category *id*; resolved to the name before submission.
    pub category_id: String,
    pub description: String,
    /// Hosted image URL from the out-of-band upload.
    #[serde(default)]
    pub image: String,
}

/// Delete form data.
#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    pub id: String,
}

/// Query parameters of the product form page.
#[derive(Debug, Deserialize)]
pub struct ProductFormQuery {
    pub id: Option<String>,
    pub error: Option<String>,
}

/// Query parameters for list feedback plus the filter fields.
#[derive(Debug, Deserialize)]
pub struct ListMessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
    pub category: Option<String>,
    pub name: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

impl ListMessageQuery {
    fn filter_query(&self) -> FilterQuery {
        FilterQuery {
            category: self.category.clone(),
            name: self.name.clone(),
            min_price: self.min_price.clone(),
            max_price: self.max_price.clone(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Category option for the form's select box.
#[derive(Clone)]
pub struct CategoryOption {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

/// Manage-products list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products.html")]
pub struct ManageProductsTemplate {
    pub nav: Option<Nav>,
    pub products: Vec<ProductView>,
    pub category_options: Vec<String>,
    pub selected_category: String,
    pub name_filter: String,
    pub min_price: String,
    pub max_price: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Product form template (create and update).
#[derive(Template, WebTemplate)]
#[template(path = "admin/product_form.html")]
pub struct ProductFormTemplate {
    pub nav: Option<Nav>,
    pub id: String,
    pub name: String,
    pub price: String,
    pub currency: String,
    pub description: String,
    pub image: String,
    pub categories: Vec<CategoryOption>,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Product list with the same filter engine the storefront uses.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Query(query): Query<ListMessageQuery>,
) -> Result<ManageProductsTemplate> {
    let products = state.backend().products_all().await?;
    let categories = state.backend().categories_all().await?;

    let filter = query.filter_query().to_filter();
    let filtered = filter_products(&products, &filter);

    let mut category_options = vec![ALL_CATEGORIES.to_string()];
    category_options.extend(categories.iter().map(|c| c.name.clone()));

    Ok(ManageProductsTemplate {
        nav: Some(Nav::from(&user)),
        products: filtered.iter().map(ProductView::from).collect(),
        category_options,
        selected_category: filter.category,
        name_filter: filter.name,
        min_price: query.min_price.unwrap_or_default(),
        max_price: query.max_price.unwrap_or_default(),
        error: query.error.map(form_error_message),
        success: query.success.map(|code| match code.as_str() {
            "saved" => "Product saved.".to_string(),
            "deleted" => "Product deleted successfully!".to_string(),
            other => other.to_string(),
        }),
    })
}

fn form_error_message(code: String) -> String {
    match code.as_str() {
        "missing_fields" => "Please fill in all required fields.".to_string(),
        "invalid_price" => "Price must be a non-negative number.".to_string(),
        "invalid_id" => "Invalid product ID format.".to_string(),
        "image_required" => "Please upload a product image first.".to_string(),
        "unknown_category" => "The selected category no longer exists.".to_string(),
        "save_failed" => "Saving the product failed. Please try again.".to_string(),
        "delete_failed" => "Failed to delete product. Please try again.".to_string(),
        other => other.to_string(),
    }
}

/// Display the product form, prefilled when editing.
#[instrument(skip(state, user))]
pub async fn form(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Query(query): Query<ProductFormQuery>,
) -> Result<ProductFormTemplate> {
    let categories = state.backend().categories_all().await?;

    let existing = match &query.id {
        Some(id) => state
            .backend()
            .products_all()
            .await?
            .into_iter()
            .find(|p| p.id == *id),
        None => None,
    };

    let (id, name, price, currency, description, image, category_name) = match existing {
        Some(p) => (
            p.id,
            p.name,
            p.price.to_string(),
            p.currency,
            p.description,
            p.image,
            p.category,
        ),
        None => (
            String::new(),
            String::new(),
            String::new(),
            "LKR".to_string(),
            String::new(),
            String::new(),
            String::new(),
        ),
    };

    let categories = categories
        .iter()
        .map(|c| CategoryOption {
            id: c.id.clone(),
            name: c.name.clone(),
            selected: c.name == category_name,
        })
        .collect();

    Ok(ProductFormTemplate {
        nav: Some(Nav::from(&user)),
        id,
        name,
        price,
        currency,
        description,
        image,
        categories,
        error: query.error.map(form_error_message),
    })
}

/// Create or update a product.
#[instrument(skip(state, user, form), fields(id = %form.id, name = %form.name))]
pub async fn submit(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let back = |code: &str| {
        let target = if form.id.is_empty() {
            format!("/add-product?error={code}")
        } else {
            format!("/add-product?id={}&error={code}", form.id)
        };
        Redirect::to(&target).into_response()
    };

    if form.name.is_empty() || form.currency.is_empty() || form.category_id.is_empty() {
        return Ok(back("missing_fields"));
    }

    let Ok(price) = form.price.trim().parse::<Decimal>() else {
        return Ok(back("invalid_price"));
    };
    if price.is_sign_negative() {
        return Ok(back("invalid_price"));
    }

    // The image must already be hosted; submitting without it fails fast.
    if form.image.is_empty() {
        return Ok(back("image_required"));
    }

    // Resolve the selected category id to its name - the backend product
    // schema stores the category by name. A selection that no longer matches
    // any loaded category aborts the submission.
    let categories = state.backend().categories_all().await?;
    let Some(category) = categories.iter().find(|c| c.id == form.category_id) else {
        return Ok(back("unknown_category"));
    };

    let input = ProductInput {
        id: if form.id.is_empty() {
            None
        } else {
            Some(form.id.clone())
        },
        name: form.name.clone(),
        price,
        currency: form.currency.clone(),
        category: category.name.clone(),
        description: form.description.clone(),
        image: form.image.clone(),
    };

    let result = if form.id.is_empty() {
        state.backend().product_save(&user.access_token, &input).await
    } else {
        // Update ids must match PROD<digits> - rejected before any call.
        let Ok(product_id) = ProductId::parse(&form.id) else {
            return Ok(back("invalid_id"));
        };
        state
            .backend()
            .product_update(&user.access_token, &product_id, &input)
            .await
    };

    match result {
        Ok(()) => Ok(Redirect::to("/manage-products?success=saved").into_response()),
        Err(e) => {
            tracing::error!("Saving product failed: {e}");
            Ok(back("save_failed"))
        }
    }
}

/// Delete a product and update the cached listing by the argument id.
#[instrument(skip(state, user, form), fields(id = %form.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Form(form): Form<DeleteForm>,
) -> Response {
    match state
        .backend()
        .product_delete(&user.access_token, &form.id)
        .await
    {
        Ok(()) => Redirect::to("/manage-products?success=deleted").into_response(),
        Err(e) => {
            tracing::error!("Deleting product failed: {e}");
            Redirect::to("/manage-products?error=delete_failed").into_response()
        }
    }
}
