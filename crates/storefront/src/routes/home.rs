//! Storefront browsing pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::services::filter::{ALL_CATEGORIES, ProductFilter, filter_products};
use crate::state::AppState;

use super::views::{Nav, ProductView};

/// Filter parameters from the browse/manage screens.
///
/// Price bounds arrive as free text; anything unparsable is treated as an
/// absent bound rather than a request error.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub category: Option<String>,
    pub name: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

impl FilterQuery {
    /// Convert the raw query into a filter specification.
    #[must_use]
    pub fn to_filter(&self) -> ProductFilter {
        ProductFilter {
            category: self
                .category
                .clone()
                .unwrap_or_else(|| ALL_CATEGORIES.to_string()),
            name: self.name.clone().unwrap_or_default(),
            min_price: self
                .min_price
                .as_deref()
                .and_then(|raw| raw.trim().parse::<Decimal>().ok()),
            max_price: self
                .max_price
                .as_deref()
                .and_then(|raw| raw.trim().parse::<Decimal>().ok()),
        }
    }
}

/// Home page template: filter bar plus product grid.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nav: Option<Nav>,
    pub products: Vec<ProductView>,
    pub category_options: Vec<String>,
    pub selected_category: String,
    pub name_filter: String,
    pub min_price: String,
    pub max_price: String,
}

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub nav: Option<Nav>,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/contact.html")]
pub struct ContactTemplate {
    pub nav: Option<Nav>,
}

/// Services page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/services.html")]
pub struct ServicesTemplate {
    pub nav: Option<Nav>,
}

/// Product browsing with category/name/price filters.
#[instrument(skip(state, user))]
pub async fn home(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<FilterQuery>,
) -> Result<HomeTemplate> {
    let products = state.backend().products_all().await?;
    let categories = state.backend().categories_all().await?;

    let filter = query.to_filter();
    let filtered = filter_products(&products, &filter);

    let mut category_options = vec![ALL_CATEGORIES.to_string()];
    category_options.extend(categories.iter().map(|c| c.name.clone()));

    Ok(HomeTemplate {
        nav: Some(Nav::from(&user)),
        products: filtered.iter().map(ProductView::from).collect(),
        category_options,
        selected_category: filter.category,
        name_filter: filter.name,
        min_price: query.min_price.unwrap_or_default(),
        max_price: query.max_price.unwrap_or_default(),
    })
}

/// About page.
pub async fn about(RequireAuth(user): RequireAuth) -> AboutTemplate {
    AboutTemplate {
        nav: Some(Nav::from(&user)),
    }
}

/// Contact page.
pub async fn contact(RequireAuth(user): RequireAuth) -> ContactTemplate {
    ContactTemplate {
        nav: Some(Nav::from(&user)),
    }
}

/// Services page.
pub async fn services(RequireAuth(user): RequireAuth) -> ServicesTemplate {
    ServicesTemplate {
        nav: Some(Nav::from(&user)),
    }
}
