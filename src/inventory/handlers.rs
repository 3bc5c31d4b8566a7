use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::SignedCookieJar;
use tracing::{info, instrument, warn};

use crate::{
    auth::session::RequireSession,
    error::AppError,
    flash::{self, Level},
    inventory::dto::{
        DashboardPage, InventoryPage, ListQuery, ProductForm, ProductFormPage, ReportPage,
    },
    inventory::repo::Product,
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/inventory", get(list))
        .route("/inventory/add", get(add_page))
        .route("/inventory/:id/edit", get(edit_page))
        .route("/reports", get(reports))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/inventory/add", post(add))
        .route("/inventory/:id/edit", post(edit))
        .route("/inventory/:id/delete", post(delete))
}

#[instrument(skip(state, jar, session), fields(user_id = session.user_id))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Json<DashboardPage>), AppError> {
    let count = Product::count(&state.db).await?;
    let total_value = Product::total_value(&state.db).await?;
    let (jar, flash) = flash::pop(jar);
    Ok((
        jar,
        Json(DashboardPage {
            count,
            total_value,
            flash,
        }),
    ))
}

#[instrument(skip(state, jar, session), fields(user_id = session.user_id))]
pub async fn list(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    jar: SignedCookieJar,
    Query(query): Query<ListQuery>,
) -> Result<(SignedCookieJar, Json<InventoryPage>), AppError> {
    let q = query.q.trim().to_string();
    let items = Product::search(&state.db, &q).await?;
    let (jar, flash) = flash::pop(jar);
    Ok((jar, Json(InventoryPage { items, q, flash })))
}

#[instrument(skip(jar, session), fields(user_id = session.user_id))]
pub async fn add_page(
    RequireSession(session): RequireSession,
    jar: SignedCookieJar,
) -> (SignedCookieJar, Json<ProductFormPage>) {
    let (jar, flash) = flash::pop(jar);
    (jar, Json(ProductFormPage { item: None, flash }))
}

#[instrument(skip(state, jar, session, form), fields(user_id = session.user_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    jar: SignedCookieJar,
    Form(form): Form<ProductForm>,
) -> Result<(SignedCookieJar, Redirect), AppError> {
    let name = form.name.trim();
    if name.is_empty() {
        warn!("product add with empty name");
        return Err(AppError::Validation("Name is required."));
    }

    let product = Product::create(
        &state.db,
        name,
        form.category.trim(),
        form.quantity(),
        form.price(),
    )
    .await?;

    info!(product_id = product.id, name = %product.name, "product added");
    let jar = flash::push(jar, Level::Success, "Product added.");
    Ok((jar, Redirect::to("/inventory")))
}

#[instrument(skip(state, jar, session), fields(user_id = session.user_id))]
pub async fn edit_page(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    jar: SignedCookieJar,
    Path(id): Path<i64>,
) -> Result<(SignedCookieJar, Json<ProductFormPage>), AppError> {
    let item = Product::find(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Product"))?;
    let (jar, flash) = flash::pop(jar);
    Ok((
        jar,
        Json(ProductFormPage {
            item: Some(item),
            flash,
        }),
    ))
}

#[instrument(skip(state, jar, session, form), fields(user_id = session.user_id))]
pub async fn edit(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    jar: SignedCookieJar,
    Path(id): Path<i64>,
    Form(form): Form<ProductForm>,
) -> Result<(SignedCookieJar, Redirect), AppError> {
    let existing = Product::find(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Product"))?;

    // Full overwrite of every field. Unlike Add, an empty name is accepted
    // here.
    let product = Product::update(
        &state.db,
        existing.id,
        form.name.trim(),
        form.category.trim(),
        form.quantity(),
        form.price(),
    )
    .await?;

    info!(product_id = product.id, "product updated");
    let jar = flash::push(jar, Level::Success, "Product updated.");
    Ok((jar, Redirect::to("/inventory")))
}

#[instrument(skip(state, jar, session), fields(user_id = session.user_id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    jar: SignedCookieJar,
    Path(id): Path<i64>,
) -> Result<(SignedCookieJar, Redirect), AppError> {
    let existing = Product::find(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Product"))?;
    Product::delete(&state.db, existing.id).await?;

    info!(product_id = existing.id, name = %existing.name, "product deleted");
    let jar = flash::push(jar, Level::Success, "Product deleted.");
    Ok((jar, Redirect::to("/inventory")))
}

#[instrument(skip(state, jar, session), fields(user_id = session.user_id))]
pub async fn reports(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Json<ReportPage>), AppError> {
    let total_value = Product::total_value(&state.db).await?;
    let low_stock = Product::low_stock(&state.db).await?;
    let (jar, flash) = flash::pop(jar);
    Ok((
        jar,
        Json(ReportPage {
            total_value,
            low_stock,
            flash,
        }),
    ))
}
