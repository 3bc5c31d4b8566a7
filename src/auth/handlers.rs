use axum::{
    extract::State,
    response::Redirect,
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::SignedCookieJar;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthPage, LoginForm, RegisterForm},
        password::{hash_password, verify_password},
        repo::User,
        session::Session,
    },
    error::AppError,
    flash::{self, Level},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
}

#[instrument(skip(jar))]
pub async fn register_page(jar: SignedCookieJar) -> (SignedCookieJar, Json<AuthPage>) {
    let (jar, flash) = flash::pop(jar);
    (jar, Json(AuthPage { flash }))
}

#[instrument(skip(state, jar, form))]
pub async fn register(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<(SignedCookieJar, Redirect), AppError> {
    let username = form.username.trim();
    let password = form.password.trim();

    if username.is_empty() || password.is_empty() {
        warn!("registration with empty username or password");
        return Err(AppError::Validation("Username and password are required."));
    }

    if User::find_by_username(&state.db, username).await?.is_some() {
        warn!(username, "username already registered");
        return Err(AppError::DuplicateUsername);
    }

    let hash = hash_password(password)?;
    let user = match User::create(&state.db, username, &hash).await {
        Ok(u) => u,
        // The UNIQUE constraint closes the window the pre-check leaves open.
        Err(e) if is_unique_violation(&e) => {
            warn!(username, "username taken between check and insert");
            return Err(AppError::DuplicateUsername);
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = user.id, username = %user.username, "user registered");
    let jar = flash::push(jar, Level::Success, "Registration successful. Please log in.");
    Ok((jar, Redirect::to("/login")))
}

#[instrument(skip(jar))]
pub async fn login_page(jar: SignedCookieJar) -> (SignedCookieJar, Json<AuthPage>) {
    let (jar, flash) = flash::pop(jar);
    (jar, Json(AuthPage { flash }))
}

#[instrument(skip(state, jar, form))]
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(SignedCookieJar, Redirect), AppError> {
    let username = form.username.trim();
    let password = form.password.trim();

    // Unknown username and wrong password must be indistinguishable to the
    // caller; only the logs tell them apart.
    let user = match User::find_by_username(&state.db, username).await? {
        Some(u) => u,
        None => {
            warn!(username, "login with unknown username");
            return Err(AppError::InvalidCredentials);
        }
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = user.id, "login with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    info!(user_id = user.id, username = %user.username, "user logged in");
    let jar = Session { user_id: user.id }.store(jar);
    Ok((jar, Redirect::to("/dashboard")))
}

/// Clears the session unconditionally; logging out twice is fine.
#[instrument(skip(jar))]
pub async fn logout(jar: SignedCookieJar) -> (SignedCookieJar, Redirect) {
    (Session::clear(jar), Redirect::to("/login"))
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|db| db.is_unique_violation())
}
