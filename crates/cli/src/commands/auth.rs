//! Sign-in, registration and sign-out.

use secrecy::SecretString;

use devmart_storefront::error::{AppError, clear_sentry_user, set_sentry_user};
use devmart_storefront::routes::Route;
use devmart_storefront::state::AppState;
use devmart_storefront::validation::{LoginForm, RegisterForm};

pub async fn login(state: &AppState, email: String, password: String) -> Result<(), AppError> {
    let form = LoginForm {
        email,
        password: SecretString::from(password),
    };
    let user = state.session().login(&form).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    println!("Signed in as {} ({})", user.username, user.email);
    Ok(())
}

pub async fn register(
    state: &AppState,
    username: String,
    email: String,
    password: String,
    confirm: String,
) -> Result<(), AppError> {
    let form = RegisterForm {
        username,
        email,
        password: SecretString::from(password),
        confirm_password: SecretString::from(confirm),
    };
    match state.session().register(&form).await? {
        Some(user) => {
            set_sentry_user(&user.id, Some(user.email.as_str()));
            println!("Welcome, {}! You are signed in.", user.username);
        }
        None => println!("Account created. Sign in with `devmart login`."),
    }
    Ok(())
}

pub async fn logout(state: &AppState) {
    state.session().logout().await;
    clear_sentry_user();
    println!("Signed out.");
}

pub async fn whoami(state: &AppState) -> Result<(), AppError> {
    let user = super::require(state, &Route::Profile).await?;
    println!("{} <{}>", user.username, user.email);
    println!("Role:    {}", user.role);
    if let Some(created_at) = user.created_at {
        println!("Member since {}", created_at.format("%Y-%m-%d"));
    }
    Ok(())
}
