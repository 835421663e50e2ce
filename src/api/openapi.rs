use super::handlers::{admin, auth, health, live, users};
use utoipa::openapi::{Contact, InfoBuilder, License, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Reuse the same router wiring and only return the generated OpenAPI spec.
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Build the router that also drives the `OpenAPI` document.
///
/// Add new endpoints here via `.routes(routes!(...))` so they are both served
/// and included in the generated `OpenAPI` spec.
/// Routes added outside (like `/`) are intentionally not documented.
pub(crate) fn api_router() -> OpenApiRouter {
    // `routes!` reads #[utoipa::path] to bind HTTP method + path and add the route to OpenAPI.
    OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .routes(routes!(auth::send_otp))
        .routes(routes!(auth::verify_otp))
        .routes(routes!(auth::oauth::oauth_callback))
        .routes(routes!(auth::admin::admin_login))
        .routes(routes!(users::me, users::update_me))
        .routes(routes!(users::wallets))
        .routes(routes!(users::rewards))
        .routes(routes!(users::request_withdrawal))
        .routes(routes!(live::request_live))
        .routes(routes!(live::list_live))
        .routes(routes!(live::comments, live::post_comment))
        .routes(routes!(admin::list_users))
        .routes(routes!(admin::toggle_block))
        .routes(routes!(admin::list_live_requests))
        .routes(routes!(admin::approve_live))
        .routes(routes!(admin::reject_live))
        .routes(routes!(admin::list_wallet_requests))
        .routes(routes!(admin::approve_wallet))
        .routes(routes!(admin::reject_wallet))
        .routes(routes!(admin::analytics))
        .routes(routes!(admin::audit_logs))
}

fn api_tags() -> Vec<Tag> {
    let mut auth_tag = Tag::new("auth");
    auth_tag.description = Some("Passwordless and federated login".to_string());

    let mut user_tag = Tag::new("user");
    user_tag.description = Some("Self-service profile, wallets, and withdrawals".to_string());

    let mut live_tag = Tag::new("live");
    live_tag.description = Some("Live streams and comments".to_string());

    let mut admin_tag = Tag::new("admin");
    admin_tag.description = Some("Moderation, analytics, and audit trail".to_string());

    vec![auth_tag, user_tag, live_tag, admin_tag]
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    // Use Cargo.toml metadata instead of the utoipa-axum crate info defaults.
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(optional_str(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = cargo_contact();
    info.license = cargo_license();

    OpenApiBuilder::new().info(info).tags(Some(api_tags())).build()
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors are `;` separated and may include "Name <email>".
    let authors = env!("CARGO_PKG_AUTHORS");
    let primary = authors.split(';').next().map(str::trim)?;
    if primary.is_empty() {
        return None;
    }

    let (name, email) = parse_author(primary);
    if name.is_none() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = name.map(str::to_string);
    contact.email = email.map(str::to_string);
    Some(contact)
}

fn cargo_license() -> Option<License> {
    let identifier = optional_str(env!("CARGO_PKG_LICENSE"))?;
    let mut license = License::new(identifier);
    license.identifier = Some(identifier.to_string());
    Some(license)
}

fn optional_str(value: &'static str) -> Option<&'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    if let Some(start) = author.find('<') {
        let name = author[..start].trim();
        let email = author[start + 1..].trim_end_matches('>').trim();
        let name = if name.is_empty() { None } else { Some(name) };
        let email = if email.is_empty() { None } else { Some(email) };
        (name, email)
    } else {
        let name = author.trim();
        (if name.is_empty() { None } else { Some(name) }, None)
    }
}
