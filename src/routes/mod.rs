pub mod auth;
pub mod comments;
pub mod feed;
pub mod grades;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

use crate::error::AppError;

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

fn form_config() -> web::FormConfig {
    web::FormConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::NotFound(err.to_string()).into())
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(form_config())
        .app_data(path_config())
        .service(health::health)
        .service(
            web::scope("/auth")
                .service(auth::login_for_access_token)
                .service(auth::resend_verification_email)
                .service(auth::verify_email)
                .service(auth::request_password_refresh)
                .service(auth::refresh_password),
        )
        .service(
            web::scope("/users")
                .service(users::create_user)
                .service(users::get_current_user)
                .service(users::update_user),
        )
        // Fixed paths go first so they are not captured by `/{task_id}`.
        .service(
            web::scope("/tasks")
                .service(grades::get_subscriptions)
                .service(grades::subscribe)
                .service(comments::add_comment)
                .service(comments::update_comment)
                .service(comments::delete_comment)
                .service(comments::get_comments)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        )
        .service(web::scope("/feed").service(feed::get_feed));
}
