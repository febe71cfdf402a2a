use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;

use crate::auth::AuthenticationFacade;
use crate::logger::LoggerMiddleware;
use crate::middleware::JwtMiddleware;
use crate::routes::{authenticate, current_account, health_check, refresh, register};

pub fn run(listener: TcpListener, auth: AuthenticationFacade) -> Result<Server, std::io::Error> {
    let auth_data = web::Data::new(auth.clone());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(LoggerMiddleware)
            .app_data(auth_data.clone())
            // Public routes
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api/v1/auth")
                    .route("/register", web::post().to(register))
                    .route("/authenticate", web::post().to(authenticate))
                    .route("/refresh", web::post().to(refresh)),
            )
            // Protected routes (require an access token)
            .service(
                web::scope("/api")
                    .wrap(JwtMiddleware::new(auth.clone()))
                    .route("/me", web::get().to(current_account)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
