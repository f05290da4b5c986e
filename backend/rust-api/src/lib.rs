use std::sync::Arc;

use axum::{
    http::{header, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use mongodb::Database;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod remote;
pub mod services;
pub mod store;
pub mod telemetry;
pub mod utils;

pub use config::{Config, ServiceKind};

use config::AuthGate;
use handlers::HealthState;
use middlewares::auth::{auth_middleware, JwtService, ServiceToken, TokenGate};
use models::{Category, Credential, Question, Quiz, Registration, Report};
use remote::{
    HttpAuthPeer, HttpCategoryPeer, HttpQuestionPeer, HttpQuizPeer, HttpRegistrationPeer,
    RemoteClient, ServiceResolver,
};
use services::{
    AuthService, CategoryService, QuestionService, QuizService, RegistrationService, ReportService,
};
use store::{MemoryStore, MongoStore, ResourceStore};

/// Persistence for every resource kind. A process only touches the store of
/// the service it runs.
#[derive(Clone)]
pub struct Stores {
    pub categories: Arc<dyn ResourceStore<Category>>,
    pub quizzes: Arc<dyn ResourceStore<Quiz>>,
    pub questions: Arc<dyn ResourceStore<Question>>,
    pub registrations: Arc<dyn ResourceStore<Registration>>,
    pub credentials: Arc<dyn ResourceStore<Credential>>,
    pub reports: Arc<dyn ResourceStore<Report>>,
}

impl Stores {
    pub fn memory() -> Self {
        Self {
            categories: Arc::new(MemoryStore::<Category>::new()),
            quizzes: Arc::new(MemoryStore::<Quiz>::new()),
            questions: Arc::new(MemoryStore::<Question>::new()),
            registrations: Arc::new(MemoryStore::<Registration>::new()),
            credentials: Arc::new(MemoryStore::<Credential>::new()),
            reports: Arc::new(MemoryStore::<Report>::new()),
        }
    }

    pub fn mongo(db: &Database) -> Self {
        Self {
            categories: Arc::new(MongoStore::<Category>::new(db)),
            quizzes: Arc::new(MongoStore::<Quiz>::new(db)),
            questions: Arc::new(MongoStore::<Question>::new(db)),
            registrations: Arc::new(MongoStore::<Registration>::new(db)),
            credentials: Arc::new(MongoStore::<Credential>::new(db)),
            reports: Arc::new(MongoStore::<Report>::new(db)),
        }
    }
}

/// Everything a service process needs besides its own code.
pub struct Wiring {
    pub config: Config,
    pub resolver: Arc<dyn ServiceResolver>,
    pub stores: Stores,
    pub http: reqwest::Client,
    pub mongo: Option<Database>,
    pub hash_cost: u32,
}

impl Wiring {
    pub fn new(config: Config, resolver: Arc<dyn ServiceResolver>, stores: Stores) -> Self {
        Self {
            config,
            resolver,
            stores,
            http: reqwest::Client::new(),
            mongo: None,
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn with_mongo(mut self, db: Database) -> Self {
        self.mongo = Some(db);
        self
    }

    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    fn peer(&self, kind: ServiceKind, token: &Arc<ServiceToken>) -> RemoteClient {
        RemoteClient::new(self.http.clone(), self.resolver.clone(), kind.service_name())
            .with_service_token(token.clone())
    }
}

/// Router for the service selected in `wiring.config`.
pub fn create_router(wiring: &Wiring) -> anyhow::Result<Router> {
    let config = &wiring.config;
    let jwt = Arc::new(JwtService::new(&config.jwt_secret, config.token_ttl_minutes));
    let service_token = Arc::new(ServiceToken::new(
        &config.jwt_secret,
        config.service.service_name(),
    ));

    let domain = match config.service {
        ServiceKind::Category => category_routes(Arc::new(CategoryService::new(
            wiring.stores.categories.clone(),
            Arc::new(HttpQuizPeer::new(wiring.peer(ServiceKind::Quiz, &service_token))),
        ))),
        ServiceKind::Quiz => quiz_routes(Arc::new(QuizService::new(
            wiring.stores.quizzes.clone(),
            Arc::new(HttpCategoryPeer::new(wiring.peer(ServiceKind::Category, &service_token))),
            Arc::new(HttpQuestionPeer::new(wiring.peer(ServiceKind::Question, &service_token))),
            config.cascade_policy,
        ))),
        ServiceKind::Question => question_routes(Arc::new(QuestionService::new(
            wiring.stores.questions.clone(),
            Arc::new(HttpQuizPeer::new(wiring.peer(ServiceKind::Quiz, &service_token))),
        ))),
        ServiceKind::Registration => registration_routes(Arc::new(
            RegistrationService::new(wiring.stores.registrations.clone())
                .with_hash_cost(wiring.hash_cost),
        )),
        ServiceKind::Report => report_routes(Arc::new(ReportService::new(
            wiring.stores.reports.clone(),
            Arc::new(HttpRegistrationPeer::new(
                wiring.peer(ServiceKind::Registration, &service_token),
            )),
            Arc::new(HttpQuizPeer::new(wiring.peer(ServiceKind::Quiz, &service_token))),
        ))),
        ServiceKind::Auth => auth_routes(Arc::new(
            AuthService::new(wiring.stores.credentials.clone(), jwt.clone())
                .with_hash_cost(wiring.hash_cost),
        )),
    };

    let gate = match (config.service, config.auth_gate) {
        (ServiceKind::Auth, _) | (_, AuthGate::Off) => TokenGate::Off,
        (_, AuthGate::Local) => TokenGate::Local(jwt),
        (_, AuthGate::Remote) => TokenGate::Remote(Arc::new(HttpAuthPeer::new(
            wiring.peer(ServiceKind::Auth, &service_token),
        ))),
    };
    let domain = domain.route_layer(middleware::from_fn_with_state(
        Arc::new(gate),
        auth_middleware,
    ));

    let health = Arc::new(HealthState {
        service: config.service,
        mongo: wiring.mongo.clone(),
    });

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any);

    Ok(Router::new()
        .route("/health", get(handlers::health_check))
        .with_state(health)
        .route("/metrics", get(handlers::metrics_handler))
        .merge(domain)
        .layer(middleware::from_fn(middlewares::metrics::metrics_middleware))
        .layer(middleware::from_fn(middlewares::trace::trace_context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}

fn category_routes(service: Arc<CategoryService>) -> Router {
    use handlers::category;

    Router::new()
        .route("/categories", post(category::add).get(category::list))
        .route("/categories/batch", get(category::batch))
        .route(
            "/categories/{id}",
            get(category::get)
                .put(category::update)
                .delete(category::delete),
        )
        .route("/categories/enable/{id}", put(category::enable))
        .route("/categories/disable/{id}", put(category::disable))
        .with_state(service)
}

fn quiz_routes(service: Arc<QuizService>) -> Router {
    use handlers::quiz;

    Router::new()
        .route("/quizzes/save", post(quiz::add))
        .route("/quizzes", get(quiz::list))
        .route("/quizzes/batch", get(quiz::batch))
        .route(
            "/quizzes/{id}",
            get(quiz::get).put(quiz::update).delete(quiz::delete),
        )
        .route("/quizzes/categories/{category_id}", get(quiz::list_by_category))
        .route(
            "/quizzes/delete/quiz/{category_id}",
            delete(quiz::delete_by_category),
        )
        .route("/quizzes/enable/{id}", put(quiz::enable))
        .route("/quizzes/disable/{id}", put(quiz::disable))
        .with_state(service)
}

fn question_routes(service: Arc<QuestionService>) -> Router {
    use handlers::question;

    Router::new()
        .route("/api/questions", post(question::add).get(question::list))
        .route(
            "/api/questions/{id}",
            get(question::get)
                .put(question::update)
                .delete(question::delete),
        )
        .route("/api/questions/quiz/{quiz_id}", get(question::list_by_quiz))
        .route(
            "/api/questions/deletebyquiz/{quiz_id}",
            delete(question::delete_by_quiz),
        )
        .with_state(service)
}

fn registration_routes(service: Arc<RegistrationService>) -> Router {
    use handlers::registration;

    Router::new()
        .route("/users/register", post(registration::register))
        .route("/users/login", post(registration::login))
        .route("/users", get(registration::list))
        .route("/users/batch", get(registration::batch))
        .route("/users/get/{user_id}", get(registration::get))
        .route("/users/getUser/{email}", get(registration::get_by_email))
        .route("/users/{user_id}", put(registration::update))
        .with_state(service)
}

fn report_routes(service: Arc<ReportService>) -> Router {
    use handlers::report;

    Router::new()
        .route("/reports", post(report::create).get(report::list))
        .route("/reports/{email}", get(report::list_by_email))
        .route("/reports/id/{report_id}", get(report::get))
        .with_state(service)
}

fn auth_routes(service: Arc<AuthService>) -> Router {
    use handlers::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/token", post(auth::token))
        .route("/auth/validate", get(auth::validate))
        .with_state(service)
}
