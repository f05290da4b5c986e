use std::collections::HashMap;
use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use config::ConfigError;
use serde::Deserialize;

/// The six deployables built from this crate. One process runs one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Category,
    Quiz,
    Question,
    Registration,
    Auth,
    Report,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 6] = [
        ServiceKind::Category,
        ServiceKind::Quiz,
        ServiceKind::Question,
        ServiceKind::Registration,
        ServiceKind::Auth,
        ServiceKind::Report,
    ];

    /// Name under which peers resolve this service.
    pub fn service_name(self) -> &'static str {
        match self {
            ServiceKind::Category => "category-service",
            ServiceKind::Quiz => "quiz-service",
            ServiceKind::Question => "question-service",
            ServiceKind::Registration => "registration-service",
            ServiceKind::Auth => "auth-service",
            ServiceKind::Report => "report-service",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            ServiceKind::Category => 8081,
            ServiceKind::Quiz => 8082,
            ServiceKind::Question => 8083,
            ServiceKind::Registration => 8084,
            ServiceKind::Auth => 8085,
            ServiceKind::Report => 8086,
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.service_name())
    }
}

impl FromStr for ServiceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let name = name.trim_end_matches("-service");
        match name {
            "category" => Ok(ServiceKind::Category),
            "quiz" => Ok(ServiceKind::Quiz),
            "question" => Ok(ServiceKind::Question),
            "registration" => Ok(ServiceKind::Registration),
            "auth" => Ok(ServiceKind::Auth),
            "report" => Ok(ServiceKind::Report),
            other => Err(ConfigError::Message(format!("Unknown service: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Mongo,
}

/// How incoming bearer tokens are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthGate {
    /// Verify the JWT signature with the shared secret.
    #[default]
    Local,
    /// Ask the auth service.
    Remote,
    Off,
}

/// What a cascading delete does when one child cannot be removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CascadePolicy {
    /// Record the failure, keep that child, go on with the next one.
    #[default]
    Continue,
    /// Stop at the first failure. Children already removed stay removed.
    Abort,
}

fn parse_choice<T: for<'de> Deserialize<'de>>(key: &str, raw: &str) -> Result<T, ConfigError> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_ascii_lowercase()))
        .map_err(|_| ConfigError::Message(format!("Invalid value for {}: {}", key, raw)))
}

#[derive(Debug, Clone)]
pub struct Config {
    pub service: ServiceKind,
    pub bind_addr: SocketAddr,
    pub store_backend: StoreBackend,
    pub mongo_uri: String,
    pub mongo_database: String,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub auth_gate: AuthGate,
    pub cascade_policy: CascadePolicy,
    /// Peer service name to base URL.
    pub peers: HashMap<String, String>,
    pub otlp_endpoint: Option<String>,
}

pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;
const DEV_JWT_SECRET: &str = "dev-secret-only-for-local-testing";

impl Config {
    /// Defaults for running `service` on a developer machine with every peer
    /// on localhost.
    pub fn for_service(service: ServiceKind) -> Self {
        let peers = ServiceKind::ALL
            .iter()
            .map(|kind| {
                (
                    kind.service_name().to_string(),
                    format!("http://127.0.0.1:{}", kind.default_port()),
                )
            })
            .collect();

        Self {
            service,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], service.default_port())),
            store_backend: StoreBackend::Memory,
            mongo_uri: "mongodb://localhost:27017".to_string(),
            mongo_database: format!("quizhub_{:?}", service).to_lowercase(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
            auth_gate: AuthGate::Local,
            cascade_policy: CascadePolicy::Continue,
            peers,
            otlp_endpoint: None,
        }
    }

    /// `service` overrides `APP_SERVICE` when given (first CLI argument).
    pub fn load(service: Option<&str>) -> Result<Self, ConfigError> {
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            dotenvy::dotenv().ok();
        }

        let env_name = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let service: ServiceKind = match service {
            Some(name) => name.parse()?,
            None => settings
                .get_string("service")
                .map_err(|_| {
                    ConfigError::Message(
                        "No service selected: pass it as the first argument or set APP_SERVICE"
                            .to_string(),
                    )
                })?
                .parse()?,
        };

        let mut cfg = Config::for_service(service);

        if let Ok(addr) = settings.get_string("bind_addr") {
            cfg.bind_addr = addr
                .parse()
                .map_err(|e| ConfigError::Message(format!("Invalid bind_addr {}: {}", addr, e)))?;
        }

        if let Ok(raw) = settings.get_string("store.backend") {
            cfg.store_backend = parse_choice("store.backend", &raw)?;
        }

        if let Ok(uri) = settings
            .get_string("database.mongo_uri")
            .or_else(|_| env::var("MONGO_URI"))
        {
            cfg.mongo_uri = uri;
        }

        if let Ok(db) = settings.get_string("database.mongo_database") {
            cfg.mongo_database = db;
        }

        match settings
            .get_string("auth.jwt_secret")
            .or_else(|_| env::var("JWT_SECRET"))
        {
            Ok(secret) => cfg.jwt_secret = secret,
            Err(_) if env_name == "prod" => {
                return Err(ConfigError::Message(
                    "JWT_SECRET must be set in production".to_string(),
                ));
            }
            Err(_) => eprintln!("WARNING: Using default JWT_SECRET (dev mode only!)"),
        }

        if let Ok(ttl) = settings.get_int("auth.token_ttl_minutes") {
            cfg.token_ttl_minutes = ttl;
        }

        if let Ok(raw) = settings.get_string("auth.gate") {
            cfg.auth_gate = parse_choice("auth.gate", &raw)?;
        }

        if let Ok(raw) = settings.get_string("cascade.policy") {
            cfg.cascade_policy = parse_choice("cascade.policy", &raw)?;
        }

        if let Ok(table) = settings.get_table("peers") {
            for (name, value) in table {
                let address = value.into_string()?;
                cfg.peers.insert(name.replace('_', "-"), address);
            }
        }

        cfg.otlp_endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Ok(cfg)
    }
}
