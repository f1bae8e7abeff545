use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    /// `None` when any required object storage setting is absent
    pub object_storage: Option<ObjectStorageConfig>,
    /// `None` when the document store URL or database is absent
    pub document_store: Option<DocumentStoreConfig>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

/// S3-compatible object storage configuration for file uploads
#[derive(Debug, Clone)]
pub struct ObjectStorageConfig {
    /// Endpoint host, optionally with a scheme (the scheme is ignored)
    pub endpoint: String,
    /// Access key for authentication
    pub access_key: String,
    /// Secret key for authentication
    pub secret_key: String,
    /// Bucket name for storing files
    pub bucket: String,
    /// Signing region (for S3 compatibility)
    pub region: String,
    /// Whether the connection to the endpoint uses TLS
    pub use_ssl: bool,
}

/// Document database (Cloudant/CouchDB REST API) configuration
#[derive(Debug, Clone)]
pub struct DocumentStoreConfig {
    /// Base URL, e.g. `https://account.cloudant.com`
    pub url: String,
    pub database: String,
    /// Basic auth is only sent when a username is present
    pub username: Option<String>,
    pub password: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            // Only error if it's not "file not found" - that's acceptable
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Self::from_source(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_source<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            app: AppConfig::from_source(&lookup)?,
            object_storage: ObjectStorageConfig::from_source(&lookup),
            document_store: DocumentStoreConfig::from_source(&lookup),
        })
    }
}

impl AppConfig {
    const DEFAULT_PORT: u16 = 8080;
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 10 * 1024 * 1024; // 10MB

    fn from_source<F>(lookup: &F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match non_empty(lookup("PORT")) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| format!("Invalid PORT: {}", e))?,
            None => Self::DEFAULT_PORT,
        };

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = match non_empty(lookup("MAX_REQUEST_BODY_SIZE")) {
            Some(raw) => raw.parse::<usize>().unwrap_or_else(|_| {
                tracing::warn!(
                    "MAX_REQUEST_BODY_SIZE is not a number ('{}'), using {}",
                    raw,
                    Self::DEFAULT_MAX_REQUEST_BODY_SIZE
                );
                Self::DEFAULT_MAX_REQUEST_BODY_SIZE
            }),
            None => Self::DEFAULT_MAX_REQUEST_BODY_SIZE,
        };

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ObjectStorageConfig {
    const DEFAULT_REGION: &'static str = "us-east-1";

    fn from_source<F>(lookup: &F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let use_ssl = match non_empty(lookup("IBM_COS_USE_SSL")) {
            Some(raw) => parse_bool(&raw).unwrap_or_else(|| {
                tracing::warn!(
                    "IBM_COS_USE_SSL is not a boolean ('{}'), connecting without TLS",
                    raw
                );
                false
            }),
            None => true,
        };

        let endpoint = non_empty(lookup("IBM_COS_ENDPOINT"));
        let access_key = non_empty(lookup("IBM_COS_ACCESS_KEY"));
        let secret_key = non_empty(lookup("IBM_COS_SECRET_KEY"));
        let bucket = non_empty(lookup("IBM_COS_BUCKET"));

        let (Some(endpoint), Some(access_key), Some(secret_key), Some(bucket)) =
            (endpoint, access_key, secret_key, bucket)
        else {
            return None;
        };

        let region = non_empty(lookup("IBM_COS_REGION"))
            .unwrap_or_else(|| Self::DEFAULT_REGION.to_string());

        Some(Self {
            endpoint,
            access_key,
            secret_key,
            bucket,
            region,
            use_ssl,
        })
    }
}

impl DocumentStoreConfig {
    fn from_source<F>(lookup: &F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = non_empty(lookup("CLOUDANT_URL"))?;
        let database = non_empty(lookup("CLOUDANT_DB"))?;

        Some(Self {
            url,
            database,
            username: non_empty(lookup("CLOUDANT_USERNAME")),
            password: lookup("CLOUDANT_PASSWORD").unwrap_or_default(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Accepts `1`, `t`, `true` (in the usual casings) and their false counterparts.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
