use std::path::PathBuf;

use serde::Deserialize;

/// Port that marks a secure deployment; TLS is enabled iff we listen on it.
pub const TLS_PORT: u16 = 8443;

fn default_listen_addr() -> String {
    "127.0.0.1:8443".to_string()
}

fn default_tls_cert() -> PathBuf {
    PathBuf::from("cert.pem")
}

fn default_tls_key() -> PathBuf {
    PathBuf::from("key.pem")
}

fn default_static_root() -> PathBuf {
    PathBuf::from("static")
}

/// Server configuration. Immutable after construction; the listener owns it.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Address to listen on, e.g. "127.0.0.1:8443".
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// PEM certificate chain, loaded only when TLS is enabled.
    #[serde(default = "default_tls_cert")]
    pub tls_cert: PathBuf,
    /// PEM private key, loaded only when TLS is enabled.
    #[serde(default = "default_tls_key")]
    pub tls_key: PathBuf,
    /// Filesystem root backing the /static/ URL prefix.
    #[serde(default = "default_static_root")]
    pub static_root: PathBuf,
}

impl Config {
    /// Loads configuration from the YAML file named by `EMBER_CONFIG`,
    /// falling back to individual environment variables and defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("EMBER_CONFIG") {
            match Self::from_yaml(&path) {
                Ok(cfg) => return cfg,
                Err(e) => tracing::warn!("Failed to load config file {}: {}", path, e),
            }
        }

        Self {
            listen_addr: std::env::var("LISTEN").unwrap_or_else(|_| default_listen_addr()),
            tls_cert: std::env::var("TLS_CERT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_tls_cert()),
            tls_key: std::env::var("TLS_KEY")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_tls_key()),
            static_root: std::env::var("STATIC_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_static_root()),
        }
    }

    pub fn from_yaml(path: &str) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }

    /// Whether this deployment terminates TLS.
    pub fn tls_enabled(&self) -> bool {
        self.port() == TLS_PORT
    }

    /// Port component of the listen address (0 if unparseable).
    pub fn port(&self) -> u16 {
        self.listen_addr
            .rsplit_once(':')
            .and_then(|(_, port)| port.parse().ok())
            .unwrap_or(0)
    }

    /// Host component of the listen address, for the gateway environment.
    pub fn server_name(&self) -> String {
        match self.listen_addr.rsplit_once(':') {
            Some((host, _)) if !host.is_empty() => host.to_string(),
            _ => "localhost".to_string(),
        }
    }
}
