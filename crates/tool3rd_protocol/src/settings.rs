use serde::{Deserialize, Serialize};

/// Application settings persisted by the orchestrator and applied on launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub proxy: ProxySettings,
    pub certificate: CertificateSettings,
    #[serde(default = "default_verify_certificate")]
    pub verify_certificate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxySettings {
    #[serde(rename = "use", default)]
    pub enabled: bool,
    pub protocol: ProxyProtocol,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyProtocol {
    Http,
    Https,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateSettings {
    #[serde(rename = "use", default)]
    pub enabled: bool,
    pub path: String,
}

fn default_verify_certificate() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            proxy: ProxySettings {
                enabled: false,
                protocol: ProxyProtocol::Http,
                host: String::new(),
                port: 0,
            },
            certificate: CertificateSettings {
                enabled: false,
                path: String::new(),
            },
            verify_certificate: true,
        }
    }
}

impl ProxySettings {
    /// Proxy URL when the proxy is enabled and has a host.
    pub fn url(&self) -> Option<String> {
        if !self.enabled || self.host.trim().is_empty() {
            return None;
        }
        let scheme = match self.protocol {
            ProxyProtocol::Http => "http",
            ProxyProtocol::Https => "https",
        };
        Some(format!("{scheme}://{}:{}", self.host.trim(), self.port))
    }
}

impl CertificateSettings {
    /// Path of the custom CA certificate when enabled.
    pub fn active_path(&self) -> Option<&str> {
        let path = self.path.trim();
        (self.enabled && !path.is_empty()).then_some(path)
    }
}
