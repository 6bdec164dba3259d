use serde::Deserialize;
use std::{net::IpAddr, path::PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct SiteSettings {
    /// Configured site URL; only its path component matters for routing.
    pub base_url: String,

    /// Script every path-info style request is routed through.
    #[serde(default = "default_front_controller")]
    pub front_controller: String,

    /// Template set used when no microsite matches.
    #[serde(default = "default_template")]
    pub template: String,

    /// Defaults to `template` when omitted.
    pub stylesheet: Option<String>,
}

impl SiteSettings {
    pub fn stylesheet(&self) -> &str {
        self.stylesheet.as_deref().unwrap_or(&self.template)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub ip: IpAddr,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            ip: IpAddr::from([127, 0, 0, 1]),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThemeSettings {
    pub dir: PathBuf,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./themes/"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MicrositeSettings {
    pub dir: PathBuf,
}

impl Default for MicrositeSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./microsites/"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminSettings {
    pub path: String,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            path: "/admin/template-sets".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub site: SiteSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub themes: ThemeSettings,
    #[serde(default)]
    pub microsites: MicrositeSettings,
    #[serde(default)]
    pub admin: AdminSettings,
}

fn default_front_controller() -> String {
    "index.php".to_string()
}

fn default_template() -> String {
    "default".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_settings_fill_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [site]
            base_url = "https://example.com/blog"
            "#,
        )
        .unwrap();

        assert_eq!(settings.site.front_controller, "index.php");
        assert_eq!(settings.site.template, "default");
        assert_eq!(settings.site.stylesheet(), "default");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.microsites.dir, PathBuf::from("./microsites/"));
        assert_eq!(settings.admin.path, "/admin/template-sets");
    }

    #[test]
    fn explicit_stylesheet_wins() {
        let settings: Settings = toml::from_str(
            r#"
            [site]
            base_url = "/"
            template = "parent"
            stylesheet = "child"

            [server]
            ip = "0.0.0.0"
            port = 9000
            "#,
        )
        .unwrap();

        assert_eq!(settings.site.template, "parent");
        assert_eq!(settings.site.stylesheet(), "child");
        assert_eq!(settings.server.ip.to_string(), "0.0.0.0");
    }

    #[test]
    fn base_url_is_required() {
        let res: Result<Settings, _> = toml::from_str("[site]\ntemplate = \"x\"\n");
        assert!(res.is_err());
    }
}
