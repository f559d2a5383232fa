use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;
use std::io;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 集合存放位置与新记录 id 的生成方式
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_products_file")]
    pub products_file: String,
    #[serde(default = "default_carts_file")]
    pub carts_file: String,
    #[serde(default)]
    pub id_policy: IdPolicyKind,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: default_data_dir(),
            products_file: default_products_file(),
            carts_file: default_carts_file(),
            id_policy: IdPolicyKind::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// `data_dir` 下每个集合一个 JSON 文件
    #[default]
    File,
    /// 进程内集合，退出即丢失
    Memory,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IdPolicyKind {
    #[default]
    Sequential,
    Timestamp,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

fn default_data_dir() -> String { "data".into() }
fn default_products_file() -> String { "products.json".into() }
fn default_carts_file() -> String { "carts.json".into() }

/// 读取 `.env` 与 `CONFIG_PATH`（默认 `config.toml`）指向的配置文件
pub fn load_default() -> Result<AppConfig> {
    dotenvy::dotenv().ok();
    load_from_file(&config_path())
}

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

fn is_missing_file(err: &anyhow::Error) -> bool {
    err.downcast_ref::<io::Error>().is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
}

impl AppConfig {
    /// 加载配置并应用环境变量覆盖；文件不存在时使用默认值，格式错误则报错
    pub fn load_and_validate() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::load_and_validate_from(&config_path())
    }

    pub fn load_and_validate_from(path: &str) -> Result<Self> {
        let mut cfg = match load_from_file(path) {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => AppConfig::default(),
            Err(e) => return Err(e.context(format!("invalid config file {path}"))),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.storage.apply_env_overrides()?;
        self.storage.normalize();
        self.storage.validate()?;
        Ok(())
    }
}

impl StorageConfig {
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// 按 `DATA_DIR` / `STORAGE_BACKEND` / `ID_POLICY` 覆盖配置，未知取值直接拒绝
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(dir) = lookup("DATA_DIR") {
            self.data_dir = dir;
        }
        if let Some(b) = lookup("STORAGE_BACKEND") {
            self.backend = match b.trim().to_ascii_lowercase().as_str() {
                "file" => StorageBackend::File,
                "memory" => StorageBackend::Memory,
                other => return Err(anyhow!("STORAGE_BACKEND must be file or memory, got {other}")),
            };
        }
        if let Some(p) = lookup("ID_POLICY") {
            self.id_policy = match p.trim().to_ascii_lowercase().as_str() {
                "sequential" => IdPolicyKind::Sequential,
                "timestamp" => IdPolicyKind::Timestamp,
                other => return Err(anyhow!("ID_POLICY must be sequential or timestamp, got {other}")),
            };
        }
        Ok(())
    }

    fn normalize(&mut self) {
        if self.data_dir.trim().is_empty() {
            self.data_dir = default_data_dir();
        }
        self.products_file = self.products_file.trim().to_string();
        self.carts_file = self.carts_file.trim().to_string();
    }

    pub fn validate(&self) -> Result<()> {
        if self.products_file.is_empty() || self.carts_file.is_empty() {
            return Err(anyhow!("storage.products_file and storage.carts_file must not be empty"));
        }
        plain_file_name("products_file", &self.products_file)?;
        plain_file_name("carts_file", &self.carts_file)?;
        // 大小写不敏感的文件系统上 `Products.json` 与 `products.json` 是同一文件
        if self.products_file.eq_ignore_ascii_case(&self.carts_file) || self.products_path() == self.carts_path() {
            return Err(anyhow!("products and carts cannot share one location: {}", self.products_path().display()));
        }
        Ok(())
    }

    pub fn products_path(&self) -> PathBuf { PathBuf::from(&self.data_dir).join(&self.products_file) }

    pub fn carts_path(&self) -> PathBuf { PathBuf::from(&self.data_dir).join(&self.carts_file) }
}

// 集合文件必须直接位于 data_dir 下
fn plain_file_name(field: &str, name: &str) -> Result<()> {
    let mut parts = Path::new(name).components();
    match (parts.next(), parts.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(()),
        _ => Err(anyhow!("storage.{field} must be a plain file name, got {name:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.storage.backend, StorageBackend::File);
        assert_eq!(cfg.storage.id_policy, IdPolicyKind::Sequential);
        assert_eq!(cfg.logging.format, LogFormat::Compact);
        assert_eq!(cfg.storage.products_path(), PathBuf::from("data").join("products.json"));
        assert_eq!(cfg.storage.carts_path(), PathBuf::from("data").join("carts.json"));
    }

    #[test]
    fn parses_full_document() {
        let cfg = parse(
            r#"
            [storage]
            backend = "memory"
            data_dir = "/tmp/shop"
            products_file = "productos.json"
            carts_file = "carrito.json"
            id_policy = "timestamp"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.storage.backend, StorageBackend::Memory);
        assert_eq!(cfg.storage.id_policy, IdPolicyKind::Timestamp);
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(cfg.storage.carts_path(), PathBuf::from("/tmp/shop/carrito.json"));
    }

    #[test]
    fn rejects_unknown_backend() {
        assert!(parse("[storage]\nbackend = \"mongo\"").is_err());
    }

    #[test]
    fn validate_rejects_shared_location() {
        let mut storage = StorageConfig::default();
        storage.carts_file = storage.products_file.clone();
        assert!(storage.validate().is_err());
    }

    #[test]
    fn normalize_trims_and_fills_data_dir() {
        let mut storage = StorageConfig {
            data_dir: "  ".into(),
            products_file: " p.json ".into(),
            ..StorageConfig::default()
        };
        storage.normalize();
        assert_eq!(storage.data_dir, "data");
        assert_eq!(storage.products_file, "p.json");
        assert!(storage.validate().is_ok());

        storage.products_file = String::new();
        assert!(storage.validate().is_err());
    }

    fn write_config(tag: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("configs_{tag}_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn validate_rejects_aliased_and_nested_file_names() {
        for carts_file in ["./products.json", "../data/products.json", "sub/carts.json", "..", "Products.json"] {
            let storage = StorageConfig { carts_file: carts_file.into(), ..StorageConfig::default() };
            assert!(storage.validate().is_err(), "{carts_file} should be rejected");
        }

        let mut storage = StorageConfig { carts_file: "./products.json".into(), ..StorageConfig::default() };
        storage.normalize();
        assert!(storage.validate().is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("configs_absent_{}", std::process::id())).join("config.toml");
        let cfg = AppConfig::load_and_validate_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.storage.products_file, "products.json");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = write_config("malformed", "[storage]\nbackend = \"mongo\"\ndata_dir = \"/srv/shop\"\n");
        let err = AppConfig::load_and_validate_from(path.to_str().unwrap()).unwrap_err();
        assert!(format!("{err:#}").contains("invalid config file"));

        std::fs::write(&path, "[storage\n").unwrap();
        assert!(AppConfig::load_and_validate_from(path.to_str().unwrap()).is_err());

        std::fs::write(&path, "[storage]\ndata_dir = \"/srv/shop\"\n").unwrap();
        let cfg = AppConfig::load_and_validate_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.storage.data_dir, "/srv/shop");

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn overrides_replace_configured_values() {
        let mut storage = StorageConfig::default();
        storage
            .apply_overrides(|key| match key {
                "DATA_DIR" => Some("/var/shop".into()),
                "STORAGE_BACKEND" => Some(" Memory ".into()),
                "ID_POLICY" => Some("timestamp".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(storage.data_dir, "/var/shop");
        assert_eq!(storage.backend, StorageBackend::Memory);
        assert_eq!(storage.id_policy, IdPolicyKind::Timestamp);

        // 未设置的变量保持原值
        let mut untouched = StorageConfig::default();
        untouched.apply_overrides(|_| None).unwrap();
        assert_eq!(untouched.data_dir, "data");
        assert_eq!(untouched.backend, StorageBackend::File);
        assert_eq!(untouched.id_policy, IdPolicyKind::Sequential);
    }

    #[test]
    fn overrides_reject_unknown_values() {
        let mut storage = StorageConfig::default();
        let err = storage.apply_overrides(|key| (key == "STORAGE_BACKEND").then(|| "mongo".to_string()));
        assert!(err.is_err());
        assert_eq!(storage.backend, StorageBackend::File);

        let err = storage.apply_overrides(|key| (key == "ID_POLICY").then(|| "uuid".to_string()));
        assert!(err.is_err());
        assert_eq!(storage.id_policy, IdPolicyKind::Sequential);
    }
}
