use std::{env, net::SocketAddr, time::Duration};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_name: String,
    pub bind_addr: SocketAddr,
    pub camera_device: String,
    pub camera_input_format: String,
    pub scan_endpoint: String,
    pub scan_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let app_name = env::var("APP_NAME").unwrap_or_else(|_| "FrameScan".to_owned());
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_owned())
            .parse()?;

        let camera_device = env::var("CAMERA_DEVICE").unwrap_or_else(|_| "/dev/video0".to_owned());
        let camera_input_format =
            env::var("CAMERA_INPUT_FORMAT").unwrap_or_else(|_| "mjpeg".to_owned());

        let scan_endpoint =
            env::var("SCAN_ENDPOINT").unwrap_or_else(|_| "http://127.0.0.1:8000/scan".to_owned());
        let scan_timeout_seconds = env::var("SCAN_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        Ok(Self {
            app_name,
            bind_addr,
            camera_device,
            camera_input_format,
            scan_endpoint,
            scan_timeout: Duration::from_secs(scan_timeout_seconds),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Mutex, OnceLock},
        time::Duration,
    };

    use super::AppConfig;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .expect("failed to lock env mutex")
    }

    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    #[test]
    fn from_env_falls_back_to_defaults() {
        let _guard = lock_env();
        for key in ["SCAN_ENDPOINT", "SCAN_TIMEOUT_SECONDS", "CAMERA_DEVICE"] {
            remove_env(key);
        }
        set_env("BIND_ADDR", "127.0.0.1:8080");

        let config = AppConfig::from_env().expect("config should parse");
        assert_eq!(config.scan_endpoint, "http://127.0.0.1:8000/scan");
        assert_eq!(config.scan_timeout, Duration::from_secs(30));
        assert_eq!(config.camera_device, "/dev/video0");
    }

    #[test]
    fn from_env_reads_scan_settings_from_environment() {
        let _guard = lock_env();
        set_env("BIND_ADDR", "127.0.0.1:8080");
        set_env("SCAN_ENDPOINT", "http://scan.example/v1/scan");
        set_env("SCAN_TIMEOUT_SECONDS", "5");

        let config = AppConfig::from_env().expect("config should parse");
        assert_eq!(config.scan_endpoint, "http://scan.example/v1/scan");
        assert_eq!(config.scan_timeout, Duration::from_secs(5));

        remove_env("SCAN_ENDPOINT");
        remove_env("SCAN_TIMEOUT_SECONDS");
    }

    #[test]
    fn from_env_rejects_malformed_bind_addr() {
        let _guard = lock_env();
        set_env("BIND_ADDR", "not-an-address");

        assert!(AppConfig::from_env().is_err());

        set_env("BIND_ADDR", "127.0.0.1:8080");
    }
}
