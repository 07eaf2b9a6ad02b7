use brain_tumor::ConfigResult;
use brain_tumor_harness::evaluate::{DEFAULT_BUCKET, DEFAULT_PUBLIC_BASE_URL};
use brain_tumor_harness::{HarnessSettings, StorageSettings};
use clap::{Args, Parser, Subcommand};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://0.0.0.0:8000";

#[derive(Debug, Parser)]
#[command(name = "accuracy-test", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Measure prediction accuracy against the labeled image bucket
    Run(RunArgs),
    /// Print the label of a classification code
    Label {
        #[arg(allow_negative_numbers = true)]
        code: i64,
    },
    /// Check that the application configuration is complete
    Config,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long, env = "BUCKET_NAME", default_value = DEFAULT_BUCKET)]
    pub bucket: String,

    /// S3 compatible endpoint, e.g. a Cloudflare R2 account endpoint
    #[arg(long, env = "STORAGE_ENDPOINT")]
    pub storage_endpoint: Option<String>,

    #[arg(long, env = "STORAGE_REGION", default_value = "auto")]
    pub region: String,

    #[arg(long, env = "ACCESS_KEY_ID")]
    pub access_key_id: Option<String>,

    #[arg(long, env = "SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_access_key: Option<String>,

    #[arg(long)]
    pub path_style: bool,

    #[arg(long, env = "PUBLIC_BASE_URL", default_value = DEFAULT_PUBLIC_BASE_URL)]
    pub public_base_url: String,

    /// Base URL of the prediction service
    #[arg(long, env = "PREDICTION_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    #[arg(long, env = "BATCH_SIZE", default_value_t = 10)]
    pub batch_size: usize,

    /// Per-request timeout; requests wait indefinitely when unset
    #[arg(long, env = "REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    #[arg(long)]
    pub skip_health_check: bool,

    /// Print the full report as JSON instead of the accuracy line
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    pub fn settings(&self) -> ConfigResult<HarnessSettings> {
        HarnessSettings {
            bucket: self.bucket.clone(),
            public_base_url: self.public_base_url.clone(),
            check_health: !self.skip_health_check,
            ..HarnessSettings::default()
        }
        .with_batch_size(self.batch_size)
    }

    pub fn storage(&self) -> StorageSettings {
        StorageSettings {
            endpoint: self.storage_endpoint.clone(),
            region: self.region.clone(),
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            force_path_style: self.path_style,
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_tumor::ConfigError;

    fn run_args(args: &[&str]) -> RunArgs {
        let cli = Cli::try_parse_from(["accuracy-test", "run"].iter().chain(args)).unwrap();
        match cli.command {
            Command::Run(args) => args,
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn flags_build_settings() {
        let args = run_args(&[
            "--bucket",
            "samples",
            "--public-base-url",
            "https://cdn.test/",
            "--batch-size",
            "4",
            "--skip-health-check",
            "--request-timeout-secs",
            "30",
        ]);

        let settings = args.settings().unwrap();
        assert_eq!(settings.bucket, "samples");
        assert_eq!(settings.public_base_url, "https://cdn.test/");
        assert_eq!(settings.batch_size.get(), 4);
        assert!(!settings.check_health);
        assert_eq!(args.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn storage_settings_carry_credentials() {
        let args = run_args(&[
            "--storage-endpoint",
            "https://account.r2.cloudflarestorage.com",
            "--access-key-id",
            "key",
            "--secret-access-key",
            "secret",
            "--path-style",
        ]);

        let storage = args.storage();
        assert_eq!(
            storage.endpoint.as_deref(),
            Some("https://account.r2.cloudflarestorage.com")
        );
        assert_eq!(storage.access_key_id.as_deref(), Some("key"));
        assert_eq!(storage.secret_access_key.as_deref(), Some("secret"));
        assert!(storage.force_path_style);
    }

    #[test]
    fn zero_batch_size_is_a_config_error() {
        let args = run_args(&["--batch-size", "0"]);
        assert!(matches!(args.settings(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn label_accepts_negative_codes() {
        let cli = Cli::try_parse_from(["accuracy-test", "label", "-1"]).unwrap();
        assert!(matches!(cli.command, Command::Label { code: -1 }));
    }
}
