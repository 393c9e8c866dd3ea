pub mod commands;

use crate::config::ProviderConfig;
use crate::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crdhost")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Resolve build hosts provisioned through Kubernetes custom resources", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Path to a YAML provider config")]
    pub config: Option<PathBuf>,

    #[arg(
        short = 'n',
        long,
        global = true,
        help = "Namespace the provisioning controller writes host Secrets into"
    )]
    pub namespace: Option<String>,

    #[arg(long, global = true, help = "Platform served by this provider")]
    pub platform: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Config file (if any) with command-line overrides applied
    pub fn provider_config(&self) -> Result<ProviderConfig> {
        let base = match &self.config {
            Some(path) => ProviderConfig::load(path)?,
            None => ProviderConfig::default(),
        };
        base.with_overrides(self.platform.clone(), self.namespace.clone())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Compute the instance identifier for a TaskRun")]
    Launch {
        #[arg(help = "TaskRun ID as namespace:name")]
        task_run_id: String,

        #[arg(long, default_value = "", help = "Instance tag")]
        tag: String,
    },
    #[command(about = "Look up the current address of one or more instances")]
    Resolve {
        #[arg(required = true, help = "Instance identifiers")]
        instance_ids: Vec<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },
    #[command(about = "Poll until an instance has an address")]
    Wait {
        #[arg(help = "Instance identifier")]
        instance_id: String,

        #[arg(long, default_value_t = 5, help = "Seconds between lookups")]
        interval_secs: u64,

        #[arg(
            long,
            default_value_t = 60,
            value_parser = clap::value_parser!(u32).range(1..),
            help = "Give up after this many lookups"
        )]
        max_attempts: u32,

        #[arg(long, help = "Print lookup metrics when done")]
        print_metrics: bool,
    },
    #[command(about = "Report the provider's view of an instance state")]
    State {
        #[arg(help = "Instance identifier")]
        instance_id: String,
    },
    #[command(about = "Print the SSH login user for this provider")]
    SshUser,
    #[command(about = "List host Secrets published in the namespace")]
    List {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_resolve_many() {
        let cli = Cli::try_parse_from([
            "crdhost", "-n", "hosts", "resolve", "ns1:a", "ns1:b", "-o", "json",
        ])
        .expect("parse");

        assert_eq!(cli.namespace.as_deref(), Some("hosts"));
        match cli.command {
            Some(Commands::Resolve {
                instance_ids,
                output,
            }) => {
                assert_eq!(instance_ids, vec!["ns1:a", "ns1:b"]);
                assert_eq!(output, OutputFormat::Json);
            }
            _ => panic!("expected resolve"),
        }
    }

    #[test]
    fn test_wait_rejects_zero_attempts() {
        assert!(Cli::try_parse_from(["crdhost", "wait", "ns1:a", "--max-attempts", "0"]).is_err());
    }

    #[test]
    fn test_provider_config_applies_flags() {
        let cli = Cli::try_parse_from(["crdhost", "--platform", "linux/arm64", "ssh-user"])
            .expect("parse");
        let config = cli.provider_config().expect("config");
        assert_eq!(config.platform, "linux/arm64");
        assert_eq!(config.system_namespace, "multi-platform-controller");
    }
}
