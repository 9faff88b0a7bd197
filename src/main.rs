//! `prpay` CLI entrypoint for the pull request payout dashboard.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use async_trait::async_trait;
use ortho_config::OrthoConfig;
use prpay::{
    BackendUrl, BucketView, ChannelWalletProvider, ClaimOutcome, ContributorId, HttpPayoutGateway,
    IdentityResolver, NoopTelemetrySink, OperationMode, PayoutError, PayoutWorkflow, PrPayConfig,
    PullRequestSummary, SessionIdentityResolver, StaticIdentity, StderrJsonlTelemetrySink,
    TelemetrySink, WalletBinding, WalletConnection,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode, PayoutError> {
    let config = load_config()?;
    init_tracing(config.verbose);

    let base = BackendUrl::parse(&config.resolve_backend_url()?)?;
    tracing::debug!("using payout backend at {}", base.as_url());
    let gateway = HttpPayoutGateway::for_backend(base, config.backend_timeout())?;
    let identity = SessionIdentity::from_config(&config)?;

    let telemetry: Arc<dyn TelemetrySink> = if config.telemetry {
        Arc::new(StderrJsonlTelemetrySink)
    } else {
        Arc::new(NoopTelemetrySink)
    };

    let wallet = WalletBinding::with_telemetry(Arc::clone(&telemetry));
    let provider = ChannelWalletProvider::new(
        config
            .wallet_address
            .as_deref()
            .map_or_else(WalletConnection::disconnected, WalletConnection::connected),
    );
    wallet.attach_provider(&provider);

    let workflow = PayoutWorkflow::new(&identity, &gateway, &wallet).with_telemetry(telemetry);
    let result = match config.operation_mode() {
        OperationMode::Dashboard => {
            let kind = config.view_kind()?;
            match workflow.load(kind).await {
                Ok(view) => write_view(&view),
                Err(PayoutError::Unauthenticated) => {
                    write_line("Sign in to see your pull requests.").map(|()| ExitCode::FAILURE)
                }
                Err(error) => Err(error),
            }
        }
        OperationMode::Claim(pr_id) => workflow
            .claim(pr_id)
            .await
            .and_then(|outcome| write_claim(&outcome)),
    };

    wallet.end_session();
    result
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`PayoutError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<PrPayConfig, PayoutError> {
    PrPayConfig::load().map_err(|error| PayoutError::Configuration {
        message: error.to_string(),
    })
}

/// Logs go to stderr; `RUST_LOG` overrides the verbosity flag.
fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Identity source chosen from configuration.
enum SessionIdentity {
    Fixed(StaticIdentity),
    Session(SessionIdentityResolver),
}

impl SessionIdentity {
    fn from_config(config: &PrPayConfig) -> Result<Self, PayoutError> {
        if let Some(id) = config.contributor_id.as_deref() {
            return Ok(Self::Fixed(StaticIdentity::signed_in(ContributorId::new(id)?)));
        }

        match config.session_lookup()? {
            Some((auth_url, api_key)) => Ok(Self::Session(SessionIdentityResolver::new(
                auth_url,
                api_key,
                config.access_token.clone(),
                config.backend_timeout(),
            )?)),
            None => Ok(Self::Fixed(StaticIdentity::signed_out())),
        }
    }
}

#[async_trait]
impl IdentityResolver for SessionIdentity {
    async fn resolve(&self) -> Result<Option<ContributorId>, PayoutError> {
        match self {
            Self::Fixed(identity) => identity.resolve().await,
            Self::Session(resolver) => resolver.resolve().await,
        }
    }
}

fn write_view(view: &BucketView) -> Result<ExitCode, PayoutError> {
    let mut stdout = io::stdout().lock();
    let mut output = format!("Pull requests for contributor {}\n", view.contributor().as_str());

    for bucket in view.buckets() {
        output.push_str(&format!("\n{}:\n", bucket.status));
        match &bucket.outcome {
            Ok(prs) if prs.is_empty() => output.push_str("  (none)\n"),
            Ok(prs) => {
                for pr in prs {
                    output.push_str(&format_summary(pr));
                }
            }
            Err(error) => output.push_str(&format!("  failed to load: {error}\n")),
        }
    }

    write!(stdout, "{output}").map_err(|error| PayoutError::Io {
        message: error.to_string(),
    })?;

    Ok(if view.is_complete() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn format_summary(pr: &PullRequestSummary) -> String {
    let payout = pr
        .payout
        .map_or_else(|| "no payout".to_owned(), |amount| amount.to_string());
    format!(
        "  #{} {} ({payout}, opened {})\n    {}\n",
        pr.id,
        pr.title,
        pr.created_at.format("%Y-%m-%d"),
        pr.url
    )
}

fn write_claim(outcome: &ClaimOutcome) -> Result<ExitCode, PayoutError> {
    let verdict = if outcome.success {
        "Claim accepted"
    } else {
        "Claim declined"
    };
    let status = outcome
        .status
        .as_deref()
        .map_or_else(String::new, |status| format!(" [{status}]"));
    write_line(&format!("{verdict}{status}: {}", outcome.message))?;

    Ok(if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn write_line(message: &str) -> Result<(), PayoutError> {
    writeln!(io::stdout().lock(), "{message}").map_err(|error| PayoutError::Io {
        message: error.to_string(),
    })
}
