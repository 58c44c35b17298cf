use std::sync::Arc;

use anyhow::{Context, bail};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use onboard_flow::config::AppConfig;
use onboard_flow::editor::FlowEditor;
use onboard_flow::error::WizardError;
use onboard_flow::fields::{FieldKind, FieldRegistry};
use onboard_flow::gateway::{HttpGateway, SubmissionGateway};
use onboard_flow::graph::GraphModel;
use onboard_flow::wizard::{self, PageSequencer, WizardStep};

const USAGE: &str = "usage: onboard-flow <seed|show|wizard|report>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let command = std::env::args().nth(1).unwrap_or_else(|| {
        eprintln!("{USAGE}");
        std::process::exit(2);
    });

    let config = AppConfig::from_env()?;
    let gateway: Arc<dyn SubmissionGateway> = Arc::new(HttpGateway::new(&config.gateway)?);

    eprintln!("onboard-flow v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {}", config.gateway.base_url);
    eprintln!("   Page order: {:?}\n", config.page_order);

    match command.as_str() {
        "seed" => seed(&config, gateway).await,
        "show" => show(gateway.as_ref()).await,
        "wizard" => run_wizard(&config, gateway).await,
        "report" => report(gateway.as_ref()).await,
        other => bail!("unknown command '{other}'\n{USAGE}"),
    }
}

/// Save the starter flow under the configured name.
async fn seed(config: &AppConfig, gateway: Arc<dyn SubmissionGateway>) -> anyhow::Result<()> {
    let editor = FlowEditor::with_graph(&config.configuration_name, GraphModel::starter(), gateway);
    editor.save().await.context("saving starter flow")?;
    println!(
        "Saved '{}' with {} pages",
        editor.name(),
        editor.graph().pages().len()
    );
    Ok(())
}

/// Print the stored flow, one page per line.
async fn show(gateway: &dyn SubmissionGateway) -> anyhow::Result<()> {
    let decoded = wizard::load_configuration(gateway).await?;
    println!("{}", decoded.name);
    for id in decoded.pages.page_ids() {
        let label = decoded.graph.page(id).map(|p| p.label.as_str()).unwrap_or(id);
        let components = decoded.pages.components(id).unwrap_or_default();
        println!("  {id} ({label}): {}", components.join(", "));
    }
    for transition in decoded.graph.transitions() {
        println!("  {} -> {}", transition.source, transition.target);
    }
    if !decoded.graph.is_acyclic() {
        println!("  (flow contains a cycle)");
    }
    Ok(())
}

/// Walk the stored flow interactively on stdin.
async fn run_wizard(config: &AppConfig, gateway: Arc<dyn SubmissionGateway>) -> anyhow::Result<()> {
    let sequencer = wizard::start_session(gateway, FieldRegistry::standard(), config.page_order)
        .await
        .context("starting wizard session")?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let WizardStep::Collecting(index) = sequencer.step() {
        eprintln!(
            "\n── Page {index} of {} ({}%) ──",
            sequencer.total_pages(),
            sequencer.progress()
        );
        if !collect_page(&sequencer, &mut lines).await? {
            sequencer.abandon("input closed")?;
            break;
        }

        match sequencer.advance().await {
            Ok(step) => tracing::debug!(%step, "Advanced"),
            Err(e @ WizardError::InvalidField { .. }) => eprintln!("{e}"),
            Err(WizardError::Gateway(e)) => {
                eprintln!("Submission failed: {e}");
                eprintln!("Press Enter to retry, or close input to quit.");
            }
            Err(e) => return Err(e.into()),
        }
    }

    match sequencer.step() {
        WizardStep::Completed => {
            let state = sequencer.state();
            let user = state.user_id.map(|id| id.to_string()).unwrap_or_default();
            println!("Onboarding complete for user {user}");
        }
        other => println!("Onboarding ended: {other}"),
    }
    Ok(())
}

/// Prompt for every field on the current page. Returns `false` on EOF.
async fn collect_page(
    sequencer: &PageSequencer,
    lines: &mut Lines<BufReader<Stdin>>,
) -> anyhow::Result<bool> {
    for field in sequencer.render_page()? {
        let current = sequencer.field(&field.name).unwrap_or_default();
        let hint = match field.kind {
            FieldKind::Date => " [YYYY-MM-DD]",
            FieldKind::Password => " [hidden]",
            _ => "",
        };
        let marker = if field.required { "*" } else { "" };
        if current.is_empty() || field.kind == FieldKind::Password {
            eprint!("{}{marker}{hint}: ", field.label);
        } else {
            eprint!("{}{marker}{hint} ({current}): ", field.label);
        }

        let Some(line) = lines.next_line().await? else {
            return Ok(false);
        };
        let line = line.trim();
        if !line.is_empty() {
            sequencer.set_field(&field.name, line)?;
        }
    }
    Ok(true)
}

/// Print every registered user.
async fn report(gateway: &dyn SubmissionGateway) -> anyhow::Result<()> {
    let users = gateway.list_users().await?;
    if users.is_empty() {
        println!("No users registered");
        return Ok(());
    }
    for user in users {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            user.id,
            user.email,
            user.birthdate.unwrap_or_default(),
            user.address.unwrap_or_default(),
            user.about.unwrap_or_default()
        );
    }
    Ok(())
}
