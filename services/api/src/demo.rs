use crate::infra::{InMemorySessionStore, ScriptedCollaborator};
use clap::Args;
use credit_desk::bureaus::agencies::AGENCY_DIRECTORY;
use credit_desk::bureaus::catalog::sample_accounts;
use credit_desk::bureaus::Bureau;
use credit_desk::disputes::comparator::{
    Comparator, ComparatorConfig, CrossBureauState, TradelineComparison, NO_DATA,
};
use credit_desk::disputes::service::DisputeWizardService;
use credit_desk::disputes::wizard::DisputeRound;
use credit_desk::error::AppError;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Account to walk through the dispute wizard (defaults to the first
    /// tradeline in the catalog)
    #[arg(long)]
    pub(crate) account: Option<String>,
    /// Widen the balance tolerance band (whole dollars, defaults to 0)
    #[arg(long)]
    pub(crate) balance_tolerance: Option<u32>,
    /// Skip the wizard walkthrough and only print comparator reports
    #[arg(long)]
    pub(crate) skip_wizard: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        account,
        balance_tolerance,
        skip_wizard,
    } = args;

    let accounts = sample_accounts();
    let account_id = account.unwrap_or_else(|| accounts[0].id.clone());
    let comparator_config = ComparatorConfig {
        balance_tolerance: balance_tolerance.unwrap_or_default(),
    };

    println!("Credit desk demo");
    println!(
        "Catalog: {} tradelines | balance tolerance ${}",
        accounts.len(),
        comparator_config.balance_tolerance
    );

    let comparator = Comparator::new(comparator_config);
    for account in &accounts {
        render_comparison(&comparator.assess(account));
    }

    println!("\nReporting agency directory");
    for agency in AGENCY_DIRECTORY {
        println!(
            "- {} ({:?}): freeze at {}",
            agency.name, agency.tier, agency.freeze_url
        );
    }

    if skip_wizard {
        return Ok(());
    }

    println!("\nDispute wizard walkthrough for {account_id} (scripted collaborator)");
    let service = Arc::new(DisputeWizardService::new(
        Arc::new(InMemorySessionStore::default()),
        Arc::new(ScriptedCollaborator),
        accounts,
        comparator_config,
        Duration::from_secs(5),
    ));

    let (view, ticket) = match service.open_session(&account_id) {
        Ok(opened) => opened,
        Err(err) => {
            println!("  Could not open a session: {err}");
            return Ok(());
        }
    };
    let session_id = view.session_id.clone();
    println!("- Opened session {} on step {}", session_id.0, view.step);

    service.run_analysis(ticket).await;
    let view = service.session(&session_id)?;
    println!(
        "- Analysis resolved:\n  {}",
        view.analysis.as_deref().unwrap_or("(none)")
    );

    let view = service.proceed(&session_id)?;
    println!("- Proceeded to step {}", view.step);

    let (_, ticket) = service.request_letter(&session_id, Some(DisputeRound::Round1Creditor))?;
    service.run_letter(ticket).await;
    let view = service.session(&session_id)?;
    println!(
        "- Drafted {} letter on step {}:\n{}",
        view.round,
        view.step,
        indent(view.letter.as_deref().unwrap_or("(none)"))
    );

    let view = service.edit_strategy(&session_id)?;
    println!("- Edited strategy, back to step {}", view.step);

    let (_, ticket) = service.request_letter(&session_id, Some(DisputeRound::Round2Bureau))?;
    service.run_letter(ticket).await;
    let view = service.session(&session_id)?;
    println!(
        "- Regenerated as {} letter:\n{}",
        view.round,
        indent(view.letter.as_deref().unwrap_or("(none)"))
    );

    service.close_session(&session_id)?;
    println!("- Session closed");

    Ok(())
}

fn render_comparison(report: &TradelineComparison) {
    println!("\n{} ({})", report.creditor_name, report.account_id);
    match &report.state {
        CrossBureauState::Consistent => println!("  State: consistent across all bureaus"),
        CrossBureauState::Inconsistent(fields) => {
            let labels: Vec<&str> = fields.iter().map(|field| field.label()).collect();
            println!("  State: inconsistent on {}", labels.join(", "));
        }
        CrossBureauState::Incomplete(bureaus) => {
            let labels: Vec<&str> = bureaus.iter().map(|bureau| bureau.label()).collect();
            println!("  State: incomplete, no snapshot from {}", labels.join(", "));
        }
    }

    for comparison in &report.fields {
        let cells: Vec<String> = Bureau::ALL
            .iter()
            .map(|bureau| {
                let value = comparison
                    .values
                    .get(bureau)
                    .and_then(|value| value.as_deref())
                    .unwrap_or(NO_DATA);
                let marker = if comparison.outliers.contains(bureau) {
                    "*"
                } else {
                    ""
                };
                format!("{}={}{}", bureau.label(), value, marker)
            })
            .collect();
        println!("  {}: {}", comparison.field.label(), cells.join(" | "));
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("    {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
