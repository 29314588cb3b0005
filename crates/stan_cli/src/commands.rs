use anyhow::bail;
use cli::args::{EntityArg, MaxLabware};
use crux_core::Core;
use itertools::Itertools;
use labware::Barcode;
use serde::Serialize;
use stan_app::entities::{Comment, DestructionReason, Equipment, ReleaseDestination, Species};
use stan_app::entity_manager::{EntityManager, EntityManagerEvent, EntityManagerViewModel, ManagedEntity};
use stan_app::form::{FormEvent, FormMachine, FormState, FormViewModel, Mutation};
use stan_app::labware_scan::{self, LabwareScan, LabwareScanViewModel, ScanState};
use stan_app::mutations::{Destroy, DestroyRequest, Extract, ExtractRequest, Release, ReleaseRequest};
use stan_app::validation::FieldError;
use tracing::{info, warn};

use crate::client::StanCoreClient;
use crate::core::Shell;
use crate::opts::{AdminAction, StanCommand};
use crate::session::{ClipboardProvider, SessionStore};

/// Why a command's final view counts as a failure, if it does.
trait Outcome {
    fn failure(&self) -> Option<String>;
}

fn describe(validation_errors: &[FieldError]) -> String {
    validation_errors
        .iter()
        .map(|error| format!("{}: {}", error.field, error.message))
        .join(", ")
}

impl<Req, Res> Outcome for FormViewModel<Req, Res> {
    fn failure(&self) -> Option<String> {
        if let Some((_, message)) = &self.error {
            return Some(message.clone());
        }
        if !self.validation_errors.is_empty() {
            return Some(format!("Invalid request. {}", describe(&self.validation_errors)));
        }
        self.server_error
            .as_ref()
            .map(|error| error.to_string())
    }
}

impl<E> Outcome for EntityManagerViewModel<E> {
    fn failure(&self) -> Option<String> {
        if let Some((_, message)) = &self.error {
            return Some(message.clone());
        }
        if !self.validation_errors.is_empty() {
            return Some(format!("Invalid value. {}", describe(&self.validation_errors)));
        }
        self.server_error
            .as_ref()
            .map(|error| error.to_string())
    }
}

/// Print the view as JSON on stdout, then fail if the view reports a failure.
fn finish<V: Serialize + Outcome>(view: &V) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(view)?);

    if let Some(failure) = view.failure() {
        bail!(failure)
    }
    Ok(())
}

pub(crate) async fn run<C, S, P>(mut shell: Shell<C, S, P>, command: StanCommand) -> anyhow::Result<()>
where
    C: StanCoreClient,
    S: SessionStore,
    P: ClipboardProvider,
{
    match command {
        StanCommand::Scan {
            barcodes,
            max,
            awaiting_storage,
        } => {
            let (view, failures) = scan(&mut shell, barcodes, max, awaiting_storage).await?;
            println!("{}", serde_json::to_string_pretty(&view)?);

            if let Some((_, message)) = view.error {
                bail!(message)
            }
            if !failures.is_empty() {
                bail!("Unable to scan labware. {}", failures.join(", "))
            }
            Ok(())
        }
        StanCommand::Destroy {
            barcodes,
            reason_id,
            work_number,
        } => finish(
            &submit::<Destroy, _, _, _>(
                &mut shell,
                DestroyRequest {
                    barcodes,
                    reason_id,
                    work_number,
                },
                false,
            )
            .await?,
        ),
        StanCommand::Release {
            barcodes,
            destination,
            recipient,
            work_number,
        } => finish(
            &submit::<Release, _, _, _>(
                &mut shell,
                ReleaseRequest {
                    barcodes,
                    destination,
                    recipient,
                    work_number,
                },
                false,
            )
            .await?,
        ),
        StanCommand::Extract {
            barcodes,
            labware_type,
            work_number,
            store,
        } => finish(
            &submit::<Extract, _, _, _>(
                &mut shell,
                ExtractRequest {
                    barcodes,
                    labware_type,
                    work_number,
                },
                store,
            )
            .await?,
        ),
        StanCommand::Admin {
            entity,
            action,
        } => match entity {
            EntityArg::DestructionReason => finish(&admin::<DestructionReason, _, _, _>(&mut shell, action).await?),
            EntityArg::Species => finish(&admin::<Species, _, _, _>(&mut shell, action).await?),
            EntityArg::ReleaseDestination => finish(&admin::<ReleaseDestination, _, _, _>(&mut shell, action).await?),
            EntityArg::Comment => finish(&admin::<Comment, _, _, _>(&mut shell, action).await?),
            EntityArg::Equipment => finish(&admin::<Equipment, _, _, _>(&mut shell, action).await?),
        },
    }
}

/// Scan each barcode in turn, returning the final view and the errors seen on the way.
async fn scan<C, S, P>(
    shell: &mut Shell<C, S, P>,
    barcodes: Vec<Barcode>,
    max: Option<MaxLabware>,
    awaiting_storage: bool,
) -> anyhow::Result<(LabwareScanViewModel, Vec<String>)>
where
    C: StanCoreClient,
    S: SessionStore,
    P: ClipboardProvider,
{
    let core = Core::<LabwareScan>::new();
    let mut failures = vec![];

    if awaiting_storage {
        shell
            .update(&core, labware_scan::Event::LoadAwaitingStorage)
            .await?;
    }

    let max_reached = |count: usize| max.is_some_and(|max| max.is_reached(count));

    if max_reached(core.view().labwares.len()) {
        lock(shell, &core).await?;
    }

    for barcode in barcodes {
        let scanned = core.view().labwares.len();

        shell
            .update(&core, labware_scan::Event::UpdateCurrentBarcode(barcode.to_string()))
            .await?;
        shell
            .update(&core, labware_scan::Event::SubmitBarcode)
            .await?;

        let view = core.view();
        if view.state == ScanState::Locked && view.labwares.len() == scanned {
            warn!("Scanner locked, barcode not scanned. barcode: {}", barcode);
            failures.push(format!("\"{}\" not scanned, the scanner is locked", barcode));
            continue;
        }
        if view.state.matches("idle.error") {
            if let Some(message) = view.error_message {
                failures.push(message);
            }
        }

        if view.state != ScanState::Locked && max_reached(view.labwares.len()) {
            lock(shell, &core).await?;
        }
    }

    Ok((core.view(), failures))
}

async fn lock<C, S, P>(shell: &mut Shell<C, S, P>, core: &Core<LabwareScan>) -> anyhow::Result<()>
where
    C: StanCoreClient,
    S: SessionStore,
    P: ClipboardProvider,
{
    info!("Maximum labware reached, locking.");
    shell
        .update(core, labware_scan::Event::Lock)
        .await
}

async fn submit<M, C, S, P>(
    shell: &mut Shell<C, S, P>,
    request: M::Request,
    store: bool,
) -> anyhow::Result<FormViewModel<M::Request, M::Response>>
where
    M: Mutation,
    C: StanCoreClient,
    S: SessionStore,
    P: ClipboardProvider,
{
    let core = Core::<FormMachine<M>>::new();

    shell
        .update(&core, FormEvent::SubmitForm(request))
        .await?;

    if store && core.view().state == FormState::Submitted {
        shell
            .update(&core, FormEvent::AwaitStorage)
            .await?;
    }

    Ok(core.view())
}

async fn admin<E, C, S, P>(shell: &mut Shell<C, S, P>, action: AdminAction) -> anyhow::Result<EntityManagerViewModel<E>>
where
    E: ManagedEntity,
    C: StanCoreClient,
    S: SessionStore,
    P: ClipboardProvider,
{
    let core = Core::<EntityManager<E>>::new();

    let list = E::list();
    let entities: Vec<E> = shell
        .query(&list)
        .await
        .decode(&list.root_field)?;
    shell
        .update(&core, EntityManagerEvent::SetEntities(entities))
        .await?;

    let events = match action {
        AdminAction::List => vec![],
        AdminAction::Add {
            value,
            extra,
        } => vec![EntityManagerEvent::DraftNewEntity, EntityManagerEvent::CreateNewEntity {
            value,
            extra_property: extra,
        }],
        AdminAction::Enable {
            key,
        } => vec![EntityManagerEvent::ValueChanged {
            key,
            enabled: true,
        }],
        AdminAction::Disable {
            key,
        } => vec![EntityManagerEvent::ValueChanged {
            key,
            enabled: false,
        }],
        AdminAction::SetExtra {
            key,
            value,
        } => vec![EntityManagerEvent::ExtraPropertyChanged {
            key,
            value: Some(value),
        }],
    };

    for event in events {
        shell.update(&core, event).await?;
    }

    Ok(core.view())
}
