//! Invocation lifecycle: correlation ids, started/finished notifications and
//! follow-up refreshes.

use crate::{
    DEFAULT_BUCKET, CommandRunner, ExtractMode, FavoriteBucket, Record, Result, ScoopError,
    ScoopPaths, extract, sanitize,
};
use chrono::{DateTime, Utc};
use scoopdeck_types::{CommandKind, CorrelationId, Notification, ScoopRequest};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, trace};

/// Capacity of the notification broadcast channel.
const NOTIFICATION_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InvocationPhase {
    Idle,
    Started,
    Running,
    Finished { success: bool },
}

/// One command run, from `started` until `finished` has been published.
#[derive(Debug)]
struct CommandInvocation {
    id: CorrelationId,
    request: ScoopRequest,
    started_at: DateTime<Utc>,
    phase: InvocationPhase,
}

impl CommandInvocation {
    fn new(request: ScoopRequest) -> Self {
        Self {
            id: CorrelationId::new(),
            request,
            started_at: Utc::now(),
            phase: InvocationPhase::Idle,
        }
    }

    fn advance(&mut self, phase: InvocationPhase) {
        trace!(
            target: "scoopdeck::correlator",
            "Invocation {} ({}): {:?} -> {:?}",
            self.id, self.request.kind(), self.phase, phase
        );
        self.phase = phase;
    }

    fn item(&self) -> Option<String> {
        self.request.item().map(str::to_string)
    }
}

/// Process arguments and output mode for one request.
#[derive(Debug)]
struct CommandPlan {
    args: Vec<String>,
    mode: Option<ExtractMode>,
}

/// Strip path and wildcard characters from every user-supplied name.
fn sanitize_request(request: ScoopRequest) -> ScoopRequest {
    match request {
        ScoopRequest::UpdateApp { name } => ScoopRequest::UpdateApp { name: sanitize(&name) },
        ScoopRequest::UninstallApp { name } => ScoopRequest::UninstallApp { name: sanitize(&name) },
        ScoopRequest::Checkver { bucket } => ScoopRequest::Checkver { bucket: sanitize(&bucket) },
        other => other,
    }
}

/// Requests triggered once an invocation of `kind` has finished.
fn follow_ups(kind: CommandKind) -> Vec<ScoopRequest> {
    match kind {
        CommandKind::UpdateApp => vec![ScoopRequest::List, ScoopRequest::Status],
        CommandKind::Update
        | CommandKind::UpdateAll
        | CommandKind::UninstallApp
        | CommandKind::Checkver => vec![ScoopRequest::Status],
        CommandKind::List | CommandKind::Status | CommandKind::BucketList => Vec::new(),
    }
}

/// Turns requests into correlated command invocations.
pub struct Correlator {
    runner: CommandRunner,
    paths: ScoopPaths,
    favorite: FavoriteBucket,
    notify_tx: broadcast::Sender<Notification>,
    follow_up_tx: mpsc::UnboundedSender<ScoopRequest>,
}

impl Correlator {
    pub fn new(
        paths: ScoopPaths,
        favorite: FavoriteBucket,
        notify_tx: broadcast::Sender<Notification>,
        follow_up_tx: mpsc::UnboundedSender<ScoopRequest>,
    ) -> Self {
        Self {
            runner: CommandRunner::new(&paths.interpreter),
            paths,
            favorite,
            notify_tx,
            follow_up_tx,
        }
    }

    /// Start an invocation for `request` and return its correlation id.
    ///
    /// `started` is published before the process is spawned; records,
    /// `finished` and follow-up requests are produced by a background task.
    /// The only error is a failure to persist the favorite bucket for
    /// `checkver`, in which case nothing is started.
    pub fn begin(&mut self, request: ScoopRequest) -> Result<CorrelationId> {
        let mut invocation = CommandInvocation::new(sanitize_request(request));
        let id = invocation.id;

        if let ScoopRequest::Checkver { bucket } = &invocation.request {
            self.favorite.set(bucket)?;
        }

        info!(
            target: "scoopdeck::correlator",
            "{} started ({}){}",
            invocation.request.kind(),
            id,
            invocation.item().map(|i| format!(" for {}", i)).unwrap_or_default()
        );
        invocation.advance(InvocationPhase::Started);
        self.publish(Notification::Started {
            command: invocation.request.kind(),
            correlation_id: id,
            item: invocation.item(),
        });

        let plan = self.plan(&invocation.request);
        let task = InvocationTask {
            runner: self.runner.clone(),
            notify_tx: self.notify_tx.clone(),
            follow_up_tx: self.follow_up_tx.clone(),
            favorite: self.favorite.get().map(str::to_string),
        };
        tokio::spawn(task.run(invocation, plan));

        Ok(id)
    }

    fn plan(&self, request: &ScoopRequest) -> CommandPlan {
        let scoop = self.paths.scoop_script().to_string_lossy().into_owned();
        let scoop_args = |rest: &[&str]| {
            std::iter::once(scoop.clone())
                .chain(rest.iter().map(|s| s.to_string()))
                .collect::<Vec<_>>()
        };

        match request {
            ScoopRequest::List => CommandPlan {
                args: scoop_args(&["list"]),
                mode: Some(ExtractMode::List),
            },
            ScoopRequest::Status => CommandPlan {
                args: scoop_args(&["status"]),
                mode: Some(ExtractMode::Status),
            },
            ScoopRequest::BucketList => CommandPlan {
                args: scoop_args(&["bucket", "list"]),
                mode: Some(ExtractMode::Bucket),
            },
            ScoopRequest::Update => CommandPlan {
                args: scoop_args(&["update"]),
                mode: None,
            },
            ScoopRequest::UpdateApp { name } => CommandPlan {
                args: scoop_args(&["update", name.as_str()]),
                mode: None,
            },
            ScoopRequest::UpdateAll => CommandPlan {
                args: scoop_args(&["update", "*"]),
                mode: None,
            },
            ScoopRequest::UninstallApp { name } => CommandPlan {
                args: scoop_args(&["uninstall", name.as_str()]),
                mode: None,
            },
            ScoopRequest::Checkver { bucket } => CommandPlan {
                args: vec![
                    self.paths.checkver_script().to_string_lossy().into_owned(),
                    "*".to_string(),
                    self.paths.bucket_dir(bucket).to_string_lossy().into_owned(),
                    "-u".to_string(),
                ],
                mode: None,
            },
        }
    }

    fn publish(&self, notification: Notification) {
        // no subscribers is not an error
        let _ = self.notify_tx.send(notification);
    }
}

/// Everything a background invocation needs after `begin` returns.
struct InvocationTask {
    runner: CommandRunner,
    notify_tx: broadcast::Sender<Notification>,
    follow_up_tx: mpsc::UnboundedSender<ScoopRequest>,
    favorite: Option<String>,
}

impl InvocationTask {
    fn is_favorite(&self, bucket: &str) -> bool {
        self.favorite.as_deref() == Some(bucket)
    }

    async fn run(self, mut invocation: CommandInvocation, plan: CommandPlan) {
        let kind = invocation.request.kind();

        if kind == CommandKind::BucketList {
            let _ = self.notify_tx.send(Notification::BucketEntry {
                name: DEFAULT_BUCKET.to_string(),
                is_favorite: self.is_favorite(DEFAULT_BUCKET),
            });
        }

        invocation.advance(InvocationPhase::Running);

        let console_tx = self.notify_tx.clone();
        let mut on_console = move |chunk: &str| {
            let _ = console_tx.send(Notification::ConsoleLog {
                text: chunk.to_string(),
            });
        };

        let outcome = match plan.mode {
            Some(mode) => {
                let mut on_line = |line: &str| {
                    let notification = match extract(line, mode) {
                        Some(Record::App(entry)) => Notification::AppEntry(entry),
                        Some(Record::Bucket(name)) => Notification::BucketEntry {
                            is_favorite: self.is_favorite(&name),
                            name,
                        },
                        None => return,
                    };
                    let _ = self.notify_tx.send(notification);
                };
                self.runner
                    .run(
                        &plan.args,
                        Some(&mut on_line as &mut (dyn FnMut(&str) + Send)),
                        &mut on_console,
                    )
                    .await
            }
            None => self.runner.run(&plan.args, None, &mut on_console).await,
        };

        let success = outcome.success();
        invocation.advance(InvocationPhase::Finished { success });

        let elapsed = Utc::now() - invocation.started_at;
        info!(
            target: "scoopdeck::correlator",
            "{} {} ({}) after {}ms, exit code {:?}",
            kind,
            if success { "finished" } else { "failed" },
            invocation.id,
            elapsed.num_milliseconds(),
            outcome.exit_code
        );

        let _ = self.notify_tx.send(Notification::Finished {
            command: kind,
            correlation_id: invocation.id,
            success,
            item: invocation.item(),
        });

        if let ScoopRequest::UninstallApp { name } = &invocation.request {
            if success {
                let _ = self.notify_tx.send(Notification::AppEntryRemoved { name: name.clone() });
            }
        }

        for request in follow_ups(kind) {
            debug!(target: "scoopdeck::correlator", "{} triggers {}", kind, request.kind());
            if self.follow_up_tx.send(request).is_err() {
                debug!(target: "scoopdeck::correlator", "Dispatcher gone, dropping follow-up");
            }
        }
    }
}

/// Cloneable entry point for submitting requests and observing notifications.
#[derive(Clone)]
pub struct DispatchHandle {
    requests_tx: mpsc::UnboundedSender<ScoopRequest>,
    notify_tx: broadcast::Sender<Notification>,
}

impl DispatchHandle {
    /// Queue a request for the dispatcher.
    pub fn submit(&self, request: ScoopRequest) -> Result<()> {
        self.requests_tx
            .send(request)
            .map_err(|_| ScoopError::ChannelSendError)
    }

    /// Subscribe to notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notify_tx.subscribe()
    }
}

/// Single consumer of the request queue.
///
/// Client requests and follow-ups share one queue, so invocations are begun
/// strictly one at a time and the favorite bucket is only touched here.
pub struct Dispatcher {
    correlator: Correlator,
    requests_rx: mpsc::UnboundedReceiver<ScoopRequest>,
    handle: DispatchHandle,
}

impl Dispatcher {
    pub fn new(paths: ScoopPaths, favorite: FavoriteBucket) -> Self {
        let (requests_tx, requests_rx) = mpsc::unbounded_channel();
        let (notify_tx, _) = broadcast::channel(NOTIFICATION_CAPACITY);

        let correlator = Correlator::new(paths, favorite, notify_tx.clone(), requests_tx.clone());

        Self {
            correlator,
            requests_rx,
            handle: DispatchHandle {
                requests_tx,
                notify_tx,
            },
        }
    }

    pub fn handle(&self) -> DispatchHandle {
        self.handle.clone()
    }

    /// Begin queued requests until the queue closes.
    ///
    /// Returns the first favorite-bucket persistence error; the caller is
    /// expected to treat it as fatal.
    pub async fn run(mut self) -> Result<()> {
        while let Some(request) = self.requests_rx.recv().await {
            let id = self.correlator.begin(request)?;
            debug!(target: "scoopdeck::correlator", "Dispatched invocation {}", id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_request_only_touches_names() {
        assert_eq!(
            sanitize_request(ScoopRequest::UpdateApp { name: "my/app".into() }),
            ScoopRequest::UpdateApp { name: "myapp".into() }
        );
        assert_eq!(
            sanitize_request(ScoopRequest::Checkver { bucket: r"..\extras".into() }),
            ScoopRequest::Checkver { bucket: "..extras".into() }
        );
        assert_eq!(sanitize_request(ScoopRequest::UpdateAll), ScoopRequest::UpdateAll);
    }

    #[test]
    fn test_follow_up_policy() {
        assert_eq!(
            follow_ups(CommandKind::UpdateApp),
            vec![ScoopRequest::List, ScoopRequest::Status]
        );
        for kind in [
            CommandKind::Update,
            CommandKind::UpdateAll,
            CommandKind::UninstallApp,
            CommandKind::Checkver,
        ] {
            assert_eq!(follow_ups(kind), vec![ScoopRequest::Status]);
        }
        assert!(follow_ups(CommandKind::List).is_empty());
        assert!(follow_ups(CommandKind::BucketList).is_empty());
    }

    #[test]
    fn test_command_plans() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let favorite = FavoriteBucket::restore(crate::FavoriteStore::in_dir(temp_dir.path())).unwrap();
        let (notify_tx, _) = broadcast::channel(4);
        let (follow_up_tx, _follow_up_rx) = mpsc::unbounded_channel();
        let correlator = Correlator::new(
            ScoopPaths::new("pwsh", "/scoop"),
            favorite,
            notify_tx,
            follow_up_tx,
        );

        let plan = correlator.plan(&ScoopRequest::Checkver { bucket: "extras".into() });
        assert!(plan.args[0].ends_with("checkver.ps1"));
        assert_eq!(plan.args[1], "*");
        assert!(plan.args[2].ends_with("extras"));
        assert_eq!(plan.args[3], "-u");
        assert_eq!(plan.mode, None);

        let plan = correlator.plan(&ScoopRequest::UpdateAll);
        assert!(plan.args[0].ends_with("scoop.ps1"));
        assert_eq!(plan.args[1..], ["update", "*"]);

        let plan = correlator.plan(&ScoopRequest::BucketList);
        assert_eq!(plan.args[1..], ["bucket", "list"]);
        assert_eq!(plan.mode, Some(ExtractMode::Bucket));
    }

    #[test]
    fn test_invocation_phases() {
        let mut invocation = CommandInvocation::new(ScoopRequest::List);
        assert_eq!(invocation.phase, InvocationPhase::Idle);
        invocation.advance(InvocationPhase::Started);
        invocation.advance(InvocationPhase::Running);
        invocation.advance(InvocationPhase::Finished { success: false });
        assert_eq!(invocation.phase, InvocationPhase::Finished { success: false });
    }
}
