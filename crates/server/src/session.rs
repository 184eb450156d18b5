// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Wizard sessions.
//!
//! Each session is an actor task that exclusively owns its `Wizard`. Client
//! requests and geo check outcomes arrive on channels and are applied one at
//! a time, so every transition is serialized through the owner. Geo checks
//! run as separate tasks that only report back; the actor aborts a check as
//! soon as its run is superseded, and the reducer refuses any stale result
//! that still slips through.

use crate::collaborators::{CollaboratorError, DeclarationBackend, StoredDeclaration};
use crate::config::SessionSettings;
use crate::geo_check::{GeoCheck, GeoOutcome, spawn_check};
use crate::live::{LiveEvent, LiveEventBroadcaster};
use eudr_declare::{
    Command, CoreError, GeoEffect, SubmissionPayload, TransitionResult, Wizard, apply,
};
use eudr_declare_api::{
    ApiError, CommandRequest, GeoFileRequest, SubmitResponse, advance, apply_request,
    build_submission, retreat, select_geo_file,
};
use eudr_declare_domain::{DomainError, GeoPolicy, GeoValidationState};
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Errors returned to callers of a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The wizard refused the request.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The persistence service did not store the submission. The draft is kept.
    #[error("Submission failed: {0}")]
    Submission(#[source] CollaboratorError),
    /// The session has been closed.
    #[error("Session {0} is closed")]
    Closed(String),
}

type Reply<T> = oneshot::Sender<Result<T, SessionError>>;

enum SessionMessage {
    Snapshot { reply: oneshot::Sender<Wizard> },
    Edit { request: CommandRequest, reply: Reply<Wizard> },
    SelectGeoFile { request: GeoFileRequest, reply: Reply<Wizard> },
    Advance { reply: Reply<Wizard> },
    Retreat { reply: Reply<Wizard> },
    Submit { reply: Reply<SubmitResponse> },
    Close { reply: oneshot::Sender<()> },
}

/// Cloneable handle to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: String,
    tx: mpsc::UnboundedSender<SessionMessage>,
}

impl std::fmt::Debug for SessionMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name: &str = match self {
            Self::Snapshot { .. } => "Snapshot",
            Self::Edit { .. } => "Edit",
            Self::SelectGeoFile { .. } => "SelectGeoFile",
            Self::Advance { .. } => "Advance",
            Self::Retreat { .. } => "Retreat",
            Self::Submit { .. } => "Submit",
            Self::Close { .. } => "Close",
        };
        f.write_str(name)
    }
}

impl SessionHandle {
    /// The session id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    async fn call<T>(
        &self,
        message: impl FnOnce(Reply<T>) -> SessionMessage,
    ) -> Result<T, SessionError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(message(reply))
            .map_err(|_| SessionError::Closed(self.id.clone()))?;
        response
            .await
            .map_err(|_| SessionError::Closed(self.id.clone()))?
    }

    /// Returns a copy of the current wizard.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the session has ended.
    pub async fn snapshot(&self) -> Result<Wizard, SessionError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(SessionMessage::Snapshot { reply })
            .map_err(|_| SessionError::Closed(self.id.clone()))?;
        response
            .await
            .map_err(|_| SessionError::Closed(self.id.clone()))
    }

    /// Applies a draft edit.
    ///
    /// # Errors
    ///
    /// Returns an error if the wizard refuses the edit or the session has ended.
    pub async fn edit(&self, request: CommandRequest) -> Result<Wizard, SessionError> {
        self.call(|reply| SessionMessage::Edit { request, reply })
            .await
    }

    /// Selects the geospatial file and starts its checks.
    ///
    /// # Errors
    ///
    /// Returns an error if the file fails the pre-checks or the session has ended.
    pub async fn select_geo_file(&self, request: GeoFileRequest) -> Result<Wizard, SessionError> {
        self.call(|reply| SessionMessage::SelectGeoFile { request, reply })
            .await
    }

    /// Leaves the current step forward.
    ///
    /// # Errors
    ///
    /// Returns an error if the step gate refuses or the session has ended.
    pub async fn advance(&self) -> Result<Wizard, SessionError> {
        self.call(|reply| SessionMessage::Advance { reply }).await
    }

    /// Goes back one step.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the session has ended.
    pub async fn retreat(&self) -> Result<Wizard, SessionError> {
        self.call(|reply| SessionMessage::Retreat { reply }).await
    }

    /// Submits the declaration. On success the session starts over.
    ///
    /// # Errors
    ///
    /// Returns an error if submission is blocked, the service refuses it, or
    /// the session has ended.
    pub async fn submit(&self) -> Result<SubmitResponse, SessionError> {
        self.call(|reply| SessionMessage::Submit { reply }).await
    }

    /// Returns true once the session actor has stopped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Stops the session, aborting any running check.
    pub async fn close(&self) {
        let (reply, response) = oneshot::channel();
        if self.tx.send(SessionMessage::Close { reply }).is_ok() {
            let _ = response.await;
        }
    }
}

/// Geo pipeline position used to detect changes worth announcing.
fn geo_marker(geo: &GeoValidationState) -> (&'static str, Option<u64>) {
    (geo.name(), geo.current_run().map(|run| run.value()))
}

struct SessionActor<B: DeclarationBackend> {
    id: String,
    wizard: Wizard,
    backend: Arc<B>,
    policy: Arc<dyn GeoPolicy>,
    settings: SessionSettings,
    live: LiveEventBroadcaster,
    outcomes: mpsc::UnboundedSender<GeoOutcome>,
    check: Option<JoinHandle<()>>,
}

impl<B: DeclarationBackend> SessionActor<B> {
    async fn run(
        mut self,
        mut messages: mpsc::UnboundedReceiver<SessionMessage>,
        mut outcomes: mpsc::UnboundedReceiver<GeoOutcome>,
    ) {
        info!(session_id = %self.id, "Session started");
        let idle_timeout: Duration = self.settings.idle_timeout;
        let idle = tokio::time::sleep(idle_timeout);
        tokio::pin!(idle);
        loop {
            tokio::select! {
                message = messages.recv() => {
                    let Some(message) = message else {
                        break;
                    };
                    idle.as_mut().reset(Instant::now() + idle_timeout);
                    if self.handle(message).await.is_break() {
                        break;
                    }
                }
                Some(outcome) = outcomes.recv() => {
                    self.resolve(outcome);
                }
                () = &mut idle => {
                    info!(
                        session_id = %self.id,
                        idle_secs = idle_timeout.as_secs(),
                        "Session idle, closing"
                    );
                    self.live.broadcast(&LiveEvent::SessionClosed {
                        session_id: self.id.clone(),
                    });
                    break;
                }
            }
        }
        self.abort_check();
        info!(session_id = %self.id, "Session ended");
    }

    async fn handle(&mut self, message: SessionMessage) -> ControlFlow<()> {
        match message {
            SessionMessage::Snapshot { reply } => {
                let _ = reply.send(self.wizard.clone());
            }
            SessionMessage::Edit { request, reply } => {
                let result: Result<TransitionResult, ApiError> =
                    apply_request(&self.wizard, request);
                let _ = reply.send(self.commit_result(result));
            }
            SessionMessage::SelectGeoFile { request, reply } => {
                let result: Result<TransitionResult, ApiError> =
                    select_geo_file(&self.wizard, request);
                let _ = reply.send(self.commit_result(result));
            }
            SessionMessage::Advance { reply } => {
                let result: Result<TransitionResult, ApiError> = advance(&self.wizard);
                let _ = reply.send(self.commit_result(result));
            }
            SessionMessage::Retreat { reply } => {
                let result: Result<TransitionResult, ApiError> = retreat(&self.wizard);
                let _ = reply.send(self.commit_result(result));
            }
            SessionMessage::Submit { reply } => {
                let _ = reply.send(self.submit().await);
            }
            SessionMessage::Close { reply } => {
                self.abort_check();
                self.live.broadcast(&LiveEvent::SessionClosed {
                    session_id: self.id.clone(),
                });
                let _ = reply.send(());
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn commit_result(
        &mut self,
        result: Result<TransitionResult, ApiError>,
    ) -> Result<Wizard, SessionError> {
        match result {
            Ok(transition) => {
                self.commit(transition);
                Ok(self.wizard.clone())
            }
            Err(err) => {
                debug!(session_id = %self.id, error = %err, "Request refused");
                Err(SessionError::Api(err))
            }
        }
    }

    /// Installs a new wizard and carries out its geo effect, chaining any
    /// follow-up transition the effect produces.
    fn commit(&mut self, transition: TransitionResult) {
        let step_before: u8 = self.wizard.step_index();
        let mut pending: Option<TransitionResult> = Some(transition);

        while let Some(TransitionResult { new_state, effect }) = pending.take() {
            let geo_before: (&'static str, Option<u64>) = geo_marker(&self.wizard.draft().geo);
            self.wizard = new_state;
            if geo_marker(&self.wizard.draft().geo) != geo_before {
                self.announce_geo();
            }

            pending = match effect {
                Some(GeoEffect::BeginGeometry { run }) => {
                    self.abort_check();
                    match apply(&self.wizard, Command::BeginGeometryCheck { run }) {
                        Ok(next) => Some(next),
                        Err(err) => {
                            warn!(
                                session_id = %self.id,
                                %run,
                                error = %err,
                                "Could not start geometry check"
                            );
                            None
                        }
                    }
                }
                Some(GeoEffect::ScheduleCheck {
                    run,
                    phase,
                    declaration_type,
                    file,
                }) => {
                    self.abort_check();
                    debug!(session_id = %self.id, %run, %phase, "Scheduling geo check");
                    self.check = Some(spawn_check(
                        Arc::clone(&self.policy),
                        self.settings.timings,
                        GeoCheck {
                            run,
                            phase,
                            declaration_type,
                            file,
                        },
                        self.outcomes.clone(),
                    ));
                    None
                }
                Some(GeoEffect::Cancel) => {
                    self.abort_check();
                    None
                }
                None => None,
            };
        }

        if self.wizard.step_index() != step_before {
            info!(session_id = %self.id, step = self.wizard.step_index(), "Step changed");
            self.live.broadcast(&LiveEvent::StepChanged {
                session_id: self.id.clone(),
                step_index: self.wizard.step_index(),
                step: self.wizard.current_step(),
            });
        }
    }

    fn resolve(&mut self, outcome: GeoOutcome) {
        let command: Command = Command::ResolveGeoPhase {
            run: outcome.run,
            phase: outcome.phase,
            verdict: outcome.verdict,
        };
        match apply(&self.wizard, command) {
            Ok(transition) => {
                self.check = None;
                info!(
                    session_id = %self.id,
                    run = %outcome.run,
                    phase = %outcome.phase,
                    verdict = ?outcome.verdict,
                    "Geo phase resolved"
                );
                self.commit(transition);
            }
            Err(CoreError::DomainViolation(
                DomainError::StaleGeoResult { .. } | DomainError::UnexpectedGeoPhase { .. },
            )) => {
                debug!(session_id = %self.id, run = %outcome.run, "Discarding stale geo result");
            }
            Err(err) => {
                warn!(session_id = %self.id, error = %err, "Geo result refused");
            }
        }
    }

    async fn submit(&mut self) -> Result<SubmitResponse, SessionError> {
        let payload: SubmissionPayload = build_submission(&self.wizard)?;

        let stored: StoredDeclaration = match self.backend.submit(&payload).await {
            Ok(stored) => stored,
            Err(err) => {
                warn!(
                    session_id = %self.id,
                    error = %err,
                    retryable = err.is_retryable(),
                    "Submission failed, draft kept"
                );
                return Err(SessionError::Submission(err));
            }
        };

        info!(
            session_id = %self.id,
            declaration_id = %stored.id,
            status = %payload.status,
            filing_eligible = payload.status.is_filing_eligible(),
            "Declaration submitted"
        );
        self.live.broadcast(&LiveEvent::Submitted {
            session_id: self.id.clone(),
            declaration_id: stored.id.clone(),
            status: payload.status,
        });

        let reset: Result<TransitionResult, CoreError> = apply(&self.wizard, Command::Reset);
        match reset {
            Ok(transition) => self.commit(transition),
            Err(err) => warn!(session_id = %self.id, error = %err, "Could not reset after submit"),
        }

        Ok(SubmitResponse {
            declaration_id: stored.id,
            status: payload.status,
        })
    }

    fn announce_geo(&self) {
        let geo: &GeoValidationState = &self.wizard.draft().geo;
        debug!(session_id = %self.id, state = geo.name(), "Geo state changed");
        self.live.broadcast(&LiveEvent::GeoStateChanged {
            session_id: self.id.clone(),
            state: geo.name(),
            run: geo.current_run().map(|run| run.value()),
            file_name: geo.file().map(|file| file.name.clone()),
        });
    }

    fn abort_check(&mut self) {
        if let Some(check) = self.check.take() {
            check.abort();
        }
    }
}

/// Starts a session actor around `wizard`.
pub fn spawn_session<B: DeclarationBackend>(
    id: String,
    wizard: Wizard,
    backend: Arc<B>,
    policy: Arc<dyn GeoPolicy>,
    settings: SessionSettings,
    live: LiveEventBroadcaster,
) -> SessionHandle {
    let (tx, messages) = mpsc::unbounded_channel();
    let (outcomes_tx, outcomes) = mpsc::unbounded_channel();
    let actor: SessionActor<B> = SessionActor {
        id: id.clone(),
        wizard,
        backend,
        policy,
        settings,
        live,
        outcomes: outcomes_tx,
        check: None,
    };
    tokio::spawn(actor.run(messages, outcomes));
    SessionHandle { id, tx }
}

fn prune_closed(sessions: &mut HashMap<String, SessionHandle>) {
    sessions.retain(|id, handle| {
        let open: bool = !handle.is_closed();
        if !open {
            debug!(session_id = %id, "Dropping ended session");
        }
        open
    });
}

/// All open sessions, keyed by id.
pub struct SessionRegistry<B: DeclarationBackend> {
    sessions: Arc<Mutex<HashMap<String, SessionHandle>>>,
    backend: Arc<B>,
    policy: Arc<dyn GeoPolicy>,
    settings: SessionSettings,
    live: LiveEventBroadcaster,
}

impl<B: DeclarationBackend> Clone for SessionRegistry<B> {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
            backend: Arc::clone(&self.backend),
            policy: Arc::clone(&self.policy),
            settings: self.settings,
            live: self.live.clone(),
        }
    }
}

impl<B: DeclarationBackend> SessionRegistry<B> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(
        backend: Arc<B>,
        policy: Arc<dyn GeoPolicy>,
        settings: SessionSettings,
        live: LiveEventBroadcaster,
    ) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            backend,
            policy,
            settings,
            live,
        }
    }

    /// Opens a new session on step 1. Sessions that ended on their own are
    /// dropped from the registry first.
    pub async fn create(&self) -> SessionHandle {
        let id: String = format!("{:016x}", rand::random::<u64>());
        let handle: SessionHandle = spawn_session(
            id.clone(),
            Wizard::new(self.settings.limits),
            Arc::clone(&self.backend),
            Arc::clone(&self.policy),
            self.settings,
            self.live.clone(),
        );
        let mut sessions = self.sessions.lock().await;
        prune_closed(&mut sessions);
        sessions.insert(id, handle.clone());
        handle
    }

    /// Looks up an open session.
    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        let mut sessions = self.sessions.lock().await;
        prune_closed(&mut sessions);
        sessions.get(id).cloned()
    }

    /// Closes and forgets a session. Returns false if it was not open.
    pub async fn close(&self, id: &str) -> bool {
        let handle: Option<SessionHandle> = {
            let mut sessions = self.sessions.lock().await;
            prune_closed(&mut sessions);
            sessions.remove(id)
        };
        match handle {
            Some(handle) => {
                handle.close().await;
                true
            }
            None => false,
        }
    }

    /// The persistence service client.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The live event broadcaster.
    #[must_use]
    pub const fn live(&self) -> &LiveEventBroadcaster {
        &self.live
    }
}
