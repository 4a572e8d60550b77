use crate::{
    hooks::TaskHooks,
    obs::sink::{self, MetricsEvent},
    runtime::{self, ResponseSink, TaskOutcome, TaskResponse, WorkItem},
    settings::WorkerSettings,
    task::{Task, TaskDecoder},
    worker::{DocumentWorker, WorkerError},
};
use tracing::debug;

///
/// TaskProcessor
///
/// Runs one work item through hooks and a [`DocumentWorker`].
///

#[derive(Clone, Copy)]
pub struct TaskProcessor<'a> {
    settings: &'a WorkerSettings,
    decoder: &'a dyn TaskDecoder,
}

impl<'a> TaskProcessor<'a> {
    #[must_use]
    pub const fn new(settings: &'a WorkerSettings, decoder: &'a dyn TaskDecoder) -> Self {
        Self { settings, decoder }
    }

    pub fn process(
        &self,
        item: WorkItem,
        sink: &mut dyn ResponseSink,
        hooks: &mut dyn TaskHooks,
        worker: &mut dyn DocumentWorker,
    ) -> TaskOutcome {
        let mut task = match Task::from_item(item, self.decoder) {
            Ok(task) => task,
            Err(rejection) => return rejection.dispose(sink),
        };
        sink::record(MetricsEvent::TaskStart { kind: task.kind() });

        let response = match self.run(&mut task, hooks, worker) {
            Ok(()) => task.complete(self.settings),
            Err(WorkerError::Transient(message)) => TaskResponse::retry(&message),
            Err(WorkerError::Interrupted) => {
                debug!(item = %task.item().id, "task interrupted");
                return TaskOutcome::Unanswered(task.into_item());
            }
            Err(WorkerError::Failed(err)) => task.general_failure(&*err, self.settings),
        };

        Self::answer(sink, task, response)
    }

    /// Answer a message that has exceeded its delivery attempts without
    /// running the worker.
    pub fn handle_poison_message(
        &self,
        item: WorkItem,
        sink: &mut dyn ResponseSink,
        worker_friendly_name: &str,
    ) -> TaskOutcome {
        let mut task = match Task::from_item(item, self.decoder) {
            Ok(task) => task,
            Err(rejection) => return rejection.dispose(sink),
        };
        let response = task.poisoned(worker_friendly_name, self.settings);

        Self::answer(sink, task, response)
    }

    fn run(
        &self,
        task: &mut Task,
        hooks: &mut dyn TaskHooks,
        worker: &mut dyn DocumentWorker,
    ) -> Result<(), WorkerError> {
        hooks.prepare(task)?;

        for id in task.candidates(self.settings.process_subdocuments_separately) {
            let mut document = task.view_mut().document_mut(id);
            if document.is_deleted() {
                continue;
            }

            let admission = hooks.before_admit(&mut document)?;
            if admission.is_admitted() {
                worker.process_document(&mut document)?;
            } else {
                sink::record(MetricsEvent::DocumentCancelled);
            }
            hooks.after_admit(&mut document, admission)?;
        }

        hooks.after_task(task)?;

        Ok(())
    }

    fn answer(sink: &mut dyn ResponseSink, task: Task, response: TaskResponse) -> TaskOutcome {
        let status = response.status;
        runtime::deliver(sink, task.into_item(), response);

        TaskOutcome::Responded(status)
    }
}
