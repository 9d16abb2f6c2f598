//! Tick Scheduler
//!
//! Single-threaded cooperative scheduler driven by the host tick. Every task
//! runs to completion inside `advance`; nothing is preempted. Tasks keep
//! running until they are cleared by handle or return [`TaskControl::Stop`],
//! so whoever starts an interval task owns cancelling it.

use std::fmt;

/// Handle returned by `run_timeout` / `run_interval`, used to cancel the task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Returned by a task to keep or drop its schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskControl {
    Continue,
    Stop,
}

type Task<W> = Box<dyn FnMut(&mut W) -> TaskControl>;

struct Scheduled<W> {
    handle: TaskHandle,
    due: u64,
    interval: Option<u64>,
    task: Task<W>,
}

pub struct Scheduler<W> {
    tick: u64,
    next_handle: u64,
    tasks: Vec<Scheduled<W>>,
}

impl<W> Scheduler<W> {
    pub fn new() -> Self {
        Self {
            tick: 0,
            next_handle: 1,
            tasks: Vec::new(),
        }
    }

    /// Monotonic tick counter
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Run once, `delay` ticks from now (at least one tick)
    pub fn run_timeout<F>(&mut self, delay: u64, f: F) -> TaskHandle
    where
        F: FnOnce(&mut W) + 'static,
    {
        let mut f = Some(f);
        self.push(
            delay,
            None,
            Box::new(move |world| {
                if let Some(f) = f.take() {
                    f(world);
                }
                TaskControl::Stop
            }),
        )
    }

    /// Run every `interval` ticks, first run `interval` ticks from now
    pub fn run_interval<F>(&mut self, interval: u64, f: F) -> TaskHandle
    where
        F: FnMut(&mut W) -> TaskControl + 'static,
    {
        let interval = interval.max(1);
        self.push(interval, Some(interval), Box::new(f))
    }

    /// Cancel a task. Returns false if it already finished or never existed.
    pub fn clear_run(&mut self, handle: TaskHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.handle != handle);
        self.tasks.len() != before
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().any(|t| t.handle == handle)
    }

    /// Number of live tasks
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Step one tick and run every due task in registration order
    pub fn advance(&mut self, world: &mut W) {
        self.tick += 1;
        let tick = self.tick;

        self.tasks.retain_mut(|scheduled| {
            if scheduled.due > tick {
                return true;
            }
            match ((scheduled.task)(world), scheduled.interval) {
                (TaskControl::Continue, Some(interval)) => {
                    scheduled.due = tick + interval;
                    true
                }
                _ => false,
            }
        });
    }

    fn push(&mut self, delay: u64, interval: Option<u64>, task: Task<W>) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        self.tasks.push(Scheduled {
            handle,
            due: self.tick + delay.max(1),
            interval,
            task,
        });
        handle
    }
}

impl<W> Default for Scheduler<W> {
    fn default() -> Self {
        Self::new()
    }
}
