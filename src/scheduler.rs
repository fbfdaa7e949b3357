//! Daily schedule of pipeline invocations.
//!
//! Every entry runs in its own task and fires once per day at its local
//! wall-clock time. Each firing spawns an independent delivery, so a slow or
//! failed delivery never delays or removes any entry.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local, NaiveTime, TimeZone, Timelike};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::content::ContentType;
use crate::dispatcher::{DeliveryOutcome, Dispatcher, Messenger, Trigger};
use crate::generator::{ImageModel, LanguageModel};
use crate::{Error, Result};

/// Longest single sleep; wall-clock changes are picked up at this granularity.
const MAX_TICK: Duration = Duration::from_secs(60);

/// A firing later than this after its slot is skipped instead of run.
const MISFIRE_GRACE: Duration = Duration::from_secs(300);

/// One scheduled post per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub content_type: ContentType,
    pub hour: u32,
    pub minute: u32,
}

impl ScheduleEntry {
    pub fn new(content_type: ContentType, hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(Error::InvalidSchedule(format!(
                "{} at {:02}:{:02} is not a valid time of day",
                content_type, hour, minute
            )));
        }
        Ok(Self {
            content_type,
            hour,
            minute,
        })
    }

    fn time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0)
    }

    /// First slot strictly after `after`, in `after`'s time zone.
    ///
    /// A slot that falls into a DST gap moves to the next day that has it.
    pub fn next_fire_after<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let tz = after.timezone();
        let time = self.time()?;
        let mut date = after.with_timezone(&tz).date_naive();

        for _ in 0..3 {
            if let Some(candidate) = tz.from_local_datetime(&date.and_time(time)).earliest() {
                if candidate > *after {
                    return Some(candidate);
                }
            }
            date = date.succ_opt()?;
        }
        None
    }
}

/// Reference schedule: vocabulary four times a day, one rule, idioms twice.
pub fn default_schedule() -> Vec<ScheduleEntry> {
    [
        (ContentType::Words, 9, 0),
        (ContentType::Rules, 9, 15),
        (ContentType::Words, 12, 0),
        (ContentType::Idioms, 13, 0),
        (ContentType::Words, 14, 0),
        (ContentType::Words, 16, 0),
        (ContentType::Idioms, 18, 0),
    ]
    .into_iter()
    .map(|(content_type, hour, minute)| ScheduleEntry {
        content_type,
        hour,
        minute,
    })
    .collect()
}

#[derive(Debug, Deserialize)]
struct ScheduleFile {
    entries: Vec<ScheduleFileEntry>,
}

#[derive(Debug, Deserialize)]
struct ScheduleFileEntry {
    content_type: ContentType,
    time: String,
}

/// Parse a YAML schedule:
///
/// ```yaml
/// entries:
///   - content_type: words
///     time: "09:00"
/// ```
pub fn parse_schedule(yaml: &str) -> Result<Vec<ScheduleEntry>> {
    let file: ScheduleFile = serde_yaml::from_str(yaml)?;
    if file.entries.is_empty() {
        return Err(Error::InvalidSchedule("schedule has no entries".to_string()));
    }

    file.entries
        .into_iter()
        .map(|entry| {
            let time = NaiveTime::parse_from_str(entry.time.trim(), "%H:%M").map_err(|e| {
                Error::InvalidSchedule(format!("bad time {:?}: {}", entry.time, e))
            })?;
            ScheduleEntry::new(entry.content_type, time.hour(), time.minute())
        })
        .collect()
}

pub fn load_schedule_file(path: &Path) -> Result<Vec<ScheduleEntry>> {
    let yaml = std::fs::read_to_string(path)?;
    parse_schedule(&yaml)
}

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// System local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Schedule table bound to a dispatcher, not yet running.
pub struct Scheduler<L, I, M, C = LocalClock> {
    entries: Vec<ScheduleEntry>,
    dispatcher: Arc<Dispatcher<L, I, M>>,
    clock: Arc<C>,
}

impl<L, I, M, C> Scheduler<L, I, M, C>
where
    L: LanguageModel + 'static,
    I: ImageModel + 'static,
    M: Messenger + 'static,
    C: Clock,
{
    pub fn new(entries: Vec<ScheduleEntry>, dispatcher: Arc<Dispatcher<L, I, M>>, clock: C) -> Self {
        Self {
            entries,
            dispatcher,
            clock: Arc::new(clock),
        }
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// Register every entry and start its timer loop.
    pub fn start(self) -> SchedulerHandle {
        let tasks = self
            .entries
            .iter()
            .map(|entry| {
                let entry = *entry;
                let dispatcher = Arc::clone(&self.dispatcher);
                let clock = Arc::clone(&self.clock);
                tokio::spawn(run_entry(entry, dispatcher, clock))
            })
            .collect::<Vec<_>>();

        info!(entries = tasks.len(), "Scheduler started");
        SchedulerHandle { tasks }
    }
}

/// Running scheduler. Dropping the handle leaves the tasks running.
pub struct SchedulerHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn shutdown(self) {
        for task in self.tasks {
            task.abort();
        }
    }
}

/// Spawn one scheduled delivery.
pub fn fire<L, I, M>(
    content_type: ContentType,
    dispatcher: Arc<Dispatcher<L, I, M>>,
) -> JoinHandle<DeliveryOutcome>
where
    L: LanguageModel + 'static,
    I: ImageModel + 'static,
    M: Messenger + 'static,
{
    tokio::spawn(async move { dispatcher.dispatch(content_type, Trigger::Scheduled).await })
}

async fn run_entry<L, I, M, C>(
    entry: ScheduleEntry,
    dispatcher: Arc<Dispatcher<L, I, M>>,
    clock: Arc<C>,
) where
    L: LanguageModel + 'static,
    I: ImageModel + 'static,
    M: Messenger + 'static,
    C: Clock,
{
    let mut after = clock.now();

    loop {
        let now = clock.now();
        // Recomputed every tick so offset changes (DST) are honoured.
        let Some(next) = entry.next_fire_after(&after.with_timezone(&now.timezone())) else {
            error!(content_type = %entry.content_type, hour = entry.hour, minute = entry.minute, "No next firing time, entry stopped");
            return;
        };

        if now < next {
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO).min(MAX_TICK);
            tokio::time::sleep(wait).await;
            continue;
        }

        let late = (now - next).to_std().unwrap_or(Duration::ZERO);
        if late <= MISFIRE_GRACE {
            info!(content_type = %entry.content_type, slot = %next, "Scheduled delivery firing");
            fire(entry.content_type, Arc::clone(&dispatcher));
        } else {
            warn!(content_type = %entry.content_type, slot = %next, "Missed scheduled slot, skipping");
        }
        after = if now > next { now } else { next };
    }
}
