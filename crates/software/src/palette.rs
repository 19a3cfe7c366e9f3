//! Reads the controller's 128 palette slots back one at a time and corrects any that differ from the host's
//! [`TargetPalette`].
//!
//! The device answers one "get palette entry" request with one report, and the host only ever has a single request
//! outstanding: each report triggers the request for the lowest slot not yet reported. Once every slot has been
//! reported (or given up on), mismatched slots are overwritten and, if anything was overwritten, the device is told to
//! reapply its palette.
//!
//! Requests that go unanswered are resent after [`REQUEST_TIMEOUT`], at most [`MAX_REQUEST_ATTEMPTS`] times in total,
//! after which the slot is abandoned so that one lost message cannot stall the whole exchange. Driving those timeouts is
//! up to the caller via [`PaletteSync::poll`].
//!
//! Corrections are remembered from one run to the next. A slot that comes back from the device still differing from
//! the color last pushed to it counts as a rejection; after more than [`MAX_RETRIES`] rejections of the same target
//! color the slot is left alone. Changing the target color, or the device finally reporting it, starts over.

mod reference;
pub use reference::*;

mod target;
pub use target::*;

use crate::{
    color::{ColorRecord, MAX_RETRIES, PaletteReport, Rgb},
    sysex::{MessageBuilder, SysexSink, VendorHeader, command},
};
use embassy_time::{Duration, Instant};
use wmidi::U7;

/// Number of palette slots on the device.
pub const PALETTE_SIZE: usize = 128;
/// How long to wait for a report before asking again.
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(500);
/// How many times a single slot is requested before it is abandoned.
pub const MAX_REQUEST_ATTEMPTS: u8 = 4;

/// Progress of a slot within the current synchronization run.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Resolution {
    Unresolved,
    Reported,
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Request {
    index: u8,
    attempts: u8,
    sent_at: Instant,
}

/// A color pushed to one slot, and how many runs in a row the device has since reported something else.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Correction {
    target: Rgb,
    rejections: u8,
}

impl Correction {
    fn is_exhausted(&self) -> bool {
        self.rejections > MAX_RETRIES
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Idle,
    Requesting(Request),
    Complete,
}

/// What a call into the [`PaletteSync`] accomplished.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncEvent {
    /// No run is in progress; reports are still recorded.
    Idle,
    /// A request is outstanding.
    Waiting,
    /// The outstanding request timed out and was sent again.
    Resent(U7),
    /// The outstanding request ran out of attempts; enumeration moved on without this slot.
    Abandoned(U7),
    /// Every slot has been accounted for and mismatches have been corrected.
    Completed {
        /// Number of "set palette entry" messages sent.
        corrections: usize,
        /// Mismatched slots left alone because the device kept rejecting the same correction.
        given_up: usize,
    },
}

/// Host-side mirror of the device's palette memory plus the request/response sequencing which fills it.
///
/// The mirror holds exactly what the device last reported, white channel included, and is cleared whenever a run
/// starts. Only the correction history outlives a run.
#[derive(Debug, Clone)]
pub struct PaletteSync {
    header: VendorHeader,
    target: TargetPalette,
    records: [Option<ColorRecord>; PALETTE_SIZE],
    resolutions: [Resolution; PALETTE_SIZE],
    corrections: [Option<Correction>; PALETTE_SIZE],
    state: State,
}

impl PaletteSync {
    /// Constructs a [`PaletteSync`] with every slot unknown.
    pub fn new(header: VendorHeader, target: TargetPalette) -> Self {
        Self {
            header,
            target,
            records: [None; PALETTE_SIZE],
            resolutions: [Resolution::Unresolved; PALETTE_SIZE],
            corrections: [None; PALETTE_SIZE],
            state: State::Idle,
        }
    }

    /// Replaces the palette that the next reconciliation aims for.
    pub fn set_target(&mut self, target: TargetPalette) {
        self.target = target;
    }

    /// The palette that reconciliation aims for.
    pub fn target(&self) -> &TargetPalette {
        &self.target
    }

    /// The last known contents of slot `index`, or `None` if the device has not reported it since the current run
    /// started.
    pub fn slot(&self, index: U7) -> Option<&ColorRecord> {
        self.records[usize::from(u8::from(index))].as_ref()
    }

    /// Returns `true` if slot `index` is no longer being corrected because the device kept rejecting its target color.
    pub fn is_given_up(&self, index: U7) -> bool {
        let i = usize::from(u8::from(index));
        self.corrections[i]
            .is_some_and(|correction| correction.target == self.target.entry(index) && correction.is_exhausted())
    }

    /// The slot currently being waited on, if any.
    pub fn outstanding(&self) -> Option<U7> {
        match self.state {
            State::Requesting(request) => Some(U7::from_u8_lossy(request.index)),
            _ => None,
        }
    }

    /// Returns `true` once a run has finished, until the next one starts.
    pub fn is_complete(&self) -> bool {
        self.state == State::Complete
    }

    /// Begins a run from slot 0 with every slot unknown.
    pub fn start<S: SysexSink>(&mut self, now: Instant, sink: &mut S) -> Result<(), S::Error> {
        info!("Starting palette synchronization");
        self.records = [None; PALETTE_SIZE];
        self.resolutions = [Resolution::Unresolved; PALETTE_SIZE];
        self.request(now, 0, 1, sink)
    }

    /// Stores a palette entry report as-is and, during a run, requests the next slot or finishes the run.
    pub fn handle_report<S: SysexSink>(
        &mut self,
        now: Instant,
        report: PaletteReport,
        sink: &mut S,
    ) -> Result<SyncEvent, S::Error> {
        let index = usize::from(u8::from(report.index));
        self.records[index] = Some(report.record);
        self.resolutions[index] = Resolution::Reported;
        trace!("Palette slot {} reported", index);

        match self.state {
            State::Requesting(request) => self.advance(now, Some(request.index), sink),
            _ => Ok(SyncEvent::Idle),
        }
    }

    /// Resends or abandons the outstanding request once it has waited [`REQUEST_TIMEOUT`].
    pub fn poll<S: SysexSink>(&mut self, now: Instant, sink: &mut S) -> Result<SyncEvent, S::Error> {
        let State::Requesting(request) = self.state else {
            return Ok(SyncEvent::Idle);
        };

        if now.saturating_duration_since(request.sent_at) < REQUEST_TIMEOUT {
            return Ok(SyncEvent::Waiting);
        }

        let index = U7::from_u8_lossy(request.index);
        if request.attempts < MAX_REQUEST_ATTEMPTS {
            debug!(
                "Palette slot {} timed out, resending (attempt {})",
                request.index,
                request.attempts + 1
            );
            self.request(now, request.index, request.attempts + 1, sink)?;
            return Ok(SyncEvent::Resent(index));
        }

        warn!(
            "Palette slot {} did not answer after {} attempts, skipping it",
            request.index, request.attempts
        );
        self.resolutions[usize::from(request.index)] = Resolution::Abandoned;
        self.advance(now, None, sink)?;
        Ok(SyncEvent::Abandoned(index))
    }

    /// Requests the lowest unresolved slot unless it is the one already outstanding; reconciles when none remain.
    fn advance<S: SysexSink>(
        &mut self,
        now: Instant,
        outstanding: Option<u8>,
        sink: &mut S,
    ) -> Result<SyncEvent, S::Error> {
        let next = self
            .resolutions
            .iter()
            .position(|&resolution| resolution == Resolution::Unresolved);

        match next {
            Some(next) if Some(next as u8) == outstanding => Ok(SyncEvent::Waiting),
            Some(next) => {
                self.request(now, next as u8, 1, sink)?;
                Ok(SyncEvent::Waiting)
            }
            None => self.reconcile(sink),
        }
    }

    /// Sends a request for slot `index`. The request counts as outstanding even if sending fails, so that a failed send
    /// is retried by [`poll`][Self::poll] like a lost one.
    fn request<S: SysexSink>(
        &mut self,
        now: Instant,
        index: u8,
        attempts: u8,
        sink: &mut S,
    ) -> Result<(), S::Error> {
        self.state = State::Requesting(Request {
            index,
            attempts,
            sent_at: now,
        });
        let message = MessageBuilder::new(&self.header, command::GET_PALETTE_ENTRY)
            .byte(index)
            .finish();
        sink.send(&message)
    }

    /// Overwrites every reported slot whose color differs from the target, keeping the device's white.
    ///
    /// The run is complete before anything is sent; corrections lost to a failed send are retried by the next run.
    fn reconcile<S: SysexSink>(&mut self, sink: &mut S) -> Result<SyncEvent, S::Error> {
        self.state = State::Complete;
        let mut corrections = 0;
        let mut given_up = 0;

        for (i, (record, correction)) in self.records.iter().zip(self.corrections.iter_mut()).enumerate() {
            if self.resolutions[i] != Resolution::Reported {
                continue;
            }
            let Some(record) = record else {
                continue;
            };
            let index = U7::from_u8_lossy(i as u8);
            let target = self.target.entry(index);
            if record.rgb() == target {
                *correction = None;
                continue;
            }

            match correction {
                Some(previous) if previous.target == target => {
                    previous.rejections = previous.rejections.saturating_add(1);
                    if previous.is_exhausted() {
                        warn!("Palette slot {} keeps reverting, no longer correcting it", i);
                        given_up += 1;
                        continue;
                    }
                    debug!(
                        "Palette slot {} rejected its correction {} times",
                        i, previous.rejections
                    );
                }
                _ => {
                    *correction = Some(Correction {
                        target,
                        rejections: 0,
                    })
                }
            }

            let update = ColorRecord::new(target, record.white());
            sink.send(&update.create_update_message(&self.header, index))?;
            corrections += 1;
        }

        if corrections > 0 {
            let reapply = MessageBuilder::new(&self.header, command::REAPPLY_PALETTE).finish();
            sink.send(&reapply)?;
        }

        info!(
            "Palette synchronization complete: {} corrected, {} given up",
            corrections, given_up
        );
        Ok(SyncEvent::Completed {
            corrections,
            given_up,
        })
    }
}
