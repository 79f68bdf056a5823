use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    error::{Result, SynthError},
    graph::OperatorId,
    note::Note,
};

/// What to do with a carrier's note set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteCommand {
    On(Note),
    Off(Note),
    AllOff,
}

/// A note command addressed to one carrier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteMessage {
    pub carrier: OperatorId,
    pub command: NoteCommand,
}

/// Control-thread end of the note ring.
///
/// Every method returns immediately: a full ring is reported as
/// [`SynthError::QueueFull`] instead of waiting for the audio thread.
pub struct NoteHandle {
    tx: Producer<NoteMessage>,
    carriers: Vec<OperatorId>,
}

/// Create both ends of the note ring. `carriers` lists the ids the handle
/// may address.
pub(crate) fn note_channel(
    capacity: usize,
    carriers: Vec<OperatorId>,
) -> (NoteHandle, Consumer<NoteMessage>) {
    let (tx, rx) = RingBuffer::<NoteMessage>::new(capacity);
    (NoteHandle { tx, carriers }, rx)
}

impl NoteHandle {
    pub fn note_on(&mut self, carrier: OperatorId, note: Note) -> Result<()> {
        self.send(carrier, NoteCommand::On(note))
    }

    pub fn note_off(&mut self, carrier: OperatorId, note: Note) -> Result<()> {
        self.send(carrier, NoteCommand::Off(note))
    }

    pub fn all_notes_off(&mut self, carrier: OperatorId) -> Result<()> {
        self.send(carrier, NoteCommand::AllOff)
    }

    /// Carriers this handle can address.
    pub fn carriers(&self) -> &[OperatorId] {
        &self.carriers
    }

    /// Messages that can be sent before the ring is full.
    pub fn free_slots(&self) -> usize {
        self.tx.slots()
    }

    fn send(&mut self, carrier: OperatorId, command: NoteCommand) -> Result<()> {
        if !self.carriers.contains(&carrier) {
            return Err(SynthError::NotACarrier(carrier));
        }
        self.tx
            .push(NoteMessage { carrier, command })
            .map_err(|_| {
                log::warn!("note queue full, dropping {command:?} for carrier {carrier}");
                SynthError::QueueFull
            })
    }
}
